//! Test fixtures
//!
//! Provides TestEnvironment that sets up everything a ledger test needs:
//! - Temp-file SQLite database with the schema applied
//! - Order ledger wired to a recording notifier
//! - Catalog helpers

#![allow(dead_code)]

use rust_decimal::Decimal;
use std::sync::Arc;
use tempfile::TempDir;

use shopbot::core::AdminPolicy;
use shopbot::orders::OrderLedger;
use shopbot::storage::catalog::{create_product, NewProduct, Product};
use shopbot::storage::{create_pool, DbPool};

use super::RecordingNotifier;

pub const ADMIN_ID: i64 = 1000;
pub const BUYER_ID: i64 = 555;

/// Complete test environment
///
/// # Example
/// ```ignore
/// let env = TestEnvironment::new();
/// let product = env.add_product("Headphones", dec!(100), dec!(10));
/// let order = env.ledger.create_order(BUYER_ID, product.id, dec!(90), Some("INV1"))?;
/// ```
pub struct TestEnvironment {
    /// Keeps the database file alive for the test
    _dir: TempDir,
    pub db_pool: Arc<DbPool>,
    pub ledger: Arc<OrderLedger>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shop.sqlite");
        let db_pool = Arc::new(create_pool(path.to_str().unwrap()).unwrap());
        let notifier = Arc::new(RecordingNotifier::default());
        let ledger = Arc::new(OrderLedger::new(
            Arc::clone(&db_pool),
            notifier.clone(),
            AdminPolicy::new([ADMIN_ID]),
        ));

        Self {
            _dir: dir,
            db_pool,
            ledger,
            notifier,
        }
    }

    pub fn add_product(&self, name: &str, price: Decimal, discount: Decimal) -> Product {
        let conn = self.db_pool.get().unwrap();
        create_product(
            &conn,
            &NewProduct {
                name: name.to_string(),
                description: format!("{} description", name),
                price,
                discount,
                image_url: None,
                category: Some("Electronics".to_string()),
            },
        )
        .unwrap()
    }

    /// Removes a product behind the ledger's back, ignoring foreign keys.
    pub fn delete_product(&self, product_id: i64) {
        let conn = self.db_pool.get().unwrap();
        conn.execute_batch(&format!(
            "PRAGMA foreign_keys = OFF; DELETE FROM products WHERE id = {}; PRAGMA foreign_keys = ON;",
            product_id
        ))
        .unwrap();
    }
}
