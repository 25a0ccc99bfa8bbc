//! Database access: connection pool, catalog, users and orders

pub mod catalog;
pub mod db;
pub mod orders;
pub mod users;

// Re-exports for convenience
pub use catalog::{NewProduct, Product};
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use orders::Order;
pub use users::{User, UserProfile};

/// Pool over a fresh database file; keep the `TempDir` alive for the test.
#[cfg(test)]
pub(crate) fn test_pool() -> (tempfile::TempDir, DbPool) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("shop-test.sqlite");
    let pool = create_pool(path.to_str().unwrap()).unwrap();
    (dir, pool)
}
