//! Product catalog storage and the effective-price rule

use rust_decimal::{Decimal, RoundingStrategy};
use rusqlite::{params, OptionalExtension, Result, Row};

use super::db::{decimal_column, DbConnection};

/// A product offered in the shop.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    /// Percentage discount; values outside [0, 100] are clamped when priced
    pub discount: Decimal,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

impl Product {
    /// Price the customer is charged; see [`effective_price`].
    pub fn effective_price(&self) -> Decimal {
        effective_price(self.price, self.discount)
    }

    pub fn has_discount(&self) -> bool {
        clamp_discount(self.discount) > Decimal::ZERO
    }
}

/// Fields accepted when an admin adds a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub discount: Decimal,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

fn clamp_discount(discount: Decimal) -> Decimal {
    discount.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// Effective price = price × (1 − discount/100), discount clamped to [0, 100].
///
/// The single place the discounted price is computed; every listing,
/// caption and invoice goes through it. Rounded half-up to cents.
pub fn effective_price(price: Decimal, discount: Decimal) -> Decimal {
    let factor = Decimal::ONE - clamp_discount(discount) / Decimal::ONE_HUNDRED;
    (price * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, discount, image_url, category";

pub(crate) fn product_from_row(row: &Row<'_>) -> Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: decimal_column(row, 3)?,
        discount: decimal_column(row, 4)?,
        image_url: row.get(5)?,
        category: row.get(6)?,
    })
}

/// Inserts a product and returns it with its assigned id.
pub fn create_product(conn: &DbConnection, product: &NewProduct) -> Result<Product> {
    conn.execute(
        "INSERT INTO products (name, description, price, discount, image_url, category) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            product.name,
            product.description,
            product.price.to_string(),
            product.discount.to_string(),
            product.image_url,
            product.category,
        ],
    )?;
    let id = conn.last_insert_rowid();
    log::info!("Product {} created: {}", id, product.name);

    Ok(Product {
        id,
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.price,
        discount: product.discount,
        image_url: product.image_url.clone(),
        category: product.category.clone(),
    })
}

/// Returns `Ok(None)` when no product has this id.
pub fn get_product(conn: &DbConnection, product_id: i64) -> Result<Option<Product>> {
    conn.query_row(
        &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS),
        params![product_id],
        product_from_row,
    )
    .optional()
}

pub fn list_products(conn: &DbConnection) -> Result<Vec<Product>> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM products ORDER BY id", PRODUCT_COLUMNS))?;
    let rows = stmt.query_map([], product_from_row)?;
    rows.collect()
}

pub fn list_by_category(conn: &DbConnection, category: &str) -> Result<Vec<Product>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM products WHERE category = ?1 ORDER BY id",
        PRODUCT_COLUMNS
    ))?;
    let rows = stmt.query_map(params![category], product_from_row)?;
    rows.collect()
}

/// Distinct non-empty categories, sorted alphabetically.
pub fn list_categories(conn: &DbConnection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT category FROM products WHERE category IS NOT NULL AND category != '' ORDER BY category",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.collect()
}

/// Case-insensitive substring match on name or description.
pub fn search_products(conn: &DbConnection, query: &str) -> Result<Vec<Product>> {
    let needle = query.trim();
    if needle.is_empty() {
        return Ok(Vec::new());
    }
    let escaped = needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    let pattern = format!("%{}%", escaped.to_lowercase());

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM products
         WHERE lower(name) LIKE ?1 ESCAPE '\\' OR lower(description) LIKE ?1 ESCAPE '\\'
         ORDER BY id",
        PRODUCT_COLUMNS
    ))?;
    let rows = stmt.query_map(params![pattern], product_from_row)?;
    rows.collect()
}
