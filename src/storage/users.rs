//! User directory: lazily registered Telegram users and their wishlists

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Result, Row};

use super::catalog::{product_from_row, Product};
use super::db::{now_timestamp, timestamp_column, DbConnection};

/// A registered shop customer.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    /// Telegram user id; doubles as the private chat id
    pub telegram_id: i64,
    pub username: Option<String>,
    pub full_name: String,
    pub registered_at: DateTime<Utc>,
}

/// Profile fields taken from the Telegram update on first contact.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserProfile {
    /// "First Last", trimmed; empty when Telegram sent neither.
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

fn user_from_row(row: &Row<'_>) -> Result<User> {
    Ok(User {
        id: row.get(0)?,
        telegram_id: row.get(1)?,
        username: row.get(2)?,
        full_name: row.get(3)?,
        registered_at: timestamp_column(row, 4)?,
    })
}

pub fn get_user(conn: &DbConnection, telegram_id: i64) -> Result<Option<User>> {
    conn.query_row(
        "SELECT id, telegram_id, username, full_name, registered_at FROM users WHERE telegram_id = ?1",
        params![telegram_id],
        user_from_row,
    )
    .optional()
}

/// Returns the user for `telegram_id`, registering it first if needed.
///
/// Idempotent on the unique telegram id: a concurrent first contact loses
/// the insert race silently and reads the row the winner wrote. The flag is
/// true only for the call that actually created the user.
pub fn get_or_create_user(conn: &DbConnection, telegram_id: i64, profile: &UserProfile) -> Result<(User, bool)> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (telegram_id, username, full_name, registered_at) VALUES (?1, ?2, ?3, ?4)",
        params![telegram_id, profile.username, profile.full_name(), now_timestamp()],
    )?;

    let user = get_user(conn, telegram_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
    if inserted > 0 {
        log::info!("Registered new user {} ({:?})", telegram_id, profile.username);
    }
    Ok((user, inserted > 0))
}

pub fn count_users(conn: &DbConnection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
}

/// Adds a product to the wishlist; returns false if it was already there.
pub fn add_to_wishlist(conn: &DbConnection, user_id: i64, product_id: i64) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO wishlist (user_id, product_id, added_at) VALUES (?1, ?2, ?3)",
        params![user_id, product_id, now_timestamp()],
    )?;
    Ok(inserted > 0)
}

/// Wishlisted products in the order they were added.
pub fn list_wishlist(conn: &DbConnection, user_id: i64) -> Result<Vec<Product>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, p.description, p.price, p.discount, p.image_url, p.category
         FROM wishlist w JOIN products p ON p.id = w.product_id
         WHERE w.user_id = ?1
         ORDER BY w.added_at, p.id",
    )?;
    let rows = stmt.query_map(params![user_id], product_from_row)?;
    rows.collect()
}
