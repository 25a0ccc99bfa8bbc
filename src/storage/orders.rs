//! Order persistence
//!
//! Plain row access only; the transition rules live in `crate::orders`.
//! The one write that changes status, [`set_status_if_pending`], is a single
//! conditional UPDATE so two concurrent webhook deliveries can never both
//! move the same order out of `pending`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Result, Row};

use super::db::{decimal_column, now_timestamp, timestamp_column, DbConnection};
use crate::orders::OrderStatus;

/// A purchase intent and its payment state.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    /// Telegram chat id of the buyer
    pub user_id: i64,
    pub product_id: i64,
    pub amount: Decimal,
    pub status: OrderStatus,
    /// Gateway invoice id; `None` until the invoice exists
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub user_id: i64,
    pub product_id: i64,
    pub amount: Decimal,
    pub payment_id: Option<&'a str>,
}

const ORDER_COLUMNS: &str = "id, user_id, product_id, amount, status, payment_id, created_at";

fn order_from_row(row: &Row<'_>) -> Result<Order> {
    let status_raw: String = row.get(4)?;
    let status = status_raw
        .parse::<OrderStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.to_string().into()))?;

    Ok(Order {
        id: row.get(0)?,
        user_id: row.get(1)?,
        product_id: row.get(2)?,
        amount: decimal_column(row, 3)?,
        status,
        payment_id: row.get(5)?,
        created_at: timestamp_column(row, 6)?,
    })
}

/// Inserts a `pending` order. Fails on a duplicate payment id.
pub fn insert_order(conn: &DbConnection, order: &NewOrder<'_>) -> Result<Order> {
    conn.execute(
        "INSERT INTO orders (user_id, product_id, amount, status, payment_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            order.user_id,
            order.product_id,
            order.amount.to_string(),
            OrderStatus::Pending.as_str(),
            order.payment_id,
            now_timestamp(),
        ],
    )?;
    let id = conn.last_insert_rowid();
    get_order(conn, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

pub fn get_order(conn: &DbConnection, order_id: i64) -> Result<Option<Order>> {
    conn.query_row(
        &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS),
        params![order_id],
        order_from_row,
    )
    .optional()
}

pub fn find_by_payment_id(conn: &DbConnection, payment_id: &str) -> Result<Option<Order>> {
    conn.query_row(
        &format!("SELECT {} FROM orders WHERE payment_id = ?1", ORDER_COLUMNS),
        params![payment_id],
        order_from_row,
    )
    .optional()
}

/// Compare-and-set `pending → target`. Returns true if this call won.
pub fn set_status_if_pending(conn: &DbConnection, order_id: i64, target: OrderStatus) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE orders SET status = ?1 WHERE id = ?2 AND status = ?3",
        params![target.as_str(), order_id, OrderStatus::Pending.as_str()],
    )?;
    Ok(updated == 1)
}

pub fn list_by_user(conn: &DbConnection, user_id: i64) -> Result<Vec<Order>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM orders WHERE user_id = ?1 ORDER BY created_at, id",
        ORDER_COLUMNS
    ))?;
    let rows = stmt.query_map(params![user_id], order_from_row)?;
    rows.collect()
}

pub fn list_by_status(conn: &DbConnection, status: OrderStatus) -> Result<Vec<Order>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM orders WHERE status = ?1 ORDER BY created_at, id",
        ORDER_COLUMNS
    ))?;
    let rows = stmt.query_map(params![status.as_str()], order_from_row)?;
    rows.collect()
}

pub fn count_orders(conn: &DbConnection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
}

/// Sum of `paid` order amounts. Summed in Rust to stay exact.
pub fn paid_revenue(conn: &DbConnection) -> Result<Decimal> {
    let mut stmt = conn.prepare("SELECT amount FROM orders WHERE status = ?1")?;
    let amounts = stmt.query_map(params![OrderStatus::Paid.as_str()], |row| decimal_column(row, 0))?;

    let mut total = Decimal::ZERO;
    for amount in amounts {
        total += amount?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::catalog::{create_product, NewProduct};
    use crate::storage::test_pool;
    use rust_decimal_macros::dec;

    fn product_id(conn: &DbConnection) -> i64 {
        create_product(
            conn,
            &NewProduct {
                name: "Keyboard".to_string(),
                description: String::new(),
                price: dec!(50),
                discount: dec!(0),
                image_url: None,
                category: None,
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_insert_starts_pending() {
        let (_dir, pool) = test_pool();
        let conn = pool.get().unwrap();
        let pid = product_id(&conn);

        let order = insert_order(
            &conn,
            &NewOrder {
                user_id: 5,
                product_id: pid,
                amount: dec!(50),
                payment_id: Some("INV-A"),
            },
        )
        .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(find_by_payment_id(&conn, "INV-A").unwrap(), Some(order));
        assert!(find_by_payment_id(&conn, "INV-missing").unwrap().is_none());
    }

    #[test]
    fn test_payment_id_is_unique() {
        let (_dir, pool) = test_pool();
        let conn = pool.get().unwrap();
        let pid = product_id(&conn);
        let new = NewOrder {
            user_id: 5,
            product_id: pid,
            amount: dec!(50),
            payment_id: Some("INV-DUP"),
        };

        insert_order(&conn, &new).unwrap();
        assert!(insert_order(&conn, &new).is_err());
    }

    #[test]
    fn test_conditional_update_only_wins_once() {
        let (_dir, pool) = test_pool();
        let conn = pool.get().unwrap();
        let pid = product_id(&conn);
        let order = insert_order(
            &conn,
            &NewOrder {
                user_id: 5,
                product_id: pid,
                amount: dec!(50),
                payment_id: None,
            },
        )
        .unwrap();

        assert!(set_status_if_pending(&conn, order.id, OrderStatus::Paid).unwrap());
        assert!(!set_status_if_pending(&conn, order.id, OrderStatus::Expired).unwrap());
        assert_eq!(get_order(&conn, order.id).unwrap().unwrap().status, OrderStatus::Paid);
    }

    #[test]
    fn test_revenue_counts_only_paid() {
        let (_dir, pool) = test_pool();
        let conn = pool.get().unwrap();
        let pid = product_id(&conn);

        for (i, amount) in [dec!(10.50), dec!(20.25), dec!(99)].into_iter().enumerate() {
            let order = insert_order(
                &conn,
                &NewOrder {
                    user_id: 1,
                    product_id: pid,
                    amount,
                    payment_id: None,
                },
            )
            .unwrap();
            if i < 2 {
                set_status_if_pending(&conn, order.id, OrderStatus::Paid).unwrap();
            }
        }

        assert_eq!(paid_revenue(&conn).unwrap(), dec!(30.75));
        assert_eq!(count_orders(&conn).unwrap(), 3);
        assert_eq!(list_by_status(&conn, OrderStatus::Pending).unwrap().len(), 1);
    }
}
