//! Order ledger: creation, lookups and the status state machine
//!
//! All status changes go through [`OrderLedger::transition`], which relies on
//! the atomic `pending → target` update in storage. Whoever wins that update
//! sends the one notification for the order; everyone else gets
//! [`TransitionOutcome::Rejected`].

use rust_decimal::Decimal;
use std::sync::Arc;

use super::OrderStatus;
use crate::core::auth::AdminPolicy;
use crate::core::error::{AppError, AppResult};
use crate::storage::db::{get_connection, DbConnection, DbPool};
use crate::storage::orders::{self, NewOrder, Order};
use crate::storage::{catalog, users};
use crate::telegram::notifications::Notifier;

/// Result of a transition attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// This call moved the order out of `pending`
    Applied(Order),
    /// The order was already terminal; nothing changed
    Rejected(Order),
}

impl TransitionOutcome {
    pub fn order(&self) -> &Order {
        match self {
            TransitionOutcome::Applied(order) | TransitionOutcome::Rejected(order) => order,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied(_))
    }
}

/// Numbers shown on the admin panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ShopStats {
    pub total_users: i64,
    pub total_orders: i64,
    pub pending_orders: usize,
    pub paid_revenue: Decimal,
}

pub struct OrderLedger {
    db_pool: Arc<DbPool>,
    notifier: Arc<dyn Notifier>,
    admins: AdminPolicy,
}

impl OrderLedger {
    pub fn new(db_pool: Arc<DbPool>, notifier: Arc<dyn Notifier>, admins: AdminPolicy) -> Self {
        Self {
            db_pool,
            notifier,
            admins,
        }
    }

    pub fn admins(&self) -> &AdminPolicy {
        &self.admins
    }

    pub fn db_pool(&self) -> &Arc<DbPool> {
        &self.db_pool
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    fn conn(&self) -> AppResult<DbConnection> {
        Ok(get_connection(&self.db_pool)?)
    }

    /// Records a new `pending` order.
    ///
    /// Repeated purchases of the same product are independent orders.
    pub fn create_order(
        &self,
        user_id: i64,
        product_id: i64,
        amount: Decimal,
        payment_id: Option<&str>,
    ) -> AppResult<Order> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation(format!("order amount must be positive, got {}", amount)));
        }
        if payment_id.is_some_and(|id| id.trim().is_empty()) {
            return Err(AppError::Validation("payment id must not be blank".to_string()));
        }

        let conn = self.conn()?;
        if catalog::get_product(&conn, product_id)?.is_none() {
            return Err(AppError::NotFound(format!("product {}", product_id)));
        }

        let order = orders::insert_order(
            &conn,
            &NewOrder {
                user_id,
                product_id,
                amount,
                payment_id,
            },
        )?;
        log::info!(
            "Order {} created: user {} product {} amount {} payment {:?}",
            order.id,
            user_id,
            product_id,
            amount,
            payment_id
        );
        Ok(order)
    }

    pub fn get_order(&self, order_id: i64) -> AppResult<Order> {
        let conn = self.conn()?;
        orders::get_order(&conn, order_id)?.ok_or_else(|| AppError::NotFound(format!("order {}", order_id)))
    }

    pub fn find_by_payment_id(&self, payment_id: &str) -> AppResult<Order> {
        let conn = self.conn()?;
        orders::find_by_payment_id(&conn, payment_id)?
            .ok_or_else(|| AppError::NotFound(format!("order with payment id {}", payment_id)))
    }

    /// Oldest first.
    pub fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Order>> {
        let conn = self.conn()?;
        Ok(orders::list_by_user(&conn, user_id)?)
    }

    /// Admin queue, oldest first.
    pub fn list_pending(&self) -> AppResult<Vec<Order>> {
        let conn = self.conn()?;
        Ok(orders::list_by_status(&conn, OrderStatus::Pending)?)
    }

    /// Moves a `pending` order to `target` and notifies the buyer once.
    ///
    /// An order that is already terminal is left untouched and reported as
    /// `Rejected`; this is what makes webhook replays harmless.
    pub async fn transition(&self, order_id: i64, target: OrderStatus) -> AppResult<TransitionOutcome> {
        if !target.is_terminal() {
            return Err(AppError::Validation(format!("cannot move an order to {}", target)));
        }

        let (won, order) = {
            let conn = self.conn()?;
            let won = orders::set_status_if_pending(&conn, order_id, target)?;
            let order =
                orders::get_order(&conn, order_id)?.ok_or_else(|| AppError::NotFound(format!("order {}", order_id)))?;
            (won, order)
        };

        if !won {
            log::warn!(
                "Ignoring transition of order {} to {}: already {}",
                order_id,
                target,
                order.status
            );
            return Ok(TransitionOutcome::Rejected(order));
        }

        log::info!("Order {} is now {}", order.id, order.status);
        self.notify_status(&order).await;
        Ok(TransitionOutcome::Applied(order))
    }

    /// Admin confirmation of a pending order (marks it paid).
    pub async fn approve(&self, actor_id: i64, order_id: i64) -> AppResult<TransitionOutcome> {
        self.admins.require_admin(actor_id)?;
        log::info!("Admin {} approves order {}", actor_id, order_id);
        self.transition(order_id, OrderStatus::Paid).await
    }

    pub async fn cancel(&self, actor_id: i64, order_id: i64) -> AppResult<TransitionOutcome> {
        self.admins.require_admin(actor_id)?;
        log::info!("Admin {} cancels order {}", actor_id, order_id);
        self.transition(order_id, OrderStatus::Canceled).await
    }

    pub fn stats(&self) -> AppResult<ShopStats> {
        let conn = self.conn()?;
        Ok(ShopStats {
            total_users: users::count_users(&conn)?,
            total_orders: orders::count_orders(&conn)?,
            pending_orders: orders::list_by_status(&conn, OrderStatus::Pending)?.len(),
            paid_revenue: orders::paid_revenue(&conn)?,
        })
    }

    /// Status durability comes first: a missing product only drops the name
    /// from the text, and a failed send is logged, never returned.
    async fn notify_status(&self, order: &Order) {
        let product_name = match self
            .conn()
            .and_then(|conn| Ok(catalog::get_product(&conn, order.product_id)?))
        {
            Ok(Some(product)) => Some(product.name),
            Ok(None) => {
                log::warn!("Order {} references missing product {}", order.id, order.product_id);
                None
            }
            Err(e) => {
                log::error!("Failed to load product {} for order {}: {}", order.product_id, order.id, e);
                None
            }
        };

        let text = status_notice(order, product_name.as_deref());
        if let Err(e) = self.notifier.send(order.user_id, &text).await {
            log::error!("Failed to notify user {} about order {}: {}", order.user_id, order.id, e);
        }
    }
}

/// Text the buyer receives when an order leaves `pending`.
pub fn status_notice(order: &Order, product_name: Option<&str>) -> String {
    let subject = match product_name {
        Some(name) => format!("order #{} ({})", order.id, name),
        None => format!("order #{}", order.id),
    };
    match order.status {
        OrderStatus::Paid => format!("{} Your payment for {} was successful!", order.status.emoji(), subject),
        OrderStatus::Canceled => format!("{} Your {} has been canceled.", order.status.emoji(), subject),
        OrderStatus::Expired => format!(
            "{} The invoice for your {} has expired. You can place the order again any time.",
            order.status.emoji(),
            subject
        ),
        OrderStatus::Pending => format!("{} Your {} is awaiting payment.", order.status.emoji(), subject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: 12,
            user_id: 1,
            product_id: 3,
            amount: dec!(90),
            status,
            payment_id: Some("INV1".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_notice_with_product() {
        let text = status_notice(&order(OrderStatus::Paid), Some("Headphones"));
        assert!(text.contains("order #12 (Headphones)"));
        assert!(text.contains("successful"));
    }

    #[test]
    fn test_status_notice_degrades_without_product() {
        let text = status_notice(&order(OrderStatus::Expired), None);
        assert!(text.contains("order #12"));
        assert!(!text.contains('('));
        assert!(text.contains("expired"));
    }
}
