//! Payment webhook reconciliation
//!
//! Both inbound routes (`/payment-status` and `/crypto-webhook`) funnel into
//! [`reconcile`]. The only difference between them is whether a metadata
//! payload comes along, so a single status mapping table serves both.

use serde::Deserialize;

use super::ledger::{OrderLedger, TransitionOutcome};
use super::OrderStatus;
use crate::core::error::{AppError, AppResult};
use crate::payments::PaymentMetadata;
use crate::storage::orders::Order;

/// Maps gateway status strings onto order statuses.
#[derive(Debug, Clone, Copy)]
pub struct StatusMapping(&'static [(&'static str, OrderStatus)]);

impl StatusMapping {
    pub const fn new(entries: &'static [(&'static str, OrderStatus)]) -> Self {
        Self(entries)
    }

    /// Case-insensitive lookup; `None` for statuses the shop doesn't model.
    pub fn target(&self, reported: &str) -> Option<OrderStatus> {
        let reported = reported.trim();
        self.0
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(reported))
            .map(|(_, status)| *status)
    }
}

/// Gateway statuses the shop reacts to; anything else (`active`, ...) is ignored.
pub const GATEWAY_STATUSES: StatusMapping =
    StatusMapping::new(&[("paid", OrderStatus::Paid), ("expired", OrderStatus::Expired)]);

/// One payment status report as delivered by a webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentReport {
    #[serde(deserialize_with = "crate::payments::text_id_from_number_or_string")]
    pub invoice_id: String,
    pub status: String,
    /// JSON string carrying [`PaymentMetadata`]
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// The order moved to a terminal status and the buyer was notified
    Applied(Order),
    /// Replay or late report for an order that is already terminal
    AlreadyFinal(Order),
    /// Status not modeled by the shop; nothing to do
    Ignored { status: String },
}

impl ReconcileOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ReconcileOutcome::Applied(_) => "applied",
            ReconcileOutcome::AlreadyFinal(_) => "already_final",
            ReconcileOutcome::Ignored { .. } => "ignored",
        }
    }
}

/// Applies a payment report to the matching order.
///
/// Errors:
/// - `Validation` when the payload is present but malformed, or names a
///   different buyer/product than the stored order. Checked before any write.
/// - `NotFound` when no order carries this invoice id (a blank id included).
///
/// Notification failures never surface here; once the status is durable the
/// report counts as handled.
pub async fn reconcile(
    ledger: &OrderLedger,
    report: &PaymentReport,
    mapping: &StatusMapping,
) -> AppResult<ReconcileOutcome> {
    let invoice_id = report.invoice_id.trim();
    if invoice_id.is_empty() {
        return Err(AppError::NotFound("order for an empty invoice id".to_string()));
    }

    let metadata = report.payload.as_deref().map(PaymentMetadata::parse).transpose()?;

    let order = ledger.find_by_payment_id(invoice_id)?;

    if let Some(meta) = metadata {
        if meta.user_id != order.user_id || meta.product_id != order.product_id {
            log::warn!(
                "Payload for invoice {} names user {} product {}, order {} has user {} product {}",
                invoice_id,
                meta.user_id,
                meta.product_id,
                order.id,
                order.user_id,
                order.product_id
            );
            return Err(AppError::Validation(format!(
                "payload does not match order for invoice {}",
                invoice_id
            )));
        }
    }

    let Some(target) = mapping.target(&report.status) else {
        log::info!("Invoice {}: ignoring gateway status '{}'", invoice_id, report.status);
        return Ok(ReconcileOutcome::Ignored {
            status: report.status.clone(),
        });
    };

    if order.status.is_terminal() {
        log::info!(
            "Invoice {}: order {} already {}, skipping '{}'",
            invoice_id,
            order.id,
            order.status,
            report.status
        );
        return Ok(ReconcileOutcome::AlreadyFinal(order));
    }

    // The pre-check above is only a shortcut; the conditional update inside
    // `transition` is what decides a race between concurrent deliveries.
    match ledger.transition(order.id, target).await? {
        TransitionOutcome::Applied(order) => Ok(ReconcileOutcome::Applied(order)),
        TransitionOutcome::Rejected(order) => Ok(ReconcileOutcome::AlreadyFinal(order)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_lookup() {
        assert_eq!(GATEWAY_STATUSES.target("paid"), Some(OrderStatus::Paid));
        assert_eq!(GATEWAY_STATUSES.target(" PAID "), Some(OrderStatus::Paid));
        assert_eq!(GATEWAY_STATUSES.target("expired"), Some(OrderStatus::Expired));
        assert_eq!(GATEWAY_STATUSES.target("active"), None);
        assert_eq!(GATEWAY_STATUSES.target("canceled"), None);
    }

    #[test]
    fn test_report_payload_is_optional() {
        let report: PaymentReport = serde_json::from_str(r#"{"invoice_id":"INV1","status":"paid"}"#).unwrap();
        assert!(report.payload.is_none());

        let report: PaymentReport =
            serde_json::from_str(r#"{"invoice_id":"INV1","status":"paid","payload":"{\"userId\":1,\"productId\":2}"}"#)
                .unwrap();
        assert!(report.payload.is_some());
    }

    #[test]
    fn test_report_accepts_numeric_invoice_id() {
        let report: PaymentReport = serde_json::from_str(r#"{"invoice_id":777,"status":"paid"}"#).unwrap();
        assert_eq!(report.invoice_id, "777");

        assert!(serde_json::from_str::<PaymentReport>(r#"{"invoice_id":true,"status":"paid"}"#).is_err());
    }
}
