//! Orders: status machine, ledger, checkout and webhook reconciliation

pub mod checkout;
pub mod ledger;
pub mod reconcile;
pub mod status;

pub use checkout::{start_purchase, Checkout};
pub use ledger::{OrderLedger, ShopStats, TransitionOutcome};
pub use reconcile::{reconcile, PaymentReport, ReconcileOutcome, StatusMapping, GATEWAY_STATUSES};
pub use status::OrderStatus;
