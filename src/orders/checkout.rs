//! Purchase flow behind the `buy_<id>` button

use super::ledger::OrderLedger;
use crate::core::error::{AppError, AppResult};
use crate::payments::{Invoice, InvoiceRequest, PaymentGateway, PaymentMetadata};
use crate::storage::catalog::{self, Product};
use crate::storage::db::get_connection;
use crate::storage::orders::Order;

/// A pending order together with the invoice the buyer has to pay.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    pub order: Order,
    pub product: Product,
    pub invoice: Invoice,
}

/// Creates an invoice for the product's effective price and records the
/// pending order under the invoice id.
///
/// The invoice comes first so the order can never exist without a payment
/// id; if the gateway fails nothing is written.
pub async fn start_purchase(
    ledger: &OrderLedger,
    gateway: &dyn PaymentGateway,
    asset: &str,
    user_id: i64,
    product_id: i64,
) -> AppResult<Checkout> {
    let product = {
        let conn = get_connection(ledger.db_pool())?;
        catalog::get_product(&conn, product_id)?.ok_or_else(|| AppError::NotFound(format!("product {}", product_id)))?
    };

    let amount = product.effective_price();
    if amount <= rust_decimal::Decimal::ZERO {
        return Err(AppError::Validation(format!(
            "product {} has no payable price ({})",
            product.id, amount
        )));
    }

    let request = InvoiceRequest {
        asset: asset.to_string(),
        amount,
        description: format!("{}: {}", product.name, product.description),
        metadata: PaymentMetadata { user_id, product_id },
    };
    let invoice = gateway.create_invoice(&request).await?;
    log::info!(
        "Invoice {} created for user {} product {} ({} {})",
        invoice.invoice_id,
        user_id,
        product_id,
        amount,
        asset
    );

    let order = ledger.create_order(user_id, product_id, amount, Some(&invoice.invoice_id))?;
    Ok(Checkout { order, product, invoice })
}
