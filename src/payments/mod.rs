//! Payment gateway adapter
//!
//! The shop only needs one thing from the gateway: an invoice with a pay
//! link. Payment status comes back later through the webhook server.

pub mod crypto_pay;
pub mod signature;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::error::{AppError, AppResult};

pub use crypto_pay::CryptoPayClient;

/// Invoice parameters sent to the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRequest {
    pub asset: String,
    pub amount: Decimal,
    pub description: String,
    /// Round-trips through the webhook; see [`PaymentMetadata`]
    pub metadata: PaymentMetadata,
}

/// Invoice created by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    /// External payment id; becomes `Order::payment_id`
    pub invoice_id: String,
    pub pay_url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_invoice(&self, request: &InvoiceRequest) -> AppResult<Invoice>;
}

/// Opaque payload attached to an invoice and echoed back by the webhook.
///
/// Arrives from outside, so [`PaymentMetadata::parse`] accepts ids either as
/// JSON numbers or numeric strings and rejects everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    #[serde(rename = "userId", deserialize_with = "id_from_number_or_string")]
    pub user_id: i64,
    #[serde(rename = "productId", deserialize_with = "id_from_number_or_string")]
    pub product_id: i64,
}

impl PaymentMetadata {
    pub fn to_payload(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn parse(payload: &str) -> AppResult<Self> {
        serde_json::from_str(payload).map_err(|e| AppError::Validation(format!("malformed payment payload: {}", e)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawId::deserialize(deserializer)? {
        RawId::Number(n) => Ok(n),
        RawId::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| serde::de::Error::custom(format!("'{}' is not a numeric id", s))),
    }
}

/// Gateway ids (invoice ids) arrive as JSON numbers or strings; both become text.
pub(crate) fn text_id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_payload_roundtrip() {
        let meta = PaymentMetadata {
            user_id: 42,
            product_id: 7,
        };
        let payload = meta.to_payload().unwrap();
        assert_eq!(payload, r#"{"userId":42,"productId":7}"#);
        assert_eq!(PaymentMetadata::parse(&payload).unwrap(), meta);
    }

    #[test]
    fn test_metadata_accepts_string_ids() {
        let meta = PaymentMetadata::parse(r#"{"userId":"42","productId":"7"}"#).unwrap();
        assert_eq!(meta.user_id, 42);
        assert_eq!(meta.product_id, 7);
    }

    #[test]
    fn test_metadata_rejects_garbage() {
        for bad in ["not json", "{}", r#"{"userId":"abc","productId":1}"#, r#"{"userId":1}"#] {
            let err = PaymentMetadata::parse(bad).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{} should fail validation", bad);
        }
    }
}
