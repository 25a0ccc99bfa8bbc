//! Crypto Pay (@CryptoBot) API client
//!
//! Only `createInvoice` is used. Every request carries the API token in the
//! `Crypto-Pay-API-Token` header; responses are wrapped in
//! `{"ok": bool, "result": ..., "error": ...}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Invoice, InvoiceRequest, PaymentGateway};
use crate::core::config;
use crate::core::error::{AppError, AppResult};

/// Gateway limit for the invoice description
const MAX_DESCRIPTION_CHARS: usize = 1024;

pub struct CryptoPayClient {
    http: Client,
    base_url: String,
    api_token: String,
    /// Where the "paid" button sends the buyer back to
    return_url: Option<String>,
}

#[derive(Serialize)]
struct CreateInvoiceBody<'a> {
    currency_type: &'static str,
    asset: &'a str,
    amount: String,
    description: String,
    payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    paid_btn_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    paid_btn_url: Option<&'a str>,
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct InvoiceResult {
    invoice_id: serde_json::Value,
    #[serde(default)]
    bot_invoice_url: Option<String>,
    #[serde(default)]
    pay_url: Option<String>,
}

impl CryptoPayClient {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>, return_url: Option<String>) -> AppResult<Self> {
        let http = Client::builder().timeout(config::network::timeout()).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            return_url,
        })
    }

    /// Client configured from CRYPTO_PAY_* and PUBLIC_BASE_URL.
    pub fn from_env() -> AppResult<Self> {
        Self::new(
            config::payments::API_URL.as_str(),
            config::payments::API_KEY.as_str(),
            config::PUBLIC_BASE_URL.clone(),
        )
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[async_trait]
impl PaymentGateway for CryptoPayClient {
    async fn create_invoice(&self, request: &InvoiceRequest) -> AppResult<Invoice> {
        if self.api_token.is_empty() {
            return Err(AppError::Upstream("Crypto Pay API token is not configured".to_string()));
        }

        let body = CreateInvoiceBody {
            currency_type: "crypto",
            asset: &request.asset,
            amount: request.amount.normalize().to_string(),
            description: truncate_chars(&request.description, MAX_DESCRIPTION_CHARS),
            payload: request.metadata.to_payload()?,
            paid_btn_name: self.return_url.as_ref().map(|_| "callback"),
            paid_btn_url: self.return_url.as_deref(),
        };

        let url = format!("{}/api/createInvoice", self.base_url);
        log::info!(
            "Creating invoice: {} {} for user {} product {}",
            body.amount,
            body.asset,
            request.metadata.user_id,
            request.metadata.product_id
        );

        let response = self
            .http
            .post(&url)
            .header("Crypto-Pay-API-Token", &self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("createInvoice request failed: {}", e)))?;

        let status = response.status();
        let parsed: ApiResponse<InvoiceResult> = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("createInvoice returned unreadable body ({}): {}", status, e)))?;

        if !parsed.ok {
            let (code, name) = parsed
                .error
                .map(|e| (e.code, e.name))
                .unwrap_or((i64::from(status.as_u16()), "UNKNOWN".to_string()));
            return Err(AppError::Upstream(format!("createInvoice rejected: {} {}", code, name)));
        }

        let result = parsed
            .result
            .ok_or_else(|| AppError::Upstream("createInvoice returned ok without result".to_string()))?;

        let invoice_id = match result.invoice_id {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) if !s.is_empty() => s,
            other => return Err(AppError::Upstream(format!("unexpected invoice_id: {}", other))),
        };
        let pay_url = result
            .bot_invoice_url
            .or(result.pay_url)
            .ok_or_else(|| AppError::Upstream(format!("invoice {} has no pay url", invoice_id)))?;

        log::info!("Invoice {} created", invoice_id);
        Ok(Invoice { invoice_id, pay_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_utf8() {
        assert_eq!(truncate_chars("привет", 3), "при");
        assert_eq!(truncate_chars("ok", 10), "ok");
    }
}
