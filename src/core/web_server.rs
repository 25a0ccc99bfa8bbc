//! Webhook web server for payment status callbacks.
//!
//! Receives payment status reports at /payment-status and /crypto-webhook
//! and feeds them into order reconciliation.
//! Runs on WEB_PORT (default 3000) alongside the bot dispatcher.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::error::AppError;
use crate::orders::{reconcile, OrderLedger, PaymentReport, GATEWAY_STATUSES};
use crate::payments::signature;

/// Shared state for the web server.
#[derive(Clone)]
pub struct WebState {
    pub ledger: Arc<OrderLedger>,
    /// Set when /crypto-webhook must carry a valid signature
    pub signing_key: Option<Arc<Vec<u8>>>,
}

impl WebState {
    pub fn new(ledger: Arc<OrderLedger>) -> Self {
        Self {
            ledger,
            signing_key: None,
        }
    }

    /// Requires `crypto-pay-api-signature` signed with this API token.
    pub fn with_signature_check(mut self, api_token: &str) -> Self {
        self.signing_key = Some(Arc::new(signature::signing_key(api_token)));
        self
    }
}

/// Routes served by the webhook server.
pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/payment-status", post(payment_status_handler))
        .route("/crypto-webhook", post(crypto_webhook_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the webhook web server.
pub async fn start_web_server(port: u16, state: WebState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let signed = state.signing_key.is_some();
    let app = router(state);

    log::info!("Starting web server on http://{}", addr);
    log::info!("  /payment-status  - Payment status report");
    log::info!(
        "  /crypto-webhook  - Crypto Pay webhook (signature check: {})",
        if signed { "on" } else { "off" }
    );
    log::info!("  /health          - Health check");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// HTTP status for a failed webhook call.
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(route: &str, err: AppError) -> Response {
    let status = status_for(&err);
    if status == StatusCode::NOT_FOUND {
        log::warn!("{}: {}", route, err);
    } else {
        log::error!("{}: {}", route, err);
    }
    (status, Json(json!({"error": err.to_string()}))).into_response()
}

fn parse_report(body: &[u8]) -> Result<PaymentReport, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("malformed webhook body: {}", e)))
}

async fn handle_report(state: &WebState, route: &str, body: &[u8]) -> Response {
    let report = match parse_report(body) {
        Ok(report) => report,
        Err(e) => return error_response(route, e),
    };
    log::info!(
        "{}: invoice {} reported '{}'",
        route,
        report.invoice_id,
        report.status
    );

    match reconcile(&state.ledger, &report, &GATEWAY_STATUSES).await {
        Ok(outcome) => (StatusCode::OK, Json(json!({"result": outcome.label()}))).into_response(),
        Err(e) => error_response(route, e),
    }
}

/// POST /payment-status: `{invoice_id, status}`
async fn payment_status_handler(State(state): State<WebState>, body: Bytes) -> Response {
    handle_report(&state, "/payment-status", &body).await
}

/// POST /crypto-webhook: `{invoice_id, status, payload}`
async fn crypto_webhook_handler(State(state): State<WebState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Some(key) = &state.signing_key {
        let provided = headers
            .get(signature::SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !signature::verify(key, &body, provided) {
            return error_response(
                "/crypto-webhook",
                AppError::Unauthorized("invalid webhook signature".to_string()),
            );
        }
    }
    handle_report(&state, "/crypto-webhook", &body).await
}

/// GET /health
async fn health_handler() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&AppError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&AppError::Unauthorized("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for(&AppError::Validation("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&AppError::Upstream("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_parse_report_rejects_garbage() {
        assert!(matches!(parse_report(b"nope"), Err(AppError::Validation(_))));
        assert!(matches!(parse_report(br#"{"status":"paid"}"#), Err(AppError::Validation(_))));
        let report = parse_report(br#"{"invoice_id":"INV1","status":"paid"}"#).unwrap();
        assert_eq!(report.invoice_id, "INV1");
    }
}
