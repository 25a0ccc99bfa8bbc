//! Integration tests for the Crypto Pay client against a mock server
//!
//! Run with: cargo test --test crypto_pay_test

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopbot::core::error::AppError;
use shopbot::payments::{CryptoPayClient, InvoiceRequest, PaymentGateway, PaymentMetadata};

fn request() -> InvoiceRequest {
    InvoiceRequest {
        asset: "USDT".to_string(),
        amount: dec!(90.00),
        description: "Headphones: Wireless".to_string(),
        metadata: PaymentMetadata {
            user_id: 555,
            product_id: 3,
        },
    }
}

#[tokio::test]
async fn test_create_invoice_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/createInvoice"))
        .and(header("Crypto-Pay-API-Token", "token"))
        .and(body_partial_json(json!({
            "asset": "USDT",
            "amount": "90",
            "payload": "{\"userId\":555,\"productId\":3}"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {
                "invoice_id": 777,
                "status": "active",
                "bot_invoice_url": "https://t.me/CryptoBot?start=IVabc"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = CryptoPayClient::new(server.uri(), "token", None).unwrap();
    let invoice = client.create_invoice(&request()).await.unwrap();

    assert_eq!(invoice.invoice_id, "777");
    assert_eq!(invoice.pay_url, "https://t.me/CryptoBot?start=IVabc");
}

#[tokio::test]
async fn test_return_url_adds_paid_button() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/createInvoice"))
        .and(body_partial_json(json!({
            "paid_btn_name": "callback",
            "paid_btn_url": "https://shop.example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"invoice_id": "A1", "pay_url": "https://pay.example/A1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = CryptoPayClient::new(server.uri(), "token", Some("https://shop.example.com".to_string())).unwrap();
    let invoice = client.create_invoice(&request()).await.unwrap();

    assert_eq!(invoice.invoice_id, "A1");
    assert_eq!(invoice.pay_url, "https://pay.example/A1");
}

#[tokio::test]
async fn test_api_error_is_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/createInvoice"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "ok": false,
            "error": {"code": 401, "name": "UNAUTHORIZED"}
        })))
        .mount(&server)
        .await;

    let client = CryptoPayClient::new(server.uri(), "bad", None).unwrap();
    let err = client.create_invoice(&request()).await.unwrap_err();

    assert!(matches!(err, AppError::Upstream(ref msg) if msg.contains("UNAUTHORIZED")));
}

#[tokio::test]
async fn test_garbage_response_is_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/createInvoice"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let client = CryptoPayClient::new(server.uri(), "token", None).unwrap();
    let err = client.create_invoice(&request()).await.unwrap_err();

    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_missing_token_never_calls_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = CryptoPayClient::new(server.uri(), "", None).unwrap();
    let err = client.create_invoice(&request()).await.unwrap_err();

    assert!(matches!(err, AppError::Upstream(_)));
}
