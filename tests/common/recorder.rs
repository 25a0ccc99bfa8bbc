//! In-memory stand-ins for the notification channel and the payment gateway

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use shopbot::core::error::{AppError, AppResult};
use shopbot::payments::{Invoice, InvoiceRequest, PaymentGateway};
use shopbot::telegram::Notifier;

/// Records every message instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(i64, String)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, text)| text)
            .collect()
    }

    /// Makes every following send fail (the attempt is still recorded).
    pub fn fail_sends(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("chat unreachable".to_string()));
        }
        Ok(())
    }
}

/// Gateway that hands out sequential invoice ids.
#[derive(Default)]
pub struct FakeGateway {
    pub requests: Mutex<Vec<InvoiceRequest>>,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_invoice(&self, request: &InvoiceRequest) -> AppResult<Invoice> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let n = requests.len();
        Ok(Invoice {
            invoice_id: format!("INV{}", n),
            pay_url: format!("https://t.me/CryptoBot?start=IV{}", n),
        })
    }
}
