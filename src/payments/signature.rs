//! Crypto Pay webhook signature check
//!
//! The gateway signs the raw request body with HMAC-SHA256, keyed with the
//! SHA-256 digest of the API token, and sends the hex digest in the
//! `crypto-pay-api-signature` header.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "crypto-pay-api-signature";

/// Signing key derived from the API token.
pub fn signing_key(api_token: &str) -> Vec<u8> {
    Sha256::digest(api_token.as_bytes()).to_vec()
}

/// Hex signature of `body`; what the gateway would send.
pub fn sign(key: &[u8], body: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time comparison of the received hex signature.
pub fn verify(key: &[u8], body: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_signature_accepted() {
        let key = signing_key("12345:AAAtoken");
        let body = br#"{"invoice_id":"INV1","status":"paid"}"#;
        let signature = sign(&key, body);

        assert_eq!(signature.len(), 64);
        assert!(verify(&key, body, &signature));
    }

    #[test]
    fn test_tampered_body_or_wrong_key_rejected() {
        let key = signing_key("12345:AAAtoken");
        let body = br#"{"invoice_id":"INV1","status":"paid"}"#;
        let signature = sign(&key, body);

        assert!(!verify(&key, br#"{"invoice_id":"INV2","status":"paid"}"#, &signature));
        assert!(!verify(&signing_key("other"), body, &signature));
        assert!(!verify(&key, body, "not-hex"));
    }
}
