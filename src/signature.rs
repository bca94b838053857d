//! Webhook signature verification.
//!
//! Inbound requests carry an `X-Signature` header holding the lowercase-hex
//! HMAC-SHA256 of the raw request body, keyed with the shared secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    secret: String,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// True when the verifier has a non-empty secret configured.
    pub fn is_configured(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Verify `signature` (hex HMAC-SHA256 of `raw_body`) against the shared
    /// secret. Returns false on any mismatch, malformed hex, empty header or
    /// unconfigured secret. Never errors.
    pub fn verify(&self, raw_body: &[u8], signature: &str) -> bool {
        // An empty secret must fail closed rather than accept everything.
        if self.secret.is_empty() || signature.is_empty() {
            return false;
        }

        let expected = match hex::decode(signature) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        let mut mac = match HmacSha256::new_from_slice(self.secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return false,
        };
        mac.update(raw_body);

        // verify_slice is constant-time.
        mac.verify_slice(&expected).is_ok()
    }
}
