use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header LINE puts the request signature in
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Checks that a webhook body was signed by the messaging platform.
///
/// The signature is `base64(HMAC-SHA256(channel_secret, raw_body))`.
#[derive(Clone)]
pub struct SignatureVerifier {
    channel_secret: String,
}

impl SignatureVerifier {
    pub fn new(channel_secret: String) -> Self {
        Self { channel_secret }
    }

    /// Compute the base64 signature for a body
    pub fn sign(&self, body: &[u8]) -> Option<String> {
        let mut mac = self.mac()?;
        mac.update(body);
        Some(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Verify a signature header value against the raw body.
    ///
    /// Comparison happens on the decoded digest in constant time.
    pub fn verify(&self, body: &[u8], signature: &str) -> bool {
        let expected = match STANDARD.decode(signature.trim()) {
            Ok(bytes) => bytes,
            Err(_) => {
                tracing::debug!("Signature header is not valid base64");
                return false;
            }
        };

        let mut mac = match self.mac() {
            Some(mac) => mac,
            None => return false,
        };
        mac.update(body);
        mac.verify_slice(&expected).is_ok()
    }

    fn mac(&self) -> Option<HmacSha256> {
        match HmacSha256::new_from_slice(self.channel_secret.as_bytes()) {
            Ok(mac) => Some(mac),
            Err(_) => {
                tracing::warn!("Failed to create HMAC");
                None
            }
        }
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("channel_secret", &"<redacted>")
            .finish()
    }
}
