use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use crate::error::Result;

type HmacSha512 = Hmac<Sha512>;

/// Trait for verifying webhook signatures
///
/// Different webhook providers use different signature algorithms. Implement
/// this trait to verify webhooks from your provider; hookgate ships
/// [`HmacSha512Verifier`] for the Paystack scheme.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    /// Verify the claimed signature against the raw payload bytes
    ///
    /// The payload must be the exact bytes received on the wire, prior to
    /// any parsing. Re-serialized JSON will not verify: whitespace and key
    /// order change the byte sequence the sender signed.
    ///
    /// Returns `Ok(true)` if the signature is valid, `Ok(false)` if not,
    /// `Err` only for internal failures.
    async fn verify_signature(&self, payload: &[u8], signature: &str) -> Result<bool>;
}

/// HMAC-SHA512 webhook verifier with timing-safe comparison
///
/// Paystack signs each delivery with `HMAC-SHA512(secret, raw_body)` rendered
/// as lowercase hex in the `x-paystack-signature` header. The secret is held
/// as a [`SecretString`] so it never shows up in debug output or logs.
pub struct HmacSha512Verifier {
    secret: SecretString,
}

impl HmacSha512Verifier {
    pub fn new(secret: impl Into<SecretString>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Compute the expected MAC over a payload
    fn compute_mac(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut mac = HmacSha512::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| crate::error::HookgateError::internal("HMAC key error"))?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// The expected signature for a payload, as lowercase hex
    pub fn expected_signature(&self, payload: &[u8]) -> Result<String> {
        Ok(hex::encode(self.compute_mac(payload)?))
    }
}

/// Constant-time comparison to prevent timing attacks
///
/// Uses the `subtle` crate, which carries optimization barriers that stop
/// the compiler from turning the bitwise comparison back into an
/// early-exiting branch. Equality must not leak how many leading bytes
/// matched.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[async_trait]
impl SignatureVerifier for HmacSha512Verifier {
    async fn verify_signature(&self, payload: &[u8], signature: &str) -> Result<bool> {
        // A claimed value that is not valid hex can never match the MAC
        let provided = match hex::decode(signature) {
            Ok(bytes) => bytes,
            Err(_) => {
                tracing::debug!("Failed to decode webhook signature as hex");
                return Ok(false);
            }
        };

        let expected = self.compute_mac(payload)?;

        let is_valid = constant_time_compare(&expected, &provided);

        if !is_valid {
            tracing::debug!("Webhook signature verification failed");
        }

        Ok(is_valid)
    }
}
