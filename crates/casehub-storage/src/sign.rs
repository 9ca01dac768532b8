//! URL signing for the local object store.
//!
//! S3 mints its own presigned URLs; the local provider signs download
//! URLs itself with a keyed SHA-256 token over `(path, expiry)`. The API
//! exposes `GET /objects/{path}` which redeems these tokens.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Mints and verifies signed download tokens for local objects.
#[derive(Debug, Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
}

impl UrlSigner {
    /// Create a signer from a configured secret, or a random per-process
    /// secret when the configuration leaves it empty.
    pub fn new(secret: &str) -> Self {
        let secret = if secret.is_empty() {
            rand::rng().random::<[u8; 32]>().to_vec()
        } else {
            secret.as_bytes().to_vec()
        };
        Self { secret }
    }

    /// Compute the signature for an object path valid until `expires_unix`.
    pub fn sign(&self, path: &str, expires_unix: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(path.as_bytes());
        hasher.update(expires_unix.to_be_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }

    /// Verify a presented signature against the path and expiry it claims.
    /// Comparison runs in constant time over the token bytes.
    pub fn verify(&self, path: &str, expires_unix: u64, signature: &str) -> bool {
        let now = chrono::Utc::now().timestamp();
        if now < 0 || expires_unix < now as u64 {
            return false;
        }
        let expected = self.sign(path, expires_unix);
        expected.as_bytes().ct_eq(signature.as_bytes()).into()
    }
}
