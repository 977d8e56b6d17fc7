//! Confirmation codes: HMAC-SHA256 over the submitted file's bytes.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::error::{Result, SiaError};
use crate::remote::ConfigSource;

type HmacSha256 = Hmac<Sha256>;

/// Key used when the secret resource cannot be fetched.
pub const DEFAULT_SECRET: &str = "default";

/// Lowercase hex digest handed back to the user as a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConfirmationCode(String);

impl ConfirmationCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ConfirmationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the code for `bytes` under `key`.
///
/// Any failure collapses into [`SiaError::Crypto`], whose message carries no
/// internal detail.
pub fn compute_code(bytes: &[u8], key: &[u8]) -> Result<ConfirmationCode> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| {
        tracing::error!(error = %e, "Failed to initialise HMAC");
        SiaError::Crypto
    })?;
    mac.update(bytes);
    Ok(ConfirmationCode(hex::encode(mac.finalize().into_bytes())))
}

pub struct ConfirmationCodeGenerator {
    source: Arc<dyn ConfigSource>,
    secret_resource: String,
}

impl ConfirmationCodeGenerator {
    pub fn new(source: Arc<dyn ConfigSource>, secret_resource: impl Into<String>) -> Self {
        Self {
            source,
            secret_resource: secret_resource.into(),
        }
    }

    /// Fetch the secret, falling back to [`DEFAULT_SECRET`] when it is unavailable.
    pub async fn secret(&self) -> String {
        match self.source.fetch_text(&self.secret_resource).await {
            Ok(secret) => secret.trim().to_string(),
            Err(e) => {
                tracing::warn!(
                    resource = %self.secret_resource,
                    error = %e,
                    "Secret unavailable, using default key"
                );
                DEFAULT_SECRET.to_string()
            }
        }
    }

    pub async fn generate(&self, bytes: &[u8]) -> Result<ConfirmationCode> {
        let secret = self.secret().await;
        compute_code(bytes, secret.as_bytes())
    }
}
