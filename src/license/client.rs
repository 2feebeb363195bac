use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PurchaseRecord;

/// Transport-level outcomes of a vendor verification call. Terminal for the
/// current request: the call is never retried, because a retry with
/// `increment_use` set would decrement the vendor-side usage counter twice.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("License key is missing or invalid.")]
    InvalidKey,
    #[error("{0}")]
    Rejected(String),
    #[error("Invalid response from license server.")]
    Protocol,
    #[error("Connection error.")]
    Connection,
}

/// Seam for the vendor licensing provider so the gateway can be exercised
/// without network access.
#[async_trait]
pub trait LicenseVerifier: Send + Sync {
    /// One verification round-trip. `increment_use` is the only difference
    /// between activation (true) and read-only verification (false); the
    /// protocol is otherwise identical.
    async fn verify(
        &self,
        license_key: &str,
        increment_use: bool,
    ) -> Result<PurchaseRecord, TransportError>;
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    product_id: &'a str,
    license_key: &'a str,
    increment_uses_count: bool,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    purchase: Option<PurchaseRecord>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the Gumroad license verification endpoint.
#[derive(Clone)]
pub struct LicenseClient {
    client: Client,
    verify_url: String,
    product_id: String,
}

impl LicenseClient {
    pub fn new(product_id: String, verify_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            verify_url,
            product_id,
        }
    }
}

#[async_trait]
impl LicenseVerifier for LicenseClient {
    async fn verify(
        &self,
        license_key: &str,
        increment_use: bool,
    ) -> Result<PurchaseRecord, TransportError> {
        let key = license_key.trim();
        if key.is_empty() {
            return Err(TransportError::InvalidKey);
        }

        let payload = VerifyRequest {
            product_id: &self.product_id,
            license_key: key,
            increment_uses_count: increment_use,
        };

        info!("Verifying license with vendor (increment_use: {})", increment_use);

        let response = self
            .client
            .post(&self.verify_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                warn!("License server unreachable: {}", e);
                TransportError::Connection
            })?;

        // The vendor signals rejection through the `success` flag in the body,
        // not through the HTTP status, so the body is parsed unconditionally.
        let body = response.text().await.map_err(|e| {
            warn!("Failed to read license server response: {}", e);
            TransportError::Connection
        })?;

        let parsed: VerifyResponse = serde_json::from_str(&body).map_err(|e| {
            warn!("Malformed license server response: {}", e);
            TransportError::Protocol
        })?;

        interpret(parsed)
    }
}

fn interpret(response: VerifyResponse) -> Result<PurchaseRecord, TransportError> {
    if response.success {
        Ok(response.purchase.unwrap_or_default())
    } else {
        Err(TransportError::Rejected(
            response
                .message
                .unwrap_or_else(|| "Invalid or expired license.".to_string()),
        ))
    }
}
