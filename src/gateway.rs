use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapter::{self, RawFormQuestion, RawFormResponse};
use crate::analysis::{AnalysisClient, AnalysisEngine, AnalysisRequest};
use crate::config::{AppConfig, CredentialMode};
use crate::error::ApiError;
use crate::license::{evaluate, LicenseClient, LicenseVerifier, TransportError};

/// Body of POST /analyze. Credentials may come from here or from server
/// config depending on the deployment's credential mode.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub assessment_title: Option<String>,
    #[serde(default)]
    pub questions: Option<Vec<RawFormQuestion>>,
    #[serde(default)]
    pub responses: Option<Vec<RawFormResponse>>,
    #[serde(default)]
    pub license_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActivationSuccess {
    pub success: bool,
    pub message: &'static str,
}

/// Single entry point behind the HTTP boundary. Each request runs
/// validate → license check → adapt → delegate, in that order; the license
/// check must complete before the analysis call is made, so the two outbound
/// calls are sequential by construction.
pub struct AnalysisGateway {
    config: AppConfig,
    verifier: Option<Arc<dyn LicenseVerifier>>,
    engine: Arc<dyn AnalysisEngine>,
}

impl AnalysisGateway {
    pub fn new(
        config: AppConfig,
        verifier: Option<Arc<dyn LicenseVerifier>>,
        engine: Arc<dyn AnalysisEngine>,
    ) -> Self {
        Self {
            config,
            verifier,
            engine,
        }
    }

    /// Wire up the production clients. Licensing is enabled only when a
    /// vendor product id is configured.
    pub fn from_config(config: AppConfig) -> Self {
        let verifier: Option<Arc<dyn LicenseVerifier>> =
            config.gumroad_product_id.as_ref().map(|product_id| {
                Arc::new(LicenseClient::new(
                    product_id.clone(),
                    config.vendor_verify_url.clone(),
                    Duration::from_secs(config.vendor_timeout_secs),
                )) as Arc<dyn LicenseVerifier>
            });
        let engine = Arc::new(AnalysisClient::new(
            config.analysis_url.clone(),
            Duration::from_secs(config.analysis_timeout_secs),
        ));
        Self::new(config, verifier, engine)
    }

    pub async fn handle_analyze(&self, request: AnalyzeRequest) -> Result<Value, ApiError> {
        // An absent collection is a client error. An empty questions list is
        // deliberately accepted: only responses.len() == 0 trips MissingData.
        let questions = request.questions.ok_or(ApiError::MissingData)?;
        let responses = request.responses.ok_or(ApiError::MissingData)?;
        if responses.is_empty() {
            return Err(ApiError::MissingData);
        }

        if let Some(verifier) = &self.verifier {
            let key = request.license_key.as_deref().map(str::trim).unwrap_or("");
            if key.is_empty() {
                return Err(ApiError::Unauthorized);
            }
            // Read-only verification: the usage counter is only incremented
            // on activation.
            let record = verifier.verify(key, false).await?;
            let decision = evaluate(&record, Utc::now());
            if !decision.allowed {
                let reason = decision
                    .reason
                    .unwrap_or_else(|| "Access denied.".to_string());
                warn!("License denied: {}", reason);
                return Err(ApiError::Forbidden(reason));
            }
        }

        let api_key = match self.config.credential_mode {
            CredentialMode::FromRequest => request
                .api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or(ApiError::MissingData)?,
            CredentialMode::FromServerConfig => {
                self.config.server_api_key.clone().ok_or_else(|| {
                    ApiError::ServerMisconfigured(
                        "Server analysis credentials are not configured.".to_string(),
                    )
                })?
            }
        };
        let model_name = request
            .model_name
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.config.default_model.clone());

        let analysis_request = AnalysisRequest {
            api_key,
            model_name,
            assessment_title: request.assessment_title,
            questions: adapter::adapt_questions(&questions),
            student_responses: adapter::adapt_responses(&responses),
        };

        info!(
            "Running analysis: {} questions, {} responses",
            analysis_request.questions.len(),
            analysis_request.student_responses.len()
        );

        match self.engine.analyze(&analysis_request).await {
            Ok(envelope) => Ok(envelope),
            Err(e) => {
                error!("Analysis engine failure: {}", e);
                Err(ApiError::Internal(e.to_string()))
            }
        }
    }

    /// Activate a license key: one vendor round-trip with the usage counter
    /// incremented, then the same entitlement rules as /analyze.
    pub async fn activate_license(&self, license_key: &str) -> Result<ActivationSuccess, ApiError> {
        let verifier = self.verifier.as_ref().ok_or_else(|| {
            ApiError::ServerMisconfigured("Server not configured for licensing.".to_string())
        })?;

        let record = verifier.verify(license_key, true).await?;
        let decision = evaluate(&record, Utc::now());
        if !decision.allowed {
            let reason = decision
                .reason
                .unwrap_or_else(|| "Access denied.".to_string());
            warn!("License activation denied: {}", reason);
            return Err(ApiError::Forbidden(reason));
        }

        info!("License activated");
        Ok(ActivationSuccess {
            success: true,
            message: "License activated successfully!",
        })
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::InvalidKey => ApiError::Forbidden(err.to_string()),
            TransportError::Rejected(message) => ApiError::Forbidden(message),
            TransportError::Protocol | TransportError::Connection => {
                ApiError::Transport(err.to_string())
            }
        }
    }
}
