use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::adapter::{NormalizedQuestion, NormalizedResponse};

/// Everything the analysis engine needs for one run: credentials plus the
/// already-normalized assessment data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model_name: String,
    pub assessment_title: Option<String>,
    pub questions: Vec<NormalizedQuestion>,
    pub student_responses: Vec<NormalizedResponse>,
}

/// Seam for the external analysis engine. The engine's internals (prompting,
/// scoring, insight generation) live on the other side of this trait.
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    /// Run one analysis and return the engine's envelope unchanged.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Value>;
}

/// HTTP client for the analysis engine endpoint.
#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, base_url }
    }
}

#[async_trait]
impl AnalysisEngine for AnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Value> {
        info!(
            "Delegating analysis of {} questions / {} responses to engine (model: {})",
            request.questions.len(),
            request.student_responses.len(),
            request.model_name
        );

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", request.api_key))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Analysis engine error ({}): {}", status, error_text);
            anyhow::bail!("Analysis engine error: {}", error_text);
        }

        let envelope: Value = response.json().await?;
        Ok(envelope)
    }
}
