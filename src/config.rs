use log::{info, warn};

/// Where the analysis engine API key comes from for /analyze requests.
///
/// `FromRequest` is the self-serve mode (callers bring their own key),
/// `FromServerConfig` is the hosted mode (one server-held key for everyone).
/// Selected once at startup, never per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialMode {
    FromRequest,
    FromServerConfig,
}

/// Process-wide configuration, read once at startup and immutable afterwards.
/// Request handlers receive this through shared state and never touch the
/// environment themselves.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Gumroad product id. Licensing is enabled only when this is set.
    pub gumroad_product_id: Option<String>,
    pub vendor_verify_url: String,
    pub vendor_timeout_secs: u64,
    /// Analysis engine endpoint.
    pub analysis_url: String,
    pub analysis_timeout_secs: u64,
    /// Server-held analysis API key, required in hosted mode.
    pub server_api_key: Option<String>,
    pub default_model: String,
    pub credential_mode: CredentialMode,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let gumroad_product_id = std::env::var("GUMROAD_PRODUCT_ID").ok().filter(|v| !v.is_empty());
        let vendor_verify_url = std::env::var("GUMROAD_VERIFY_URL")
            .unwrap_or_else(|_| "https://api.gumroad.com/v2/licenses/verify".to_string());
        let vendor_timeout_secs = std::env::var("VENDOR_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .unwrap_or(15);
        let analysis_url =
            std::env::var("ANALYSIS_URL").unwrap_or_else(|_| "http://localhost:9000/analyze".to_string());
        let analysis_timeout_secs = std::env::var("ANALYSIS_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".to_string())
            .parse()
            .unwrap_or(120);
        let server_api_key = std::env::var("ANALYSIS_API_KEY").ok().filter(|v| !v.is_empty());
        let default_model = std::env::var("ANALYSIS_DEFAULT_MODEL")
            .unwrap_or_else(|_| "gemini-1.5-flash-latest".to_string());

        let credential_mode = match std::env::var("CREDENTIAL_MODE").as_deref() {
            Ok("server") => CredentialMode::FromServerConfig,
            Ok("request") | Err(_) => CredentialMode::FromRequest,
            Ok(other) => {
                warn!("Unknown CREDENTIAL_MODE '{}', falling back to request mode", other);
                CredentialMode::FromRequest
            }
        };

        if gumroad_product_id.is_some() {
            info!("Licensing enabled (Gumroad product configured)");
        } else {
            warn!("GUMROAD_PRODUCT_ID not set, running without license gating");
        }
        if credential_mode == CredentialMode::FromServerConfig && server_api_key.is_none() {
            warn!("CREDENTIAL_MODE=server but ANALYSIS_API_KEY is not set");
        }

        Self {
            bind_addr,
            gumroad_product_id,
            vendor_verify_url,
            vendor_timeout_secs,
            analysis_url,
            analysis_timeout_secs,
            server_api_key,
            default_model,
            credential_mode,
        }
    }
}
