use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::{header, Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app_config::DeepLConfig;
use crate::errors::RemoteError;
use crate::language_utils::to_deepl_glossary_code;
use crate::providers::{GlossaryProvider, RemoteGlossary};

/// DeepL client for the glossary endpoints of the v2 API
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, always ending in '/'
    base_url: Url,
}

impl std::fmt::Debug for DeepL {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepL")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Glossary creation request
#[derive(Debug, Serialize)]
pub struct CreateGlossaryRequest<'a> {
    name: &'a str,
    source_lang: String,
    target_lang: String,
    entries: &'a str,
    entries_format: &'static str,
}

/// Glossary as returned by the API
#[derive(Debug, Deserialize)]
pub struct GlossaryResponse {
    pub glossary_id: String,
    pub name: String,
    #[serde(default)]
    pub entry_count: i64,
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    detail: Option<String>,
}

impl DeepL {
    /// Create a new DeepL client
    pub fn new(api_key: impl Into<String>, endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let mut base_url =
            Url::parse(endpoint).with_context(|| format!("Invalid DeepL endpoint: {}", endpoint))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url,
        })
    }

    /// Create a client from the configuration
    pub fn from_config(config: &DeepLConfig) -> Result<Self> {
        Self::new(config.api_key.clone(), &config.get_endpoint(), config.timeout_secs)
    }

    fn url(&self, path: &str) -> Result<Url, RemoteError> {
        self.base_url
            .join(path)
            .map_err(|e| RemoteError::BadRequest(format!("Invalid glossary URL '{}': {}", path, e)))
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }

    /// Turn a non-success response into a typed error
    async fn error_from_response(response: Response) -> RemoteError {
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();

        let err = map_status_error(status, &body, retry_after);
        error!("DeepL API error ({}): {}", status, err);
        err
    }
}

/// Map an HTTP error status to a remote error
pub fn map_status_error(status: u16, body: &str, retry_after_secs: Option<u64>) -> RemoteError {
    let message = error_message(status, body);
    match status {
        401 | 403 => RemoteError::Authentication(message),
        456 => RemoteError::QuotaExceeded(message),
        429 => RemoteError::RateLimited { message, retry_after_secs },
        400 | 413 | 415 => RemoteError::BadRequest(message),
        404 => RemoteError::NotFound(message),
        _ => RemoteError::Server { status_code: status, message },
    }
}

/// Map a transport failure to a remote error
fn map_transport_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout(e.to_string())
    } else if e.is_connect() {
        RemoteError::Connection(e.to_string())
    } else {
        RemoteError::Connection(format!("Failed to send request to DeepL API: {}", e))
    }
}

fn error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        let parts: Vec<String> = [parsed.message, parsed.detail].into_iter().flatten().collect();
        if !parts.is_empty() {
            return parts.join(": ");
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status)
    } else {
        trimmed.to_string()
    }
}

fn glossary_code(code: &str) -> Result<String, RemoteError> {
    to_deepl_glossary_code(code).map_err(|e| RemoteError::BadRequest(e.to_string()))
}

#[async_trait]
impl GlossaryProvider for DeepL {
    async fn create_glossary(
        &self,
        name: &str,
        source_language: &str,
        target_language: &str,
        entries_tsv: &str,
    ) -> Result<RemoteGlossary, RemoteError> {
        let request = CreateGlossaryRequest {
            name,
            source_lang: glossary_code(source_language)?,
            target_lang: glossary_code(target_language)?,
            entries: entries_tsv,
            entries_format: "tsv",
        };
        let url = self.url("v2/glossaries")?;
        debug!("Creating DeepL glossary '{}' ({} -> {})", name, request.source_lang, request.target_lang);

        let response = self
            .client
            .post(url)
            .header(header::AUTHORIZATION, self.auth_header())
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let glossary = response
            .json::<GlossaryResponse>()
            .await
            .map_err(|e| RemoteError::Server {
                status_code: 200,
                message: format!("Failed to parse DeepL glossary response: {}", e),
            })?;

        Ok(RemoteGlossary {
            glossary_id: glossary.glossary_id,
            name: glossary.name,
            entry_count: glossary.entry_count,
        })
    }

    async fn delete_glossary(&self, glossary_id: &str) -> Result<(), RemoteError> {
        let url = self.url(&format!("v2/glossaries/{}", glossary_id))?;
        debug!("Deleting DeepL glossary {}", glossary_id);

        let response = self
            .client
            .delete(url)
            .header(header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "DeepL"
    }
}
