use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of `POST /recommend`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    pub top_k: i64,
}

/// One ranked result item returned by the recommendation service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub assessment_name: String,
    pub canonical_url: String,
    pub test_type: String,
    pub skills_tags: String,
    pub score: f64,
}

/// Successful response of `POST /recommend`. The recommendation order is
/// server-determined and must be preserved on render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub query: String,
    pub recommendations: Vec<Recommendation>,
}

/// Body shape the service uses for non-2xx responses.
#[derive(Clone, Debug, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response. The message comes from the body's `error` field
    /// when present, otherwise it names the HTTP status.
    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("request failed: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// 2xx response whose body does not decode as a `RecommendResponse`.
    #[error("invalid response body: {detail}")]
    Decode { detail: String },
}

/// Seam between the search controller and the recommendation backend.
#[async_trait]
pub trait RecommendService: Send + Sync {
    async fn recommend(&self, request: &RecommendRequest) -> Result<RecommendResponse, ApiError>;
}

/// reqwest-backed client for the `/recommend` endpoint.
#[derive(Clone, Debug)]
pub struct HttpRecommendClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRecommendClient {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/recommend", self.base_url)
    }
}

/// Decodes a 2xx body, surfacing malformed JSON or a missing/mistyped field
/// as a decode error rather than a generic failure.
pub(crate) fn decode_response(body: &str) -> Result<RecommendResponse, ApiError> {
    serde_json::from_str::<RecommendResponse>(body).map_err(|e| ApiError::Decode {
        detail: e.to_string(),
    })
}

/// Derives the user-facing message for a non-2xx response. A body that is
/// not JSON, or carries no `error` field, falls back to the status code.
pub(crate) fn service_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("request failed with status {status}"));
    ApiError::Service { status, message }
}

#[async_trait]
impl RecommendService for HttpRecommendClient {
    async fn recommend(&self, request: &RecommendRequest) -> Result<RecommendResponse, ApiError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(service_error(status.as_u16(), &body));
        }
        decode_response(&body)
    }
}
