use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use schema::{
    DocumentResponse, DocumentStats, DocumentUpload, HealthResponse, QueryRequest, QueryResponse,
    QueryServiceHealth,
};

use crate::error::RequestFailure;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

// The trailing slash on the query route is part of the backend's path.
pub const QUERY_PATH: &str = "/api/query/";
pub const UPLOAD_PATH: &str = "/api/documents/upload";
pub const BATCH_UPLOAD_PATH: &str = "/api/documents/batch-upload";
pub const STATS_PATH: &str = "/api/documents/stats";
pub const HEALTH_PATH: &str = "/health";
pub const QUERY_HEALTH_PATH: &str = "/api/query/health";

/// JSON-over-HTTP client for the question-answering backend. Cheap to clone;
/// clones share one connection pool.
#[derive(Clone, Debug)]
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /api/query/`
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, RequestFailure> {
        self.post_json(QUERY_PATH, request).await
    }

    /// `POST /api/documents/upload`
    pub async fn upload_document(
        &self,
        document: &DocumentUpload,
    ) -> Result<DocumentResponse, RequestFailure> {
        self.post_json(UPLOAD_PATH, document).await
    }

    /// `POST /api/documents/batch-upload`; one response per document, in order.
    pub async fn batch_upload(
        &self,
        documents: &[DocumentUpload],
    ) -> Result<Vec<DocumentResponse>, RequestFailure> {
        self.post_json(BATCH_UPLOAD_PATH, documents).await
    }

    /// `GET /api/documents/stats`
    pub async fn document_stats(&self) -> Result<DocumentStats, RequestFailure> {
        self.get_json(STATS_PATH).await
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthResponse, RequestFailure> {
        self.get_json(HEALTH_PATH).await
    }

    /// `GET /api/query/health`; store details as seen by the query service.
    pub async fn query_health(&self) -> Result<QueryServiceHealth, RequestFailure> {
        self.get_json(QUERY_HEALTH_PATH).await
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, RequestFailure>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(method = "POST", url = %url, "Sending backend request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| RequestFailure::Transport {
                url: url.clone(),
                source,
            })?;

        decode(url, response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, RequestFailure> {
        let url = self.endpoint(path);
        debug!(method = "GET", url = %url, "Sending backend request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| RequestFailure::Transport {
                url: url.clone(),
                source,
            })?;

        decode(url, response).await
    }
}

// Any non-2xx is a failure; the error body is not inspected.
async fn decode<R: DeserializeOwned>(
    url: String,
    response: reqwest::Response,
) -> Result<R, RequestFailure> {
    let status = response.status();
    if !status.is_success() {
        warn!(url = %url, status = status.as_u16(), "Backend returned an error status");
        return Err(RequestFailure::Status {
            url,
            status: status.as_u16(),
        });
    }

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(source) => return Err(RequestFailure::Transport { url, source }),
    };

    serde_json::from_slice(&bytes).map_err(|source| RequestFailure::Decode { url, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_on_base_are_trimmed() {
        let client = BackendClient::new("http://backend:8000//");
        assert_eq!(client.base_url(), "http://backend:8000");
        assert_eq!(client.endpoint(QUERY_PATH), "http://backend:8000/api/query/");
    }

    #[test]
    fn default_client_points_at_dev_backend() {
        assert_eq!(
            BackendClient::new(DEFAULT_BASE_URL).endpoint(UPLOAD_PATH),
            "http://localhost:8000/api/documents/upload"
        );
    }
}
