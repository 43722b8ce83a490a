use futures::Stream;
use futures::TryStreamExt;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use super::models::{ApiConfig, ProcessRequest, ProcessResponse, RepositoryResponse};

const USER_AGENT: &str = concat!("videopull/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Server responded with status {0}")]
    Status(u16),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { config, http }
    }

    /// Ask the backend to extract the recording behind `recording_url`.
    /// Resolves once the backend has uploaded the file somewhere downloadable.
    pub async fn process(&self, recording_url: &str) -> Result<ProcessResponse> {
        let endpoint = self.config.process_url();
        debug!(%endpoint, "posting process request");

        let response = self
            .http
            .post(&endpoint)
            .json(&ProcessRequest { url: recording_url })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        response
            .json::<ProcessResponse>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))
    }

    /// Star count for `owner/name` on GitHub
    pub async fn star_count(&self, repository: &str) -> Result<u64> {
        let response = self
            .http
            .get(self.config.repository_url(repository))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?;

        let repo: RepositoryResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        Ok(repo.stargazers_count)
    }

    /// Returns (total_size, stream)
    pub async fn download_file_stream(
        &self,
        download_url: &str,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let response = self.http.get(download_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((total_size, stream))
    }
}
