use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_BACKEND_URL: &str =
    "https://video-pull-backend-384830585075.us-central1.run.app";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Body of `POST /process`
#[derive(Debug, Clone, Serialize)]
pub struct ProcessRequest<'a> {
    pub url: &'a str,
}

/// Successful response from `POST /process`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessResponse {
    pub download_url: String,
    pub file_size: u64,
}

/// The only field of the GitHub repository payload we read
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryResponse {
    pub stargazers_count: u64,
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub backend_url: Url,
    pub github_api_url: String,
}

impl ApiConfig {
    pub fn process_url(&self) -> String {
        format!("{}/process", self.backend_url.as_str().trim_end_matches('/'))
    }

    pub fn repository_url(&self, repository: &str) -> String {
        format!(
            "{}/repos/{}",
            self.github_api_url.trim_end_matches('/'),
            repository.trim_matches('/')
        )
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            backend_url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL is valid"),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_url_ignores_trailing_slash() {
        let config = ApiConfig {
            backend_url: Url::parse("http://localhost:8000/").unwrap(),
            ..Default::default()
        };
        assert_eq!(config.process_url(), "http://localhost:8000/process");
    }

    #[test]
    fn test_repository_url() {
        let config = ApiConfig::default();
        assert_eq!(
            config.repository_url("katcinskiy/zoom-downloader"),
            "https://api.github.com/repos/katcinskiy/zoom-downloader"
        );
    }
}
