use std::path::PathBuf;

use tracing::warn;
use url::Url;

use crate::api::ApiConfig;
use crate::telemetry::TelemetryConfig;

pub const DEFAULT_REPOSITORY: &str = "katcinskiy/zoom-downloader";

/// Everything resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub telemetry: TelemetryConfig,
    pub download_dir: PathBuf,
    pub repository: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut api = ApiConfig::default();
        if let Some(raw) = get("VIDEOPULL_BACKEND_URL") {
            match Url::parse(&raw) {
                Ok(url) => api.backend_url = url,
                Err(e) => warn!(value = %raw, error = %e, "ignoring invalid VIDEOPULL_BACKEND_URL"),
            }
        }

        let download_dir = get("VIDEOPULL_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            api,
            telemetry: TelemetryConfig {
                write_key: get("POSTHOG_KEY"),
                host: get("POSTHOG_HOST"),
            },
            download_dir,
            repository: get("VIDEOPULL_REPOSITORY").unwrap_or_else(|| DEFAULT_REPOSITORY.to_string()),
        }
    }
}
