use std::fmt;

/// A single user-initiated download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
}

impl DownloadRequest {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(url: &str) -> Option<Self> {
        let url = url.trim();
        if url.is_empty() {
            return None;
        }
        Some(Self {
            url: url.to_string(),
        })
    }
}

/// What the process backend hands back for a finished job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub download_url: String,
    pub file_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadPhase {
    #[default]
    Idle,
    Processing,
    Downloading,
    Complete,
}

impl fmt::Display for DownloadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DownloadPhase::Idle => "idle",
            DownloadPhase::Processing => "processing",
            DownloadPhase::Downloading => "downloading",
            DownloadPhase::Complete => "complete",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_rejects_blank_input() {
        assert!(DownloadRequest::new("").is_none());
        assert!(DownloadRequest::new("   \t\n").is_none());
    }

    #[test]
    fn test_request_trims_url() {
        let request = DownloadRequest::new("  https://zoom.us/rec/share/abc  ").unwrap();
        assert_eq!(request.url, "https://zoom.us/rec/share/abc");
    }
}
