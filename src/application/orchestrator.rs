use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, info, warn};

use crate::{
    api::{ApiClient, ApiError},
    application::file_saver::{FileSaver, SUGGESTED_FILE_NAME},
    domain::{AppError, DownloadPhase, DownloadRequest, ProcessResult},
    telemetry::{Telemetry, TelemetryEvent},
};

/// How long `Complete` (or a failure) stays on screen before going back to idle.
pub const RESET_DELAY: Duration = Duration::from_secs(2);

/// Reported with `download_successful`: the file is served from cloud storage.
pub const DELIVERY_METHOD: &str = "cloud_storage";

/// A pending asynchronous step. Its output goes back into
/// [`DownloadOrchestrator::handle`].
pub type Job = BoxFuture<'static, OrchestratorEvent>;

/// Results of pending steps. Each carries the generation of the submit that
/// started it.
#[derive(Debug, Clone)]
pub enum OrchestratorEvent {
    Processed {
        generation: u64,
        result: Result<ProcessResult, AppError>,
    },
    SaveTriggered {
        generation: u64,
        file_size: u64,
        result: Result<(), AppError>,
    },
    ResetElapsed {
        generation: u64,
    },
}

pub struct DownloadOrchestrator {
    api_client: ApiClient,
    saver: Arc<dyn FileSaver>,
    telemetry: Telemetry,
    reset_delay: Duration,
    phase: DownloadPhase,
    error: Option<String>,
    generation: u64,
}

impl DownloadOrchestrator {
    pub fn new(api_client: ApiClient, saver: Arc<dyn FileSaver>, telemetry: Telemetry) -> Self {
        Self {
            api_client,
            saver,
            telemetry,
            reset_delay: RESET_DELAY,
            phase: DownloadPhase::Idle,
            error: None,
            generation: 0,
        }
    }

    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    pub fn phase(&self) -> DownloadPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True from submit until the phase is back to `Idle`, including the
    /// wind-down after `Complete` or a failure. Submits are ignored meanwhile.
    pub fn is_busy(&self) -> bool {
        self.phase != DownloadPhase::Idle
    }

    /// Start a download attempt. Returns `None` when the input is blank or the
    /// previous attempt has not wound down yet.
    pub fn submit(&mut self, url: &str) -> Option<Job> {
        let request = DownloadRequest::new(url)?;
        if self.is_busy() {
            debug!(phase = %self.phase, "submit ignored while busy");
            return None;
        }

        self.telemetry.capture(TelemetryEvent::new("download_clicked"));

        self.generation += 1;
        self.error = None;
        self.transition(DownloadPhase::Processing);
        info!(url = %request.url, generation = self.generation, "processing recording");

        let generation = self.generation;
        let client = self.api_client.clone();
        Some(
            async move {
                let result = client
                    .process(&request.url)
                    .await
                    .map(|response| ProcessResult {
                        download_url: response.download_url,
                        file_size: response.file_size,
                    })
                    .map_err(classify);
                OrchestratorEvent::Processed { generation, result }
            }
            .boxed(),
        )
    }

    pub fn handle(&mut self, event: OrchestratorEvent) -> Option<Job> {
        match event {
            OrchestratorEvent::Processed { generation, result } => {
                if generation != self.generation {
                    warn!(generation, "dropping result of a superseded request");
                    return None;
                }
                match result {
                    Ok(processed) => {
                        self.transition(DownloadPhase::Downloading);
                        let saver = self.saver.clone();
                        Some(
                            async move {
                                let result =
                                    saver.trigger(&processed.download_url, SUGGESTED_FILE_NAME);
                                OrchestratorEvent::SaveTriggered {
                                    generation,
                                    file_size: processed.file_size,
                                    result,
                                }
                            }
                            .boxed(),
                        )
                    }
                    Err(e) => Some(self.fail(e)),
                }
            }
            OrchestratorEvent::SaveTriggered {
                generation,
                file_size,
                result,
            } => {
                if generation != self.generation {
                    warn!(generation, "dropping save of a superseded request");
                    return None;
                }
                match result {
                    Ok(()) => {
                        self.transition(DownloadPhase::Complete);
                        self.telemetry.capture(
                            TelemetryEvent::new("download_successful")
                                .with("file_size", file_size)
                                .with("method", DELIVERY_METHOD),
                        );
                        info!(file_size, "download started");
                        Some(self.schedule_reset())
                    }
                    Err(e) => Some(self.fail(e)),
                }
            }
            OrchestratorEvent::ResetElapsed { generation } => {
                if generation == self.generation {
                    self.transition(DownloadPhase::Idle);
                } else {
                    debug!(generation, current = self.generation, "stale reset ignored");
                }
                None
            }
        }
    }

    fn fail(&mut self, error: AppError) -> Job {
        let event = match &error {
            AppError::ProcessingFailed { status } => {
                TelemetryEvent::new("download_error").with("status_code", *status)
            }
            AppError::ClientError(_) | AppError::Io(_) => {
                TelemetryEvent::new("download_error").with("error_type", "client_error")
            }
        };
        self.telemetry.capture(event);

        warn!(error = %error, phase = %self.phase, "download failed");
        self.error = Some(format!("Download failed: {}", error));
        self.schedule_reset()
    }

    fn schedule_reset(&self) -> Job {
        let generation = self.generation;
        let delay = self.reset_delay;
        async move {
            tokio::time::sleep(delay).await;
            OrchestratorEvent::ResetElapsed { generation }
        }
        .boxed()
    }

    fn transition(&mut self, next: DownloadPhase) {
        debug!(from = %self.phase, to = %next, "phase transition");
        self.phase = next;
    }
}

fn classify(error: ApiError) -> AppError {
    match error {
        ApiError::Status(status) => AppError::ProcessingFailed { status },
        other => AppError::ClientError(other.to_string()),
    }
}
