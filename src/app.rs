use std::sync::Arc;

use iced::Task;
use tracing::debug;

use crate::api::ApiClient;
use crate::application::{DownloadDirSaver, DownloadOrchestrator, OrchestratorEvent};
use crate::config::AppConfig;
use crate::telemetry::Telemetry;
use crate::ui::{DownloadMessage, DownloadView, StatusSnapshot};

pub struct DownloadApp {
    view: DownloadView,
    orchestrator: DownloadOrchestrator,
}

impl DownloadApp {
    /// Build the app and kick off the star count lookup.
    pub fn new(config: AppConfig, telemetry: Telemetry) -> (Self, Task<Message>) {
        let api_client = ApiClient::new(config.api.clone());
        let saver = DownloadDirSaver::new(api_client.clone(), config.download_dir.clone());
        let orchestrator = DownloadOrchestrator::new(api_client.clone(), Arc::new(saver), telemetry);

        let app = Self {
            view: DownloadView::default(),
            orchestrator,
        };

        let repository = config.repository;
        let stars = Task::perform(
            async move {
                match api_client.star_count(&repository).await {
                    Ok(count) => Some(count),
                    Err(e) => {
                        debug!(error = %e, "star count unavailable");
                        None
                    }
                }
            },
            Message::StarsLoaded,
        );

        (app, stars)
    }

    fn status(&self) -> StatusSnapshot<'_> {
        StatusSnapshot {
            phase: self.orchestrator.phase(),
            busy: self.orchestrator.is_busy(),
            error: self.orchestrator.error(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// A pending download step finished
    Orchestrator(OrchestratorEvent),
    StarsLoaded(Option<u64>),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    let next = match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::DownloadPressed => {
                    app.orchestrator.submit(&app.view.recording_url)
                }
                DownloadMessage::UrlChanged(_) => None,
            }
        }
        Message::Orchestrator(event) => app.orchestrator.handle(event),
        Message::StarsLoaded(stars) => {
            app.view.stars = stars;
            None
        }
    };

    // iced Task::perform runs in the background tokio executor
    match next {
        Some(job) => Task::perform(job, Message::Orchestrator),
        None => Task::none(),
    }
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view(app.status()).map(Message::UiMessage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiConfig;
    use crate::domain::DownloadPhase;
    use crate::telemetry::TelemetryConfig;
    use std::path::PathBuf;
    use tokio::sync::mpsc::UnboundedReceiver;
    use url::Url;

    fn test_app() -> (DownloadApp, UnboundedReceiver<crate::telemetry::TelemetryEvent>) {
        let config = AppConfig {
            api: ApiConfig {
                // Nothing listens here; jobs are never driven in these tests.
                backend_url: Url::parse("http://127.0.0.1:1").unwrap(),
                github_api_url: "http://127.0.0.1:1".to_string(),
            },
            telemetry: TelemetryConfig::default(),
            download_dir: PathBuf::from("."),
            repository: "katcinskiy/zoom-downloader".to_string(),
        };
        let (telemetry, events) = Telemetry::recording();
        let (app, _stars) = DownloadApp::new(config, telemetry);
        (app, events)
    }

    fn clicks(events: &mut UnboundedReceiver<crate::telemetry::TelemetryEvent>) -> usize {
        let mut count = 0;
        while let Ok(event) = events.try_recv() {
            if event.name == "download_clicked" {
                count += 1;
            }
        }
        count
    }

    #[test]
    fn test_stars_loaded() {
        let (mut app, _events) = test_app();

        let _ = update(&mut app, Message::StarsLoaded(Some(42)));
        assert_eq!(app.view.stars, Some(42));

        let _ = update(&mut app, Message::StarsLoaded(None));
        assert_eq!(app.view.stars, None);
    }

    #[test]
    fn test_download_pressed_with_blank_url_does_nothing() {
        let (mut app, mut events) = test_app();

        let _ = update(&mut app, Message::UiMessage(DownloadMessage::DownloadPressed));
        assert_eq!(app.orchestrator.phase(), DownloadPhase::Idle);
        assert_eq!(clicks(&mut events), 0);
    }

    #[test]
    fn test_repeated_press_while_busy_submits_once() {
        let (mut app, mut events) = test_app();
        let url = "https://zoom.us/rec/share/abc".to_string();

        let _ = update(&mut app, Message::UiMessage(DownloadMessage::UrlChanged(url)));
        let _ = update(&mut app, Message::UiMessage(DownloadMessage::DownloadPressed));
        assert_eq!(app.orchestrator.phase(), DownloadPhase::Processing);

        // Enter in the text field sends the same message while the button is disabled.
        let _ = update(&mut app, Message::UiMessage(DownloadMessage::DownloadPressed));
        assert_eq!(app.orchestrator.phase(), DownloadPhase::Processing);
        assert_eq!(clicks(&mut events), 1);
    }

    #[test]
    fn test_orchestrator_events_are_routed() {
        let (mut app, _events) = test_app();
        let url = "https://zoom.us/rec/share/abc".to_string();

        let _ = update(&mut app, Message::UiMessage(DownloadMessage::UrlChanged(url)));
        let _ = update(&mut app, Message::UiMessage(DownloadMessage::DownloadPressed));

        let failed = OrchestratorEvent::Processed {
            generation: 1,
            result: Err(crate::domain::AppError::ProcessingFailed { status: 500 }),
        };
        let _ = update(&mut app, Message::Orchestrator(failed));
        assert_eq!(
            app.status().error,
            Some("Download failed: Video processing failed")
        );

        let _ = update(
            &mut app,
            Message::Orchestrator(OrchestratorEvent::ResetElapsed { generation: 1 }),
        );
        assert_eq!(app.orchestrator.phase(), DownloadPhase::Idle);
        assert!(!app.status().busy);
    }
}
