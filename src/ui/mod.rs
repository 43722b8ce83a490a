use iced::{
    widget::{button, column, row, text, text_input, Space},
    Alignment, Element, Length,
};

use crate::domain::DownloadPhase;

/// Main view state
#[derive(Default)]
pub struct DownloadView {
    pub recording_url: String,
    pub stars: Option<u64>,
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    DownloadPressed,
}

/// Snapshot of the orchestrator the view renders from.
#[derive(Debug, Clone, Copy)]
pub struct StatusSnapshot<'a> {
    pub phase: DownloadPhase,
    pub busy: bool,
    pub error: Option<&'a str>,
}

pub fn button_label(status: &StatusSnapshot<'_>) -> &'static str {
    // A failed attempt keeps its phase until the reset; show the error instead.
    if status.error.is_some() {
        return "→ Download Video";
    }
    match status.phase {
        DownloadPhase::Idle => "→ Download Video",
        DownloadPhase::Processing => "Processing video...",
        DownloadPhase::Downloading => "Starting download...",
        DownloadPhase::Complete => "Download started!",
    }
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.recording_url = url;
            }
            DownloadMessage::DownloadPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn can_submit(&self, status: &StatusSnapshot<'_>) -> bool {
        !self.recording_url.trim().is_empty() && !status.busy
    }

    pub fn view(&self, status: StatusSnapshot<'_>) -> Element<'_, DownloadMessage> {
        let stars = match self.stars {
            Some(count) => format!("★ Star on GitHub  {}", count),
            None => "★ Star on GitHub".to_string(),
        };

        let mut download = button(text(button_label(&status)))
            .width(Length::Fill)
            .padding([10, 20]);
        if self.can_submit(&status) {
            download = download.on_press(DownloadMessage::DownloadPressed);
        }

        let mut content = column![
            row![
                text("VideoPull").size(20),
                Space::new().width(Length::Fill),
                text(stars).size(14),
            ]
            .align_y(Alignment::Center),
            Space::new().height(Length::Fixed(20.0)),
            text("Download Zoom Recordings").size(32),
            text("When Download is Disabled").size(24),
            Space::new().height(Length::Fixed(10.0)),
            text_input("Paste your Zoom recording URL here...", &self.recording_url)
                .on_input(DownloadMessage::UrlChanged)
                .on_submit(DownloadMessage::DownloadPressed)
                .padding(10),
            download,
            text("Processing usually takes 1-2 minutes").size(12),
        ]
        .padding(20)
        .spacing(10);

        if let Some(error) = status.error {
            content = content.push(text(error.to_string()).size(14).color([0.86, 0.15, 0.15]));
        }

        content.into()
    }
}
