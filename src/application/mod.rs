pub mod file_saver;
pub mod orchestrator;

pub use file_saver::DownloadDirSaver;
pub use orchestrator::{DownloadOrchestrator, OrchestratorEvent};
