use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// The backend answered with a non-success status.
    #[error("Video processing failed")]
    ProcessingFailed { status: u16 },

    /// The request never completed, the response could not be read,
    /// or the file save could not be started.
    #[error("{0}")]
    ClientError(String),

    #[error("I/O error: {0}")]
    Io(String),
}
