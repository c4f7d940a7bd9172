use thiserror::Error;
use tokio::task::JoinError;

use netvakt_capture::CaptureError;
use netvakt_config::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("background task failed: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<JoinError> for EngineError {
    fn from(err: JoinError) -> Self {
        EngineError::Task(err.to_string())
    }
}
