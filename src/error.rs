use offboard_pilot_core::MissionError;

/// Errors that end an offboard run before or during the mission.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Expected exactly one connection URL")]
    Usage,

    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Timeout waiting for {0}")]
    Timeout(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Mission(#[from] MissionError),
}
