use thiserror::Error;
use tickwatch_core::{CoreError, GatewayError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{}", .0.public_message())]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Setup(#[from] CoreError),

    #[error("strict mode failed: {unavailable} of {total} tickers unavailable")]
    StrictModeViolation { unavailable: usize, total: usize },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Gateway(GatewayError::InvalidInput(_)) => 2,
            Self::StrictModeViolation { .. } => 3,
            Self::Serialization(_) => 4,
            Self::Gateway(GatewayError::ServerFault(_)) => 5,
            Self::Setup(_) | Self::Io(_) => 10,
        }
    }
}
