use chrono::{DateTime, Utc};

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("clock moved backwards: {current} is before {previous}")]
    ClockAnomaly {
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("execution already ran; create a new simulator per parent order")]
    AlreadyExecuted,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
