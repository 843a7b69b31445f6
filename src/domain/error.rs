//! Domain error types.

/// Top-level error type for tradebot.
#[derive(Debug, thiserror::Error)]
pub enum TradebotError {
    #[error("invalid parameter {field}: {reason}")]
    InvalidParameters { field: String, reason: String },

    #[error("bar series is empty")]
    EmptySeries,

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("bar series is not strictly increasing at index {index}")]
    UnorderedSeries { index: usize },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradebotError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        TradebotError::InvalidParameters {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors the caller can fix by changing the request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TradebotError::InvalidParameters { .. }
                | TradebotError::EmptySeries
                | TradebotError::InsufficientData { .. }
                | TradebotError::UnorderedSeries { .. }
                | TradebotError::UnknownStrategy { .. }
        )
    }
}

impl From<&TradebotError> for std::process::ExitCode {
    fn from(err: &TradebotError) -> Self {
        let code: u8 = match err {
            TradebotError::Io(_) => 1,
            TradebotError::ConfigParse { .. }
            | TradebotError::ConfigMissing { .. }
            | TradebotError::ConfigInvalid { .. } => 2,
            TradebotError::Data { .. } => 3,
            TradebotError::InvalidParameters { .. } | TradebotError::UnknownStrategy { .. } => 4,
            TradebotError::EmptySeries
            | TradebotError::InsufficientData { .. }
            | TradebotError::UnorderedSeries { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
