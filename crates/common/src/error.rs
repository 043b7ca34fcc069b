use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Indicator '{0}' has no alert support")]
    UnknownIndicator(String),

    #[error("Unknown condition '{condition}' for indicator '{indicator}'")]
    UnknownCondition { indicator: String, condition: String },

    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
