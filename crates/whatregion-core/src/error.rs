use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Rejection reasons for input that cannot be turned into a numeric app ID.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppIdError {
    #[error("app id is empty")]
    Empty,

    #[error("\"{0}\" is not a numeric app id or App Store URL")]
    NotNumeric(String),
}
