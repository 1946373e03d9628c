//! Application-level errors raised while bootstrapping.

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration error: {msg}")]
    ConfigurationError { msg: String },

    #[error("Invalid value `{value}` for config key \"{key}\"")]
    InvalidConfig { key: String, value: String },
}
