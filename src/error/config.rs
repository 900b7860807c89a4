use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to open config file: {0}")]
    OpenFileError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Missing required configuration value: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {0}: {1}")]
    InvalidValue(String, String),
}
