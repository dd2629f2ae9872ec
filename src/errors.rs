pub type AdapterResult<T> = Result<T, AdapterError>;

#[derive(thiserror::Error, Debug)]
pub enum AdapterError {
    #[error("OAuth failed: {0}")]
    OAuth2Error(String),
    #[error("Failed to access the adapter config store: {0}")]
    ConfigError(String),
    #[error("Malformed cached entry: {0}")]
    MalformedEntry(String),
    #[error("Get invalid argument error: {0}")]
    InvalidArgumentError(String),
    #[error("Failed to build HTTP client: {0}")]
    BuilderError(String),
}
