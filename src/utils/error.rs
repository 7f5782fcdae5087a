use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Fetch failed for {url}: HTTP {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("Reporter error: {reporter}: {message}")]
    Reporter { reporter: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn reporter(reporter: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Reporter {
            reporter: reporter.into(),
            message: message.into(),
        }
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
