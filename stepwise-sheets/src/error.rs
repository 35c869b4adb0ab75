/// Missing or unusable sheet credentials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Private key is not a valid RSA PEM: {0}")]
    InvalidKey(String),
}

/// A sheet operation that did not complete.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("Token exchange failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Sheet is unavailable: {0}")]
    Unavailable(String),

    #[error("Cannot address sheet range: {0}")]
    InvalidUrl(String),
}
