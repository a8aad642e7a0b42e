use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong between building a Redash client and
/// decoding its response.
#[derive(Debug, Error)]
pub enum RedashError {
    #[error("REDASH_BASE_URL or REDASH_API_KEY is not set")]
    MissingCredentials,

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Redash API request failed: {}", status_line(.status))]
    Remote { status: StatusCode },

    #[error("{0}")]
    Decode(String),
}

impl From<serde_json::Error> for RedashError {
    fn from(err: serde_json::Error) -> Self {
        RedashError::Decode(err.to_string())
    }
}

fn status_line(status: &StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
