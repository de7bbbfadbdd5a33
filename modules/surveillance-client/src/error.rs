use thiserror::Error;

pub type Result<T> = std::result::Result<T, SurveillanceApiError>;

#[derive(Debug, Error)]
pub enum SurveillanceApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SurveillanceApiError {
    fn from(err: reqwest::Error) -> Self {
        SurveillanceApiError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SurveillanceApiError {
    fn from(err: serde_json::Error) -> Self {
        SurveillanceApiError::Parse(err.to_string())
    }
}
