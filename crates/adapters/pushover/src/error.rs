//! Pushover adapter error types.

use venthub_domain::error::VentHubError;

/// Errors from talking to the Pushover API.
#[derive(Debug, thiserror::Error)]
pub enum PushoverError {
    /// The request could not be sent or the response not read.
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// The API answered but refused the message.
    #[error("Pushover rejected the message ({status}): {errors:?}")]
    Rejected { status: u16, errors: Vec<String> },
}

impl From<PushoverError> for VentHubError {
    fn from(err: PushoverError) -> Self {
        Self::Unreachable(Box::new(err))
    }
}
