use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed signal message: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("invalid peer id: {0}")]
    InvalidPeerId(String),

    #[error("inline image is not valid base64: {0}")]
    InvalidImage(#[source] base64::DecodeError),
}
