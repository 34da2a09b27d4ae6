use thiserror::Error;

#[derive(Error, Debug)]
pub enum TryOnError {
    /// Raw upload exceeds the accepted size before any decode attempt.
    #[error("Upload too large: {size} bytes (limit {limit} bytes)")]
    UploadTooLarge { size: usize, limit: usize },

    #[error("Unreadable file: {0}")]
    UnreadableFile(String),

    /// No rung of the quality ladder fit under the encoded size ceiling.
    #[error("Image is too large after compression: smallest candidate {smallest} bytes (limit {limit} bytes)")]
    ImageTooLarge { smallest: usize, limit: usize },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Upstream error ({status}): {details}")]
    UpstreamError { status: u16, details: String },

    #[error("No image returned from upstream response")]
    EmptyResult,

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("Response error: {0}")]
    ResponseError(String),

    /// Non-success answer from the try-on proxy, already reduced to one message.
    #[error("{0}")]
    ProxyError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl TryOnError {
    /// Preparation errors stay on the client and are shown next to the upload slot.
    pub fn is_preparation_error(&self) -> bool {
        matches!(
            self,
            TryOnError::UploadTooLarge { .. }
                | TryOnError::UnreadableFile(_)
                | TryOnError::ImageTooLarge { .. }
        )
    }

    /// Message suitable for showing to the person using the client.
    pub fn user_message(&self) -> String {
        match self {
            TryOnError::UploadTooLarge { .. } => "Please upload images under 12MB.".to_string(),
            TryOnError::UnreadableFile(_) => "Unable to process image.".to_string(),
            TryOnError::ImageTooLarge { .. } => "Image is too large after compression.".to_string(),
            TryOnError::ValidationError(msg) | TryOnError::ProxyError(msg) => msg.clone(),
            _ => "Something went wrong.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TryOnError>;
