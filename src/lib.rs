pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod preparation;
#[cfg(feature = "server")]
pub mod server;
pub mod session;

pub use config::{Config, GeminiConfig, PreparationConfig, ServerConfig};
pub use error::{Result, TryOnError};
pub use gemini::{GeminiClient, TryOnBackend};
pub use models::{
    BookingAttachment, BookingDraft, EncodedImage, ErrorBody, GenerationRequest, PreparedImage,
    TryOnRequest, TryOnResponse, UploadedImage,
};
pub use preparation::ImagePreparer;
pub use session::{ProxyClient, SessionView, TryOnSession};
