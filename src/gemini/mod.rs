pub mod image_client;
pub mod payload;

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{EncodedImage, TryOnRequest},
};

pub use image_client::GeminiClient;
pub use payload::{build_request, extract_image, strip_data_url_prefix, DEFAULT_INSTRUCTION};

/// Anything that can turn a try-on body into one generated image: the
/// in-process upstream client or the HTTP proxy client.
#[async_trait]
pub trait TryOnBackend: Send + Sync {
    async fn try_on(&self, request: TryOnRequest) -> Result<EncodedImage>;
}
