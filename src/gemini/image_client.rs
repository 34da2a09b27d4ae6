use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::GeminiConfig,
    error::{Result, TryOnError},
    logger,
    models::{EncodedImage, GeminiResponse, GenerationRequest, TryOnRequest},
};

use super::{payload, TryOnBackend};

/// Stateless proxy to the provider's `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    endpoint: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| TryOnError::ConfigError("Missing Google API key".into()))?
            .to_string();

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TryOnError::ConfigError(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            endpoint: config.endpoint(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Validates the wire body, then runs one generation.
    pub async fn try_on(&self, body: TryOnRequest) -> Result<EncodedImage> {
        let request = GenerationRequest::from_wire(body)?;
        self.generate(request).await
    }

    pub async fn generate(&self, request: GenerationRequest) -> Result<EncodedImage> {
        let _timer = logger::timer("upstream generation");
        let payload = payload::build_request(&request);

        log::info!(
            "Submitting try-on to {} (style {} bytes, selfie {} bytes, custom instruction: {})",
            self.endpoint,
            request.style_image.decoded_len(),
            request.selfie_image.decoded_len(),
            request.instruction.is_some()
        );

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            log::warn!("Upstream rejected generation with status {}", status);
            return Err(TryOnError::UpstreamError {
                status: status.as_u16(),
                details,
            });
        }

        let body = response.text().await.map_err(map_transport_error)?;
        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| TryOnError::ResponseError(e.to_string()))?;

        let image = payload::extract_image(&parsed)?;
        log::info!("Upstream returned image ({} bytes)", image.decoded_len());
        Ok(image)
    }
}

// The request URL carries the key as a query parameter, so it is stripped
// before the error is formatted.
fn map_transport_error(e: reqwest::Error) -> TryOnError {
    let e = e.without_url();
    if e.is_timeout() {
        TryOnError::Timeout(e.to_string())
    } else {
        TryOnError::RequestError(format!("Upstream request failed: {}", e))
    }
}

#[async_trait]
impl TryOnBackend for GeminiClient {
    async fn try_on(&self, request: TryOnRequest) -> Result<EncodedImage> {
        GeminiClient::try_on(self, request).await
    }
}
