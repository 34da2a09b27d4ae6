use serde::{Deserialize, Serialize};

use crate::error::{Result, TryOnError};

use super::image::{EncodedImage, JPEG_MEDIA_TYPE};

/// Body posted by the client to the proxy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TryOnRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selfie_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl TryOnRequest {
    pub fn new(style_image: &EncodedImage, selfie_image: &EncodedImage) -> Self {
        Self {
            model_image: Some(style_image.to_data_url()),
            selfie_image: Some(selfie_image.to_data_url()),
            prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TryOnResponse {
    pub output_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A validated pair of images plus the optional instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub style_image: EncodedImage,
    pub selfie_image: EncodedImage,
    pub instruction: Option<String>,
}

impl GenerationRequest {
    pub fn new(style_image: EncodedImage, selfie_image: EncodedImage) -> Self {
        Self {
            style_image,
            selfie_image,
            instruction: None,
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn from_wire(body: TryOnRequest) -> Result<Self> {
        let style_image = body.model_image.as_deref().map(EncodedImage::from_base64);
        let selfie_image = body.selfie_image.as_deref().map(EncodedImage::from_base64);

        match (style_image, selfie_image) {
            (Some(style), Some(selfie)) if !style.is_empty() && !selfie.is_empty() => Ok(Self {
                style_image: style,
                selfie_image: selfie,
                instruction: body.prompt.filter(|p| !p.trim().is_empty()),
            }),
            _ => Err(TryOnError::ValidationError(
                "modelImage and selfieImage are required.".into(),
            )),
        }
    }
}

// Upstream `generateContent` schema.

#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct GeminiContent {
    pub role: String,
    pub parts: Vec<GeminiRequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GeminiRequestPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

impl GeminiRequestPart {
    pub fn jpeg(image: &EncodedImage) -> Self {
        GeminiRequestPart::InlineData {
            inline_data: InlineData {
                mime_type: Some(JPEG_MEDIA_TYPE.to_string()),
                data: image.data.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GeminiGenerationConfig {
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineData {
    #[serde(default, alias = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiResponseContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeminiResponseContent {
    #[serde(default)]
    pub parts: Vec<GeminiResponsePart>,
}

/// The provider spells the inline payload field two ways; both are kept and
/// reconciled by [`GeminiResponsePart::inline_data`].
#[derive(Debug, Default, Deserialize)]
pub struct GeminiResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "inlineData")]
    pub inline_data_camel: Option<InlineData>,
    #[serde(default, rename = "inline_data")]
    pub inline_data_snake: Option<InlineData>,
}

impl GeminiResponsePart {
    pub fn inline_data(&self) -> Option<&InlineData> {
        [&self.inline_data_camel, &self.inline_data_snake]
            .into_iter()
            .flatten()
            .find(|inline| !inline.data.is_empty())
    }
}

impl GeminiResponse {
    /// First non-empty inline payload of the first candidate.
    pub fn first_inline_image(&self) -> Option<&InlineData> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.iter().find_map(|part| part.inline_data()))
    }
}
