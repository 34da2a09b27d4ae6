use crate::{
    error::{Result, TryOnError},
    models::{
        EncodedImage, GeminiContent, GeminiGenerationConfig, GeminiRequest, GeminiRequestPart,
        GeminiResponse, GenerationRequest, JPEG_MEDIA_TYPE,
    },
};

pub const DEFAULT_INSTRUCTION: &str = "Apply the hairstyle from the reference image to the person in the selfie. Keep the face and background natural.";

/// Removes a leading `data:image/<word>;base64,` marker; anything else is returned untouched.
pub fn strip_data_url_prefix(value: &str) -> &str {
    let Some(rest) = value.strip_prefix("data:image/") else {
        return value;
    };
    let kind_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    if kind_len == 0 {
        return value;
    }
    rest[kind_len..].strip_prefix(";base64,").unwrap_or(value)
}

pub fn build_request(request: &GenerationRequest) -> GeminiRequest {
    let instruction = request
        .instruction
        .clone()
        .unwrap_or_else(|| DEFAULT_INSTRUCTION.to_string());

    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user".to_string(),
            parts: vec![
                GeminiRequestPart::Text { text: instruction },
                GeminiRequestPart::jpeg(&request.style_image),
                GeminiRequestPart::jpeg(&request.selfie_image),
            ],
        }],
        generation_config: GeminiGenerationConfig {
            response_mime_type: JPEG_MEDIA_TYPE.to_string(),
        },
    }
}

pub fn extract_image(response: &GeminiResponse) -> Result<EncodedImage> {
    let inline = response
        .first_inline_image()
        .ok_or(TryOnError::EmptyResult)?;
    Ok(EncodedImage {
        data: inline.data.clone(),
        media_type: inline
            .mime_type
            .clone()
            .unwrap_or_else(|| JPEG_MEDIA_TYPE.to_string()),
    })
}
