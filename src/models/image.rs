use serde::{Deserialize, Serialize};

pub const JPEG_MEDIA_TYPE: &str = "image/jpeg";

/// Raw bytes of a user-supplied file, as received from the upload control.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub media_type: Option<String>,
}

impl UploadedImage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            media_type: None,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Base64 text of a compressed raster image. `data` never carries a data-URL prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub data: String,
    pub media_type: String,
}

impl EncodedImage {
    pub fn jpeg(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            media_type: JPEG_MEDIA_TYPE.to_string(),
        }
    }

    /// Accepts either a raw base64 payload or a `data:image/<kind>;base64,` URL.
    pub fn from_base64(value: &str) -> Self {
        Self::jpeg(crate::gemini::strip_data_url_prefix(value))
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    pub fn decoded_len(&self) -> usize {
        estimated_decoded_len(self.data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Byte length behind a base64 payload, rounded up so padding is counted.
pub fn estimated_decoded_len(base64_len: usize) -> usize {
    (base64_len * 3).div_ceil(4)
}

#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub image: EncodedImage,
    pub width: u32,
    pub height: u32,
    pub source_width: u32,
    pub source_height: u32,
    pub quality: f32,
}

impl PreparedImage {
    pub fn was_downscaled(&self) -> bool {
        self.width != self.source_width || self.height != self.source_height
    }
}
