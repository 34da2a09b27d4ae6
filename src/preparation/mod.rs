pub mod jpeg;
pub mod resize;

use std::io::Cursor;

use image::{
    imageops::FilterType, metadata::Orientation, DynamicImage, ImageDecoder, ImageReader,
};

use crate::{
    config::PreparationConfig,
    error::{Result, TryOnError},
    logger,
    models::{EncodedImage, PreparedImage, UploadedImage},
};

pub use jpeg::{encode_jpeg_base64, encode_within_ceiling, encoder_quality};
pub use resize::{downscale_factor, target_dimensions};

/// Turns an uploaded file into a JPEG payload that fits the transport ceiling.
#[derive(Debug, Clone, Default)]
pub struct ImagePreparer {
    config: PreparationConfig,
}

impl ImagePreparer {
    pub fn new(config: PreparationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreparationConfig {
        &self.config
    }

    pub fn prepare(&self, upload: &UploadedImage) -> Result<EncodedImage> {
        self.prepare_detailed(upload).map(|prepared| prepared.image)
    }

    pub fn prepare_detailed(&self, upload: &UploadedImage) -> Result<PreparedImage> {
        let _timer = logger::timer("prepare image");

        if upload.len() > self.config.max_upload_bytes {
            return Err(TryOnError::UploadTooLarge {
                size: upload.len(),
                limit: self.config.max_upload_bytes,
            });
        }

        let decoded = decode_upright(&upload.bytes)?;
        let (source_width, source_height) = (decoded.width(), decoded.height());
        let (width, height) =
            target_dimensions(source_width, source_height, self.config.max_dimension);

        let surface = if (width, height) == (source_width, source_height) {
            decoded.to_rgb8()
        } else {
            decoded
                .resize_exact(width, height, FilterType::Triangle)
                .to_rgb8()
        };

        let (image, quality) = encode_within_ceiling(
            &surface,
            &self.config.quality_ladder,
            self.config.max_encoded_bytes,
        )?;

        log::info!(
            "Prepared {}x{} upload as {}x{} JPEG (quality {:.2}, {} bytes)",
            source_width,
            source_height,
            width,
            height,
            quality,
            image.decoded_len()
        );

        Ok(PreparedImage {
            image,
            width,
            height,
            source_width,
            source_height,
            quality,
        })
    }

    /// Prepares the style reference and the selfie concurrently on blocking
    /// workers. Each slot keeps its own outcome so errors stay attributable.
    pub async fn prepare_pair(
        &self,
        style: UploadedImage,
        selfie: UploadedImage,
    ) -> (Result<PreparedImage>, Result<PreparedImage>) {
        let style_task = self.spawn_prepare(style);
        let selfie_task = self.spawn_prepare(selfie);
        futures::future::join(style_task, selfie_task).await
    }

    async fn spawn_prepare(&self, upload: UploadedImage) -> Result<PreparedImage> {
        let preparer = self.clone();
        tokio::task::spawn_blocking(move || preparer.prepare_detailed(&upload))
            .await
            .map_err(|e| TryOnError::InternalError(format!("preparation task failed: {}", e)))?
    }
}

/// Decodes an upload and applies its EXIF orientation, so camera photos come
/// out the way they are displayed.
fn decode_upright(bytes: &[u8]) -> Result<DynamicImage> {
    let unreadable = |e: image::ImageError| TryOnError::UnreadableFile(e.to_string());

    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| TryOnError::UnreadableFile(e.to_string()))?
        .into_decoder()
        .map_err(unreadable)?;
    let orientation = decoder.orientation().unwrap_or_else(|e| {
        log::debug!("Ignoring unreadable orientation metadata: {}", e);
        Orientation::NoTransforms
    });

    let mut decoded = DynamicImage::from_decoder(decoder).map_err(unreadable)?;
    decoded.apply_orientation(orientation);
    Ok(decoded)
}
