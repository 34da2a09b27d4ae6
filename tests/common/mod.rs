#![allow(dead_code)]

use hairtry::{GeminiClient, GeminiConfig, UploadedImage};
use image::{codecs::jpeg::JpegEncoder, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use std::io::Cursor;
use std::time::Duration;
use wiremock::MockServer;

pub const TEST_KEY: &str = "test-key";
pub const TEST_MODEL: &str = "gemini-test";
pub const GENERATE_PATH: &str = "/v1beta/models/gemini-test:generateContent";

pub fn gemini_config(server: &MockServer) -> GeminiConfig {
    GeminiConfig::new()
        .with_api_key(TEST_KEY)
        .with_base_url(server.uri())
        .with_model(TEST_MODEL)
        .with_timeout(Duration::from_secs(5))
}

pub fn gemini_client(server: &MockServer) -> GeminiClient {
    GeminiClient::new(gemini_config(server)).expect("client builds with a key")
}

pub fn image_response(part: Value) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [ { "text": "Here is the look." }, part ] }
        }]
    })
}

pub fn text_only_response() -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [ { "text": "I can't edit this photo." } ] }
        }]
    })
}

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x ^ y) & 0xff) as u8,
        ])
    })
}

pub fn jpeg_upload(width: u32, height: u32) -> UploadedImage {
    let mut bytes = Vec::new();
    gradient(width, height)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, 90))
        .unwrap();
    UploadedImage::new(bytes).with_media_type("image/jpeg")
}

pub fn png_upload(width: u32, height: u32) -> UploadedImage {
    let mut bytes = Vec::new();
    gradient(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    UploadedImage::new(bytes).with_media_type("image/png")
}
