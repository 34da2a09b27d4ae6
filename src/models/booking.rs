use serde::{Deserialize, Serialize};

use crate::error::{Result, TryOnError};

use super::image::EncodedImage;

/// Selfie and generated look handed from the try-on flow to the booking form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingAttachment {
    pub selfie_image: EncodedImage,
    pub output_image: EncodedImage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub name: String,
    pub phone: String,
    pub time_window: String,
    pub notes: String,
    pub attachment: Option<BookingAttachment>,
}

impl BookingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contact(mut self, name: impl Into<String>, phone: impl Into<String>) -> Self {
        self.name = name.into();
        self.phone = phone.into();
        self
    }

    pub fn with_time_window(mut self, window: impl Into<String>) -> Self {
        self.time_window = window.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn attach(&mut self, attachment: BookingAttachment) {
        self.attachment = Some(attachment);
    }

    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("time window", &self.time_window),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(TryOnError::ValidationError(format!(
                "Missing booking fields: {}",
                missing.join(", ")
            )))
        }
    }
}
