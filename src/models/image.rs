use super::request::{AspectRatio, SizeHint};
use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// One call to a remote image provider, already shaped for the chosen model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderRequest {
    pub prompt: String,
    pub model_id: String,
    pub aspect_ratio: AspectRatio,
    pub size_hint: Option<SizeHint>,
}

/// Base64 image data as returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub mime_type: Option<String>,
    pub data: String, // Base64 encoded
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: Some(mime_type.into()),
            data: data.into(),
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type.as_deref().unwrap_or(DEFAULT_IMAGE_MIME),
            self.data
        )
    }
}

/// Non-transport outcomes of a provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderResponse {
    Image(ImagePayload),
    /// The provider answered with text instead of an image (safety filter or similar).
    Declined(String),
    Empty,
}
