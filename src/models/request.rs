use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier assigned to a request when it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Image models the pipeline can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageModel {
    #[serde(rename = "gemini-2.5-flash-image")]
    GeminiFlashImage,
    #[serde(rename = "gemini-3-pro-image-preview")]
    GeminiProImage,
}

impl ImageModel {
    pub const ALL: [ImageModel; 2] = [ImageModel::GeminiFlashImage, ImageModel::GeminiProImage];

    pub fn id(&self) -> &'static str {
        match self {
            ImageModel::GeminiFlashImage => "gemini-2.5-flash-image",
            ImageModel::GeminiProImage => "gemini-3-pro-image-preview",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ImageModel::GeminiFlashImage => "Gemini Flash",
            ImageModel::GeminiProImage => "Gemini Pro",
        }
    }

    /// Whether the provider accepts an explicit output-size hint for this model.
    pub fn supports_size_hint(&self) -> bool {
        matches!(self, ImageModel::GeminiProImage)
    }

    /// The size hint attached to requests for this model, if any.
    pub fn size_hint(&self) -> Option<SizeHint> {
        self.supports_size_hint().then_some(SizeHint::OneK)
    }

    /// (id, name, provider) triples, in the same shape the other clients list their models.
    pub fn supported_models() -> Vec<(&'static str, &'static str, &'static str)> {
        Self::ALL
            .iter()
            .map(|model| (model.id(), model.display_name(), "Google"))
            .collect()
    }
}

impl Default for ImageModel {
    fn default() -> Self {
        ImageModel::GeminiFlashImage
    }
}

impl fmt::Display for ImageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ImageModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini-2.5-flash-image" | "flash" => Ok(ImageModel::GeminiFlashImage),
            "gemini-3-pro-image-preview" | "pro" => Ok(ImageModel::GeminiProImage),
            _ => Err(s.to_string()),
        }
    }
}

/// Explicit output-resolution hint for models that accept one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeHint {
    #[serde(rename = "1K")]
    OneK,
}

impl SizeHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeHint::OneK => "1K",
        }
    }
}

/// Supported width:height ratios. "wide" is accepted as another spelling of landscape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "16:9", alias = "wide")]
    Landscape,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 3] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Landscape,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Landscape => "16:9",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Square => "Square (1:1)",
            AspectRatio::Portrait => "Portrait (3:4)",
            AspectRatio::Landscape => "Landscape (16:9)",
        }
    }

    /// Nominal output size in pixels (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1024, 1024),
            AspectRatio::Portrait => (768, 1024),
            AspectRatio::Landscape => (1024, 576),
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Square
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1:1" | "square" => Ok(AspectRatio::Square),
            "3:4" | "portrait" => Ok(AspectRatio::Portrait),
            "16:9" | "landscape" | "wide" => Ok(AspectRatio::Landscape),
            _ => Err(s.to_string()),
        }
    }
}

/// Raw submission as it arrives from the presentation layer.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptInput {
    pub prompt: String,
    pub aspect_ratio: String,
    pub model: Option<String>,
}

impl PromptInput {
    pub fn new(prompt: impl Into<String>, aspect_ratio: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: aspect_ratio.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Submission that passed validation but has not been admitted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPrompt {
    pub prompt: String,
    pub model: ImageModel,
    pub aspect_ratio: AspectRatio,
}

/// An accepted request. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub id: RequestId,
    pub prompt: String,
    pub model: ImageModel,
    pub aspect_ratio: AspectRatio,
    pub submitted_at: DateTime<Utc>,
}

impl GenerationRequest {
    pub fn from_validated(validated: ValidatedPrompt, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id: RequestId::new(),
            prompt: validated.prompt,
            model: validated.model,
            aspect_ratio: validated.aspect_ratio,
            submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_is_landscape() {
        assert_eq!("wide".parse::<AspectRatio>(), Ok(AspectRatio::Landscape));
        assert_eq!("16:9".parse::<AspectRatio>(), Ok(AspectRatio::Landscape));
        assert_eq!(AspectRatio::Landscape.as_str(), "16:9");
        assert!("4:3".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_ratio_dimensions_match_shape() {
        for ratio in AspectRatio::ALL {
            let (width, height) = ratio.dimensions();
            assert!(ratio.label().contains(ratio.as_str()));
            match ratio {
                AspectRatio::Square => assert_eq!(width, height),
                AspectRatio::Portrait => assert_eq!(width * 4, height * 3),
                AspectRatio::Landscape => assert_eq!(width * 9, height * 16),
            }
        }
    }

    #[test]
    fn test_model_capabilities() {
        assert!(!ImageModel::GeminiFlashImage.supports_size_hint());
        assert_eq!(ImageModel::GeminiProImage.size_hint(), Some(SizeHint::OneK));
        assert_eq!(ImageModel::default(), ImageModel::GeminiFlashImage);
        assert_eq!("pro".parse::<ImageModel>(), Ok(ImageModel::GeminiProImage));
    }

    #[test]
    fn test_serde_uses_provider_ids() {
        let json = serde_json::to_string(&ImageModel::GeminiProImage).unwrap();
        assert_eq!(json, "\"gemini-3-pro-image-preview\"");
        let ratio: AspectRatio = serde_json::from_str("\"3:4\"").unwrap();
        assert_eq!(ratio, AspectRatio::Portrait);
    }
}
