use crate::{
    config::GeminiConfig,
    error::ProviderError,
    generation::ImageProvider,
    models::{ImagePayload, ProviderRequest, ProviderResponse},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .ok_or_else(|| ProviderError::new("Gemini API key is not configured"))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model_id: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model_id)
    }

    pub(crate) fn build_request_payload(request: &ProviderRequest) -> Value {
        let mut image_config = json!({
            "aspectRatio": request.aspect_ratio.as_str(),
        });
        if let Some(hint) = request.size_hint {
            image_config["imageSize"] = json!(hint.as_str());
        }

        json!({
            "contents": [
                {
                    "parts": [{ "text": request.prompt }]
                }
            ],
            "generationConfig": {
                "imageConfig": image_config
            }
        })
    }

    /// Prefers the `error.message` of the API's error envelope; otherwise reports the raw body.
    pub(crate) fn error_from_status(status: StatusCode, body: &str) -> ProviderError {
        let message = serde_json::from_str::<ApiErrorEnvelope>(body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| format!("Gemini API returned {}: {}", status, body));
        ProviderError::new(message)
    }

    pub(crate) fn interpret(response: GenerateContentResponse) -> ProviderResponse {
        let parts = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .unwrap_or_default();

        if let Some(inline) = parts
            .iter()
            .filter_map(|part| part.inline_data.as_ref())
            .find(|inline| !inline.data.is_empty())
        {
            return ProviderResponse::Image(ImagePayload {
                mime_type: inline.mime_type.clone(),
                data: inline.data.clone(),
            });
        }

        match parts.into_iter().find_map(|part| part.text) {
            Some(text) => ProviderResponse::Declined(text),
            None => ProviderResponse::Empty,
        }
    }
}

#[async_trait]
impl ImageProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        let payload = Self::build_request_payload(request);

        log::info!("Generating image with model: {}", request.model_id);
        log::debug!("Image generation request payload: {}", payload);

        let response = self
            .client
            .post(self.endpoint(&request.model_id))
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;

        if !status.is_success() {
            let err = Self::error_from_status(status, &body);
            log::error!("Gemini API error ({}): {}", status, err);
            return Err(err);
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::new(e.to_string()))?;

        Ok(Self::interpret(parsed))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}
