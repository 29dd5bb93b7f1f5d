//! Image-generation providers.
//!
//! Both backends return raw bytes plus a file format; persisting the bytes is
//! left to [`crate::storage::MediaStorage`].

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ChatSettings, ImageProviderKind, ImageSettings};
use crate::errors::{CoreError, CoreResult};

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Provider returned no image")]
    NoImage,

    #[error("Invalid image payload: {0}")]
    InvalidPayload(String),

    #[error("No API key configured for {0}")]
    NoApiKey(&'static str),
}

impl From<ImageError> for CoreError {
    fn from(err: ImageError) -> Self {
        CoreError::external(format!("Image provider error: {}", err))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AspectRatio {
    Wide,
    Standard,
    Square,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Wide => "16:9",
            AspectRatio::Standard => "4:3",
            AspectRatio::Square => "1:1",
        }
    }

    /// Closest size the OpenAI images endpoint accepts.
    fn openai_size(&self) -> &'static str {
        match self {
            AspectRatio::Wide | AspectRatio::Standard => "1536x1024",
            AspectRatio::Square => "1024x1024",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImagePrompt {
    pub text: String,
    pub aspect_ratio: AspectRatio,
}

#[derive(Clone, Debug)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    /// File extension, e.g. `png`.
    pub format: String,
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &ImagePrompt) -> Result<GeneratedImage, ImageError>;
}

pub fn format_from_mime(mime: &str) -> String {
    match mime.trim().to_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpeg".to_string(),
        "image/webp" => "webp".to_string(),
        "image/gif" => "gif".to_string(),
        _ => "png".to_string(),
    }
}

fn decode(data: &str) -> Result<Vec<u8>, ImageError> {
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| ImageError::InvalidPayload(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ImageError::NoImage);
    }
    Ok(bytes)
}

async fn api_error(response: reqwest::Response) -> ImageError {
    let status = response.status().as_u16();
    let raw = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&raw)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or(raw);
    ImageError::ApiError { status, message }
}

pub struct GeminiImageProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiImageProvider {
    pub fn new(settings: &ImageSettings) -> Result<Self, ImageError> {
        Ok(Self {
            client: Client::builder().timeout(settings.timeout).build()?,
            api_key: settings.gemini_api_key.clone(),
            base_url: settings.gemini_base_url.trim_end_matches('/').to_string(),
            model: settings.gemini_model.clone(),
        })
    }
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    inline_data: Option<GeminiInlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[async_trait]
impl ImageProvider for GeminiImageProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &ImagePrompt) -> Result<GeneratedImage, ImageError> {
        let api_key = self.api_key.as_ref().ok_or(ImageError::NoApiKey("gemini"))?;
        let body = serde_json::json!({
            "contents": [{
                "parts": [{
                    "text": format!("{}\nAspect ratio: {}", prompt.text, prompt.aspect_ratio.as_str())
                }]
            }],
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"]
            }
        });

        debug!("Gemini image request: model={}", self.model);
        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let parsed: GeminiResponse = response.json().await?;
        let inline = parsed
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .find_map(|part| part.inline_data)
            .ok_or(ImageError::NoImage)?;

        Ok(GeneratedImage {
            bytes: decode(&inline.data)?,
            format: format_from_mime(&inline.mime_type),
        })
    }
}

pub struct OpenAiImageProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiImageProvider {
    pub fn new(settings: &ImageSettings, chat: &ChatSettings) -> Result<Self, ImageError> {
        Ok(Self {
            client: Client::builder().timeout(settings.timeout).build()?,
            api_key: chat.api_key.clone(),
            base_url: chat.base_url.trim_end_matches('/').to_string(),
            model: settings.openai_model.clone(),
        })
    }
}

#[derive(Deserialize)]
struct OpenAiImagesResponse {
    #[serde(default)]
    data: Vec<OpenAiImageData>,
}

#[derive(Deserialize)]
struct OpenAiImageData {
    b64_json: Option<String>,
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, prompt: &ImagePrompt) -> Result<GeneratedImage, ImageError> {
        let api_key = self.api_key.as_ref().ok_or(ImageError::NoApiKey("openai"))?;
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt.text,
            "size": prompt.aspect_ratio.openai_size(),
            "n": 1
        });

        debug!("OpenAI image request: model={}", self.model);
        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let parsed: OpenAiImagesResponse = response.json().await?;
        let data = parsed
            .data
            .into_iter()
            .find_map(|item| item.b64_json)
            .ok_or(ImageError::NoImage)?;

        Ok(GeneratedImage {
            bytes: decode(&data)?,
            format: "png".to_string(),
        })
    }
}

/// Build the provider named in configuration.
pub fn select_image_provider(
    settings: &ImageSettings,
    chat: &ChatSettings,
) -> CoreResult<Arc<dyn ImageProvider>> {
    let provider: Arc<dyn ImageProvider> = match settings.provider {
        ImageProviderKind::Gemini => {
            if settings.gemini_api_key.is_none() {
                warn!("GEMINI_API_KEY is not set; image generation will fail");
            }
            Arc::new(GeminiImageProvider::new(settings)?)
        }
        ImageProviderKind::OpenAi => {
            if chat.api_key.is_none() {
                warn!("OPENAI_API_KEY is not set; image generation will fail");
            }
            Arc::new(OpenAiImageProvider::new(settings, chat)?)
        }
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn image_settings(base_url: String, provider: ImageProviderKind) -> ImageSettings {
        ImageSettings {
            provider,
            gemini_api_key: Some("g-key".to_string()),
            gemini_base_url: base_url,
            gemini_model: "gemini-test".to_string(),
            openai_model: "gpt-image-1".to_string(),
            timeout: Duration::from_secs(5),
            max_attempts: 1,
            retry_delay: Duration::from_millis(1),
        }
    }

    fn chat_settings(base_url: String) -> ChatSettings {
        ChatSettings {
            api_key: Some("sk-test".to_string()),
            base_url,
            model: "gpt-4o".to_string(),
            fallback_model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    fn prompt() -> ImagePrompt {
        ImagePrompt {
            text: "A calm desk".to_string(),
            aspect_ratio: AspectRatio::Wide,
        }
    }

    #[tokio::test]
    async fn test_gemini_decodes_inline_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(query_param("key", "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [
                    {"text": "here you go"},
                    {"inlineData": {"mimeType": "image/jpeg", "data": STANDARD.encode(b"jpegbytes")}}
                ]}}]
            })))
            .mount(&server)
            .await;

        let provider =
            GeminiImageProvider::new(&image_settings(server.uri(), ImageProviderKind::Gemini))
                .unwrap();
        let image = provider.generate(&prompt()).await.unwrap();
        assert_eq!(image.bytes, b"jpegbytes");
        assert_eq!(image.format, "jpeg");
    }

    #[tokio::test]
    async fn test_gemini_without_image_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "refused"}]}}]
            })))
            .mount(&server)
            .await;

        let provider =
            GeminiImageProvider::new(&image_settings(server.uri(), ImageProviderKind::Gemini))
                .unwrap();
        assert!(matches!(
            provider.generate(&prompt()).await,
            Err(ImageError::NoImage)
        ));
    }

    #[tokio::test]
    async fn test_openai_b64_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"b64_json": STANDARD.encode(b"pngbytes")}]
            })))
            .mount(&server)
            .await;

        let settings = image_settings(server.uri(), ImageProviderKind::OpenAi);
        let provider = OpenAiImageProvider::new(&settings, &chat_settings(server.uri())).unwrap();
        let image = provider.generate(&prompt()).await.unwrap();
        assert_eq!(image.bytes, b"pngbytes");
        assert_eq!(image.format, "png");
    }

    #[test]
    fn test_selection_follows_configuration() {
        let chat = chat_settings("http://localhost".to_string());
        let gemini = select_image_provider(
            &image_settings("http://localhost".to_string(), ImageProviderKind::Gemini),
            &chat,
        )
        .unwrap();
        assert_eq!(gemini.name(), "gemini");
        let openai = select_image_provider(
            &image_settings("http://localhost".to_string(), ImageProviderKind::OpenAi),
            &chat,
        )
        .unwrap();
        assert_eq!(openai.name(), "openai");
    }
}
