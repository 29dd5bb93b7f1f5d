//! Scene description, provider call and storage for content images.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::errors::{CoreError, CoreResult};
use crate::integrations::{AspectRatio, ChatCompletion, ChatMessage, ChatRequest, ImagePrompt, ImageProvider};
use crate::storage::{draft_image_key, draft_image_prefix, MediaStorage};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "graphql", derive(async_graphql::Enum))]
pub enum ImageVariant {
    Hero,
    Inline,
}

impl ImageVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageVariant::Hero => "hero",
            ImageVariant::Inline => "inline",
        }
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        match self {
            ImageVariant::Hero => AspectRatio::Wide,
            ImageVariant::Inline => AspectRatio::Standard,
        }
    }
}

impl std::str::FromStr for ImageVariant {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hero" => Ok(ImageVariant::Hero),
            "inline" => Ok(ImageVariant::Inline),
            other => Err(CoreError::validation(format!("Invalid image variant: '{}'", other))),
        }
    }
}

const SCENE_INSTRUCTIONS: &str = "You design editorial illustrations. Work in two steps. \
First, identify the single most literal or clichéd visual for the topic (for example a handshake for partnerships, \
a lightbulb for ideas) and do not use it. Second, design an alternative scene that still clearly connects to the subject \
through a concrete situation, object or metaphor. Reply with the final scene only: one paragraph, at most 80 words, \
no text or lettering in the image, no brand logos.";

fn fallback_scene(title: &str, description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(description) => format!("{}. {}", title.trim(), description),
        None => title.trim().to_string(),
    }
}

pub fn build_image_prompt(scene: &str, variant: ImageVariant) -> ImagePrompt {
    ImagePrompt {
        text: format!(
            "Editorial illustration for a blog {}. Scene: {} Style: clean modern digital illustration, soft natural light, \
balanced composition, no text, no watermarks.",
            match variant {
                ImageVariant::Hero => "header",
                ImageVariant::Inline => "section",
            },
            scene.trim()
        ),
        aspect_ratio: variant.aspect_ratio(),
    }
}

#[derive(Clone)]
pub struct ImageGenerator {
    chat: Arc<dyn ChatCompletion>,
    chat_model: String,
    provider: Arc<dyn ImageProvider>,
    storage: Arc<dyn MediaStorage>,
}

impl ImageGenerator {
    pub fn new(
        chat: Arc<dyn ChatCompletion>,
        chat_model: impl Into<String>,
        provider: Arc<dyn ImageProvider>,
        storage: Arc<dyn MediaStorage>,
    ) -> Self {
        Self {
            chat,
            chat_model: chat_model.into(),
            provider,
            storage,
        }
    }

    /// Falls back to the raw title and description when the chat call fails
    /// or returns a blank scene.
    pub async fn describe_scene(&self, title: &str, description: Option<&str>) -> String {
        let mut topic = format!("Topic: {}", title.trim());
        if let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) {
            topic.push_str(&format!("\nContext: {}", description));
        }
        let request = ChatRequest::new(
            self.chat_model.clone(),
            vec![ChatMessage::system(SCENE_INSTRUCTIONS), ChatMessage::user(topic)],
        )
        .with_temperature(0.9);

        match self.chat.complete(request).await {
            Ok(scene) if !scene.trim().is_empty() => scene.trim().to_string(),
            Ok(_) => {
                warn!("Scene description was blank, using title");
                fallback_scene(title, description)
            }
            Err(e) => {
                warn!("Scene description failed, using title: {}", e);
                fallback_scene(title, description)
            }
        }
    }

    /// Returns the public URL of the stored image. Provider failures propagate.
    pub async fn generate(
        &self,
        content_item_id: i32,
        title: &str,
        description: Option<&str>,
        variant: ImageVariant,
    ) -> CoreResult<String> {
        let scene = self.describe_scene(title, description).await;
        debug!("Scene for content item {}: {}", content_item_id, scene);

        let prompt = build_image_prompt(&scene, variant);
        let image = self.provider.generate(&prompt).await?;

        let key = draft_image_key(
            content_item_id,
            variant.as_str(),
            Utc::now().timestamp_millis(),
            &image.format,
        );
        self.storage.put(&key, &image.bytes).await?;
        let url = self.storage.public_url(&key);
        info!(
            "Stored {} image for content item {} via {}: {}",
            variant.as_str(),
            content_item_id,
            self.provider.name(),
            url
        );
        Ok(url)
    }

    pub async fn delete_images(&self, content_item_id: i32) -> CoreResult<usize> {
        Ok(self
            .storage
            .delete_prefix(&draft_image_prefix(content_item_id))
            .await?)
    }
}
