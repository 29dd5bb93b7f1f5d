use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::auth::{StaticTokenVerifier, TokenVerifier};
use crate::config::AppConfig;
use crate::errors::{CoreError, CoreResult};
use crate::integrations::{
    select_image_provider, ChatCompletion, ErrorNotifier, ImageProvider, LogNotifier,
    OpenAiChatClient, TelegramNotifier,
};
use crate::services::content_generator::{ChatPageGenerator, ContentGenerator, PageGenerator};
use crate::services::idea_generator::IdeaGenerator;
use crate::services::image_generator::ImageGenerator;
use crate::services::image_jobs::{ImageJobQueue, ImageJobWorker};
use crate::services::prompt_builder::PromptBuilder;
use crate::services::{
    BacklogService, ClusterService, ContentService, ProjectService, PublishService,
    SprintSettingsService,
};
use crate::storage::{LocalMediaStorage, MediaStorage};

/// External collaborators, injected so tests can substitute fakes.
#[derive(Clone)]
pub struct Collaborators {
    pub chat: Arc<dyn ChatCompletion>,
    /// Defaults to a chat-backed page generator.
    pub pages: Option<Arc<dyn PageGenerator>>,
    pub image_provider: Arc<dyn ImageProvider>,
    pub storage: Arc<dyn MediaStorage>,
    pub notifier: Arc<dyn ErrorNotifier>,
    pub token_verifier: Arc<dyn TokenVerifier>,
}

#[derive(Clone, Copy, Debug)]
pub enum ImageJobMode {
    Background { max_attempts: u32, retry_delay: Duration },
    Immediate { max_attempts: u32, retry_delay: Duration },
    Disabled,
}

#[derive(Clone, Debug)]
pub struct ContextOptions {
    pub chat_model: String,
    pub fallback_model: String,
    pub image_jobs: ImageJobMode,
}

/// Shared application context exposing the services to the GraphQL and REST layers.
#[derive(Clone)]
pub struct AppContext {
    db: DatabaseConnection,
    notifier: Arc<dyn ErrorNotifier>,
    token_verifier: Arc<dyn TokenVerifier>,
    project_service: Arc<ProjectService>,
    backlog_service: Arc<BacklogService>,
    cluster_service: Arc<ClusterService>,
    sprint_settings_service: Arc<SprintSettingsService>,
    content_service: Arc<ContentService>,
    idea_generator: Arc<IdeaGenerator>,
    publish_service: Arc<PublishService>,
}

impl AppContext {
    /// Build the production clients from configuration and start the image worker.
    pub fn from_config(db: DatabaseConnection, config: &AppConfig) -> CoreResult<Self> {
        let chat: Arc<dyn ChatCompletion> = Arc::new(
            OpenAiChatClient::new(&config.chat)
                .map_err(|e| CoreError::internal(format!("Failed to build chat client: {}", e)))?,
        );
        let image_provider = select_image_provider(&config.image, &config.chat)?;
        let storage: Arc<dyn MediaStorage> = Arc::new(LocalMediaStorage::new(
            &config.storage_root,
            &config.public_url,
        ));
        let notifier: Arc<dyn ErrorNotifier> = match &config.telegram {
            Some(settings) => Arc::new(TelegramNotifier::new(settings.clone()).map_err(|e| {
                CoreError::internal(format!("Failed to build Telegram client: {}", e))
            })?),
            None => Arc::new(LogNotifier),
        };
        let token_verifier = StaticTokenVerifier::parse(&config.api_tokens)?;
        info!(
            "Configured {} API tokens, image provider {}",
            token_verifier.len(),
            image_provider.name()
        );

        Self::new(
            db,
            Collaborators {
                chat,
                pages: None,
                image_provider,
                storage,
                notifier,
                token_verifier: Arc::new(token_verifier),
            },
            ContextOptions {
                chat_model: config.chat.model.clone(),
                fallback_model: config.chat.fallback_model.clone(),
                image_jobs: ImageJobMode::Background {
                    max_attempts: config.image.max_attempts,
                    retry_delay: config.image.retry_delay,
                },
            },
        )
    }

    /// `ImageJobMode::Background` spawns a task and needs a tokio runtime.
    pub fn new(
        db: DatabaseConnection,
        collaborators: Collaborators,
        options: ContextOptions,
    ) -> CoreResult<Self> {
        let pages = collaborators.pages.clone().unwrap_or_else(|| {
            Arc::new(ChatPageGenerator::new(
                collaborators.chat.clone(),
                options.chat_model.clone(),
            ))
        });
        let generator = ContentGenerator::new(
            collaborators.chat.clone(),
            pages,
            options.chat_model.clone(),
            options.fallback_model.clone(),
        );
        let images = ImageGenerator::new(
            collaborators.chat.clone(),
            options.chat_model.clone(),
            collaborators.image_provider.clone(),
            collaborators.storage.clone(),
        );
        let image_jobs = match options.image_jobs {
            ImageJobMode::Background {
                max_attempts,
                retry_delay,
            } => ImageJobQueue::start(ImageJobWorker::new(
                db.clone(),
                images.clone(),
                max_attempts,
                retry_delay,
            )),
            ImageJobMode::Immediate {
                max_attempts,
                retry_delay,
            } => ImageJobQueue::immediate(ImageJobWorker::new(
                db.clone(),
                images.clone(),
                max_attempts,
                retry_delay,
            )),
            ImageJobMode::Disabled => ImageJobQueue::disabled(db.clone()),
        };

        let prompt_builder = Arc::new(PromptBuilder::new()?);
        let content_service = Arc::new(ContentService::new(
            db.clone(),
            prompt_builder.clone(),
            generator.clone(),
            images,
            image_jobs,
        ));

        Ok(Self {
            notifier: collaborators.notifier,
            token_verifier: collaborators.token_verifier,
            project_service: Arc::new(ProjectService::new(db.clone())),
            backlog_service: Arc::new(BacklogService::new(db.clone())),
            cluster_service: Arc::new(ClusterService::new(db.clone())),
            sprint_settings_service: Arc::new(SprintSettingsService::new(db.clone())),
            content_service,
            idea_generator: Arc::new(IdeaGenerator::new(db.clone(), prompt_builder, generator)),
            publish_service: Arc::new(PublishService::new(db.clone())),
            db,
        })
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn notifier(&self) -> &Arc<dyn ErrorNotifier> {
        &self.notifier
    }

    pub fn token_verifier(&self) -> &Arc<dyn TokenVerifier> {
        &self.token_verifier
    }

    pub fn project_service(&self) -> &Arc<ProjectService> {
        &self.project_service
    }

    pub fn backlog_service(&self) -> &Arc<BacklogService> {
        &self.backlog_service
    }

    pub fn cluster_service(&self) -> &Arc<ClusterService> {
        &self.cluster_service
    }

    pub fn sprint_settings_service(&self) -> &Arc<SprintSettingsService> {
        &self.sprint_settings_service
    }

    pub fn content_service(&self) -> &Arc<ContentService> {
        &self.content_service
    }

    pub fn idea_generator(&self) -> &Arc<IdeaGenerator> {
        &self.idea_generator
    }

    pub fn publish_service(&self) -> &Arc<PublishService> {
        &self.publish_service
    }
}
