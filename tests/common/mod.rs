#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};
use serde_json::json;

use seo_agent::app_context::{AppContext, Collaborators, ContextOptions, ImageJobMode};
use seo_agent::auth::{Actor, StaticTokenVerifier};
use seo_agent::database::entities::hypotheses::{IcpProfile, LeanCanvas};
use seo_agent::database::entities::{hypotheses, projects};
use seo_agent::database::connect_in_memory;
use seo_agent::integrations::{
    ChatCompletion, ChatError, ChatRequest, ErrorNotifier, GeneratedImage, ImageError,
    ImagePrompt, ImageProvider,
};
use seo_agent::services::{NewHypothesis, NewProject, ProjectService};
use seo_agent::storage::MediaStorage;

pub const OWNER_TOKEN: &str = "owner-token";
pub const STRANGER_TOKEN: &str = "stranger-token";
pub const OWNER_ID: i32 = 1;
pub const STRANGER_ID: i32 = 2;

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    connect_in_memory().await
}

pub fn owner() -> Actor {
    Actor::user(OWNER_ID)
}

pub fn stranger() -> Actor {
    Actor::user(STRANGER_ID)
}

/// A minimal valid article in the generator's JSON contract.
pub fn article_json(title: &str, body: &str) -> String {
    json!({
        "title": title,
        "summary": "Summary",
        "outline": [
            {"heading": "Why it matters", "body": body},
            {"heading": "How to start", "body": "Step by step."}
        ],
        "cta": "Try it today",
        "compliance": []
    })
    .to_string()
}

/// Chat fake answering from a script, then from a default reply.
/// Every request is recorded for later inspection.
#[derive(Default)]
pub struct ScriptedChat {
    script: Mutex<VecDeque<Result<String, String>>>,
    default_reply: Mutex<Option<String>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChat {
    pub fn replying(reply: impl Into<String>) -> Self {
        let chat = Self::default();
        chat.set_default(Some(reply.into()));
        chat
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, reply: impl Into<String>) {
        self.script.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn push_err(&self, message: impl Into<String>) {
        self.script.lock().unwrap().push_back(Err(message.into()));
    }

    pub fn set_default(&self, reply: Option<String>) {
        *self.default_reply.lock().unwrap() = reply;
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .flat_map(|request| request.messages.iter().map(|m| m.content.clone()))
            .collect()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedChat {
    async fn complete(&self, request: ChatRequest) -> Result<String, ChatError> {
        self.requests.lock().unwrap().push(request);
        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(ChatError::ApiError {
                status: 503,
                message,
            }),
            None => match self.default_reply.lock().unwrap().clone() {
                Some(reply) => Ok(reply),
                None => Err(ChatError::ApiError {
                    status: 503,
                    message: "provider unavailable".to_string(),
                }),
            },
        }
    }
}

/// Image fake returning a fixed PNG payload, or failing when told to.
#[derive(Default)]
pub struct FakeImageProvider {
    pub fail: bool,
    pub calls: Mutex<Vec<ImagePrompt>>,
}

#[async_trait]
impl ImageProvider for FakeImageProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn generate(&self, prompt: &ImagePrompt) -> Result<GeneratedImage, ImageError> {
        self.calls.lock().unwrap().push(prompt.clone());
        if self.fail {
            return Err(ImageError::NoImage);
        }
        Ok(GeneratedImage {
            bytes: vec![0x89, b'P', b'N', b'G'],
            format: "png".to_string(),
        })
    }
}

/// In-memory object storage.
#[derive(Default)]
pub struct MemoryStorage {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl MediaStorage for MemoryStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), seo_agent::storage::StorageError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, seo_agent::storage::StorageError> {
        let mut objects = self.objects.lock().unwrap();
        let before = objects.len();
        objects.retain(|key, _| !key.starts_with(prefix));
        Ok(before - objects.len())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://cdn.test/media/{}", key)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

#[async_trait]
impl ErrorNotifier for RecordingNotifier {
    async fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

pub struct TestApp {
    pub db: DatabaseConnection,
    pub app: Arc<AppContext>,
    pub chat: Arc<ScriptedChat>,
    pub images: Arc<FakeImageProvider>,
    pub storage: Arc<MemoryStorage>,
    pub notifier: Arc<RecordingNotifier>,
}

pub async fn test_app(chat: ScriptedChat, image_jobs: ImageJobMode) -> TestApp {
    test_app_with_images(chat, FakeImageProvider::default(), image_jobs).await
}

pub async fn test_app_with_images(
    chat: ScriptedChat,
    images: FakeImageProvider,
    image_jobs: ImageJobMode,
) -> TestApp {
    let db = setup_test_db().await.unwrap();
    let chat = Arc::new(chat);
    let images = Arc::new(images);
    let storage = Arc::new(MemoryStorage::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let verifier = StaticTokenVerifier::parse(&format!(
        "{}:{},{}:{}",
        OWNER_TOKEN, OWNER_ID, STRANGER_TOKEN, STRANGER_ID
    ))
    .unwrap();

    let app = AppContext::new(
        db.clone(),
        Collaborators {
            chat: chat.clone(),
            pages: None,
            image_provider: images.clone(),
            storage: storage.clone(),
            notifier: notifier.clone(),
            token_verifier: Arc::new(verifier),
        },
        ContextOptions {
            chat_model: "test-model".to_string(),
            fallback_model: "test-fallback".to_string(),
            image_jobs,
        },
    )
    .unwrap();

    TestApp {
        db,
        app: Arc::new(app),
        chat,
        images,
        storage,
        notifier,
    }
}

pub fn immediate_images() -> ImageJobMode {
    ImageJobMode::Immediate {
        max_attempts: 2,
        retry_delay: Duration::from_millis(1),
    }
}

/// Project owned by [`OWNER_ID`] with one hypothesis carrying a canvas and ICP.
pub async fn seed_project(
    db: &DatabaseConnection,
    settings_language: Option<&str>,
    language: Option<&str>,
) -> (projects::Model, hypotheses::Model) {
    let service = ProjectService::new(db.clone());
    let project = service
        .create_project(
            &owner(),
            NewProject {
                title: "Acme Analytics".to_string(),
                language: language.map(str::to_string),
                info_language: None,
                settings_language: settings_language.map(str::to_string),
            },
        )
        .await
        .unwrap();
    let hypothesis = service
        .create_hypothesis(
            &owner(),
            project.id,
            NewHypothesis {
                title: "Small agencies need faster reporting".to_string(),
                description: Some("Agencies lose hours compiling client reports".to_string()),
                lean_canvas: Some(LeanCanvas {
                    problems: vec!["Manual reporting".to_string()],
                    solutions: vec!["Automated dashboards".to_string()],
                    unique_value_proposition: Some("Reports in one click".to_string()),
                    customer_segments: vec!["Marketing agencies".to_string()],
                    channels: vec!["SEO".to_string()],
                }),
                icp: Some(IcpProfile {
                    persona: Some("Agency owner".to_string()),
                    pains: vec!["Late reports".to_string()],
                    goals: vec!["Happy clients".to_string()],
                    triggers: vec!["Client churn".to_string()],
                    language: None,
                }),
            },
        )
        .await
        .unwrap();
    (project, hypothesis)
}
