//! Background image generation with retries.
//!
//! Content items track the job through `image_status`: `pending` while queued
//! or running, then `ready` or `failed` (with `image_error`).

use std::time::Duration;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::database::entities::{seo_content_items, ImageStatus};
use crate::errors::{CoreError, CoreResult};
use crate::services::image_generator::{ImageGenerator, ImageVariant};

#[derive(Clone, Debug)]
pub struct ImageJob {
    pub id: Uuid,
    pub content_item_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub variant: ImageVariant,
}

/// Write the outcome of an image generation onto the content item.
pub async fn record_image_outcome(
    db: &DatabaseConnection,
    content_item_id: i32,
    outcome: &CoreResult<String>,
) -> CoreResult<seo_content_items::Model> {
    let item = seo_content_items::Entity::find_by_id(content_item_id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found("Content item", content_item_id))?;

    let mut active: seo_content_items::ActiveModel = item.into();
    match outcome {
        Ok(url) => {
            active.image_url = Set(Some(url.clone()));
            active.image_status = Set(ImageStatus::Ready.as_str().to_string());
            active.image_error = Set(None);
        }
        Err(e) => {
            active.image_status = Set(ImageStatus::Failed.as_str().to_string());
            active.image_error = Set(Some(e.message().to_string()));
        }
    }
    active.updated_at = Set(Utc::now());
    Ok(active.update(db).await?)
}

pub async fn mark_image_pending(db: &DatabaseConnection, content_item_id: i32) -> CoreResult<()> {
    let item = seo_content_items::Entity::find_by_id(content_item_id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found("Content item", content_item_id))?;
    let mut active: seo_content_items::ActiveModel = item.into();
    active.image_status = Set(ImageStatus::Pending.as_str().to_string());
    active.image_error = Set(None);
    active.updated_at = Set(Utc::now());
    active.update(db).await?;
    Ok(())
}

#[derive(Clone)]
pub struct ImageJobWorker {
    db: DatabaseConnection,
    generator: ImageGenerator,
    max_attempts: u32,
    retry_delay: Duration,
}

impl ImageJobWorker {
    pub fn new(
        db: DatabaseConnection,
        generator: ImageGenerator,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            db,
            generator,
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    pub async fn process(&self, job: &ImageJob) {
        let mut attempt = 1;
        let outcome = loop {
            let result = self
                .generator
                .generate(
                    job.content_item_id,
                    &job.title,
                    job.description.as_deref(),
                    job.variant,
                )
                .await;
            match result {
                Ok(url) => break Ok(url),
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        "Image job {} attempt {}/{} failed: {}",
                        job.id, attempt, self.max_attempts, e
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => break Err(e),
            }
        };

        match &outcome {
            Ok(url) => info!("Image job {} finished: {}", job.id, url),
            Err(e) => error!(
                "Image job {} failed after {} attempts: {}",
                job.id, self.max_attempts, e
            ),
        }

        if let Err(e) = record_image_outcome(&self.db, job.content_item_id, &outcome).await {
            error!("Image job {} could not record its outcome: {}", job.id, e);
        }
    }
}

#[derive(Clone)]
enum Mode {
    Background(mpsc::UnboundedSender<ImageJob>),
    Immediate(ImageJobWorker),
    Disabled,
}

#[derive(Clone)]
pub struct ImageJobQueue {
    db: DatabaseConnection,
    mode: Mode,
}

impl ImageJobQueue {
    /// Spawn the worker task. Must be called inside a tokio runtime.
    pub fn start(worker: ImageJobWorker) -> Self {
        let db = worker.db.clone();
        let (sender, mut receiver) = mpsc::unbounded_channel::<ImageJob>();
        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                worker.process(&job).await;
            }
            info!("Image job queue closed");
        });
        Self {
            db,
            mode: Mode::Background(sender),
        }
    }

    /// Runs each job to completion inside `enqueue`.
    pub fn immediate(worker: ImageJobWorker) -> Self {
        Self {
            db: worker.db.clone(),
            mode: Mode::Immediate(worker),
        }
    }

    /// Marks items pending but never runs the job.
    pub fn disabled(db: DatabaseConnection) -> Self {
        Self {
            db,
            mode: Mode::Disabled,
        }
    }

    pub async fn enqueue(
        &self,
        content_item_id: i32,
        title: &str,
        description: Option<&str>,
        variant: ImageVariant,
    ) -> CoreResult<Uuid> {
        let job = ImageJob {
            id: Uuid::new_v4(),
            content_item_id,
            title: title.to_string(),
            description: description.map(str::to_string),
            variant,
        };
        mark_image_pending(&self.db, content_item_id).await?;

        match &self.mode {
            Mode::Background(sender) => {
                sender
                    .send(job.clone())
                    .map_err(|_| CoreError::internal("Image job queue is not running"))?;
                info!("Queued image job {} for content item {}", job.id, content_item_id);
            }
            Mode::Immediate(worker) => worker.process(&job).await,
            Mode::Disabled => {
                warn!("Image jobs disabled; job {} dropped", job.id);
            }
        }
        Ok(job.id)
    }
}
