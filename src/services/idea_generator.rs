//! Chat-driven backlog idea generation grounded in the project context.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::Actor;
use crate::database::entities::{seo_backlog_ideas, seo_clusters, BacklogCategory, BacklogStatus};
use crate::errors::{CoreError, CoreResult};
use crate::integrations::{ChatMessage, ChatRequest};
use crate::services::content_generator::ContentGenerator;
use crate::services::context_loader::ContextLoader;
use crate::services::prompt_builder::PromptBuilder;
use crate::services::ValidationService;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdeaSuggestion {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub cluster_title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IdeaResponse {
    ideas: Vec<IdeaSuggestion>,
}

pub fn parse_idea_response(raw: &str) -> CoreResult<Vec<IdeaSuggestion>> {
    let trimmed = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let parsed: IdeaResponse = serde_json::from_str(trimmed)
        .map_err(|e| CoreError::generation(format!("Model returned malformed ideas JSON: {}", e)))?;
    if parsed.ideas.is_empty() {
        return Err(CoreError::generation("Model returned no ideas"));
    }
    Ok(parsed.ideas)
}

/// Case-insensitive title match, Unicode aware.
fn matching_cluster(clusters: &[seo_clusters::Model], wanted: &str) -> Option<i32> {
    let wanted = wanted.trim().to_lowercase();
    clusters
        .iter()
        .find(|c| c.title.trim().to_lowercase() == wanted)
        .map(|c| c.id)
}

#[derive(Clone)]
pub struct IdeaGenerator {
    db: DatabaseConnection,
    context_loader: ContextLoader,
    prompt_builder: Arc<PromptBuilder>,
    generator: ContentGenerator,
}

impl IdeaGenerator {
    pub fn new(
        db: DatabaseConnection,
        prompt_builder: Arc<PromptBuilder>,
        generator: ContentGenerator,
    ) -> Self {
        let context_loader = ContextLoader::new(db.clone());
        Self {
            db,
            context_loader,
            prompt_builder,
            generator,
        }
    }

    /// Inserts the suggestions as pending ideas. Suggestions with an unknown
    /// category, an empty title or an oversized description are skipped.
    pub async fn generate(
        &self,
        actor: &Actor,
        project_id: i32,
        hypothesis_id: i32,
        count: i32,
    ) -> CoreResult<Vec<seo_backlog_ideas::Model>> {
        let count = ValidationService::validate_idea_count(count)?;
        let snapshot = self
            .context_loader
            .load(actor, project_id, hypothesis_id)
            .await?;

        let request = ChatRequest::new(
            self.generator.model().to_string(),
            vec![
                ChatMessage::system("You are an SEO strategist. Return valid JSON only."),
                ChatMessage::user(self.prompt_builder.build_ideas(&snapshot, count)?),
            ],
        )
        .json()
        .with_temperature(0.8);
        let raw = self.generator.complete_with_fallback(request).await?;
        let suggestions = parse_idea_response(&raw)?;

        let now = Utc::now();
        let mut created = Vec::new();
        for suggestion in suggestions.into_iter().take(count) {
            let category = match suggestion.category.parse::<BacklogCategory>() {
                Ok(category) => category,
                Err(e) => {
                    warn!("Skipping idea '{}': {}", suggestion.title, e);
                    continue;
                }
            };
            let title = match ValidationService::validate_title(&suggestion.title) {
                Ok(title) => title,
                Err(e) => {
                    warn!("Skipping idea: {}", e);
                    continue;
                }
            };
            let description =
                match ValidationService::validate_description(suggestion.description.as_deref()) {
                    Ok(description) => description,
                    Err(e) => {
                        warn!("Skipping idea '{}': {}", title, e);
                        continue;
                    }
                };
            let cluster_id = suggestion
                .cluster_title
                .as_deref()
                .and_then(|wanted| matching_cluster(&snapshot.clusters, wanted));

            let idea = seo_backlog_ideas::ActiveModel {
                project_id: Set(project_id),
                hypothesis_id: Set(hypothesis_id),
                title: Set(title),
                description: Set(description),
                category: Set(category.as_str().to_string()),
                status: Set(BacklogStatus::Pending.as_str().to_string()),
                cluster_id: Set(cluster_id),
                scheduled_date: Set(None),
                created_by: Set(actor.user_id),
                updated_by: Set(actor.user_id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&self.db)
            .await?;
            created.push(idea);
        }

        info!(
            "Generated {} backlog ideas for project {} / hypothesis {}",
            created.len(),
            project_id,
            hypothesis_id
        );
        Ok(created)
    }
}
