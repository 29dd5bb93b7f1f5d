//! Assembles the project context used to keep generated content on-brand.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::Actor;
use crate::database::entities::hypotheses::{IcpProfile, LeanCanvas};
use crate::database::entities::{hypotheses, projects, seo_clusters};
use crate::errors::CoreResult;
use crate::services::AuthorizationService;

pub const DEFAULT_LANGUAGE: &str = "English";

#[derive(Clone, Debug)]
pub struct ContextSnapshot {
    pub project: projects::Model,
    pub hypothesis: hypotheses::Model,
    pub lean_canvas: LeanCanvas,
    pub icp: IcpProfile,
    pub clusters: Vec<seo_clusters::Model>,
    pub language: String,
}

/// Map language codes to display names; unknown values are title-cased.
pub fn normalize_language(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let known = match trimmed.to_lowercase().as_str() {
        "en" | "eng" | "english" | "en-us" | "en-gb" => Some("English"),
        "ru" | "rus" | "russian" | "ru-ru" => Some("Russian"),
        _ => None,
    };
    if let Some(name) = known {
        return Some(name.to_string());
    }

    let mut chars = trimmed.chars();
    chars.next().map(|first| {
        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
    })
}

/// Settings language, then project language, then the info block. ICP language never counts.
pub fn resolve_language(project: &projects::Model) -> String {
    [
        project.settings_language.as_deref(),
        project.language.as_deref(),
        project.info_language.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find_map(normalize_language)
    .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

fn parse_json_column<T: DeserializeOwned + Default>(raw: Option<&str>, column: &str, id: i32) -> T {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => T::default(),
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
            warn!("Ignoring malformed {} on hypothesis {}: {}", column, id, e);
            T::default()
        }),
    }
}

#[derive(Clone)]
pub struct ContextLoader {
    db: DatabaseConnection,
    auth_service: AuthorizationService,
}

impl ContextLoader {
    pub fn new(db: DatabaseConnection) -> Self {
        let auth_service = AuthorizationService::new(db.clone());
        Self { db, auth_service }
    }

    /// Read-only. NotFound for a missing project or a hypothesis outside it,
    /// Forbidden when the actor does not own the project.
    pub async fn load(
        &self,
        actor: &Actor,
        project_id: i32,
        hypothesis_id: i32,
    ) -> CoreResult<ContextSnapshot> {
        let (project, hypothesis) = self
            .auth_service
            .ensure_scope(actor, project_id, hypothesis_id)
            .await?;

        let clusters = seo_clusters::Entity::find()
            .filter(seo_clusters::Column::ProjectId.eq(project_id))
            .filter(seo_clusters::Column::HypothesisId.eq(hypothesis_id))
            .order_by_asc(seo_clusters::Column::Id)
            .all(&self.db)
            .await?;

        let lean_canvas =
            parse_json_column(hypothesis.lean_canvas.as_deref(), "lean canvas", hypothesis.id);
        let icp = parse_json_column(hypothesis.icp.as_deref(), "ICP", hypothesis.id);
        let language = resolve_language(&project);

        debug!(
            "Loaded context for project {} / hypothesis {}: {} clusters, language {}",
            project_id,
            hypothesis_id,
            clusters.len(),
            language
        );

        Ok(ContextSnapshot {
            project,
            hypothesis,
            lean_canvas,
            icp,
            clusters,
            language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn project(settings: Option<&str>, language: Option<&str>, info: Option<&str>) -> projects::Model {
        projects::Model {
            id: 1,
            owner_id: 1,
            title: "Acme CRM".to_string(),
            language: language.map(str::to_string),
            info_language: info.map(str::to_string),
            settings_language: settings.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_settings_language_wins() {
        assert_eq!(resolve_language(&project(Some("ru"), Some("English"), None)), "Russian");
    }

    #[test]
    fn test_precedence_falls_through_blanks() {
        assert_eq!(resolve_language(&project(Some("  "), None, Some("en"))), "English");
        assert_eq!(resolve_language(&project(None, Some("de"), Some("ru"))), "De");
        assert_eq!(resolve_language(&project(None, None, None)), DEFAULT_LANGUAGE);
    }

    #[test]
    fn test_normalize_language() {
        assert_eq!(normalize_language("EN").as_deref(), Some("English"));
        assert_eq!(normalize_language("russian").as_deref(), Some("Russian"));
        assert_eq!(normalize_language("spanish").as_deref(), Some("Spanish"));
        assert_eq!(normalize_language("").as_deref(), None);
    }
}
