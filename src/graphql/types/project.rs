use async_graphql::*;
use chrono::{DateTime, Utc};

use crate::database::entities::hypotheses::{self, IcpProfile, LeanCanvas};
use crate::database::entities::projects;
use crate::services::{NewHypothesis, NewProject};

#[derive(SimpleObject)]
pub struct Project {
    pub id: i32,
    #[graphql(name = "ownerId")]
    pub owner_id: i32,
    pub title: String,
    pub language: Option<String>,
    #[graphql(name = "infoLanguage")]
    pub info_language: Option<String>,
    #[graphql(name = "settingsLanguage")]
    pub settings_language: Option<String>,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[graphql(name = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<projects::Model> for Project {
    fn from(model: projects::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            title: model.title,
            language: model.language,
            info_language: model.info_language,
            settings_language: model.settings_language,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(SimpleObject, Default)]
#[graphql(name = "LeanCanvas")]
pub struct LeanCanvasView {
    pub problems: Vec<String>,
    pub solutions: Vec<String>,
    #[graphql(name = "uniqueValueProposition")]
    pub unique_value_proposition: Option<String>,
    #[graphql(name = "customerSegments")]
    pub customer_segments: Vec<String>,
    pub channels: Vec<String>,
}

impl From<LeanCanvas> for LeanCanvasView {
    fn from(canvas: LeanCanvas) -> Self {
        Self {
            problems: canvas.problems,
            solutions: canvas.solutions,
            unique_value_proposition: canvas.unique_value_proposition,
            customer_segments: canvas.customer_segments,
            channels: canvas.channels,
        }
    }
}

#[derive(SimpleObject, Default)]
#[graphql(name = "IcpProfile")]
pub struct IcpView {
    pub persona: Option<String>,
    pub pains: Vec<String>,
    pub goals: Vec<String>,
    pub triggers: Vec<String>,
    pub language: Option<String>,
}

impl From<IcpProfile> for IcpView {
    fn from(icp: IcpProfile) -> Self {
        Self {
            persona: icp.persona,
            pains: icp.pains,
            goals: icp.goals,
            triggers: icp.triggers,
            language: icp.language,
        }
    }
}

#[derive(SimpleObject)]
pub struct Hypothesis {
    pub id: i32,
    #[graphql(name = "projectId")]
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    #[graphql(name = "leanCanvas")]
    pub lean_canvas: Option<LeanCanvasView>,
    pub icp: Option<IcpView>,
    #[graphql(name = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<hypotheses::Model> for Hypothesis {
    fn from(model: hypotheses::Model) -> Self {
        // Malformed JSON blobs are shown as absent; generation treats them the same way.
        let lean_canvas = model
            .lean_canvas
            .as_deref()
            .and_then(|raw| serde_json::from_str::<LeanCanvas>(raw).ok())
            .map(LeanCanvasView::from);
        let icp = model
            .icp
            .as_deref()
            .and_then(|raw| serde_json::from_str::<IcpProfile>(raw).ok())
            .map(IcpView::from);
        Self {
            id: model.id,
            project_id: model.project_id,
            title: model.title,
            description: model.description,
            lean_canvas,
            icp,
            created_at: model.created_at,
        }
    }
}

#[derive(InputObject)]
pub struct CreateProjectInput {
    pub title: String,
    pub language: Option<String>,
    #[graphql(name = "infoLanguage")]
    pub info_language: Option<String>,
    #[graphql(name = "settingsLanguage")]
    pub settings_language: Option<String>,
}

impl From<CreateProjectInput> for NewProject {
    fn from(input: CreateProjectInput) -> Self {
        Self {
            title: input.title,
            language: input.language,
            info_language: input.info_language,
            settings_language: input.settings_language,
        }
    }
}

#[derive(InputObject)]
pub struct LeanCanvasInput {
    #[graphql(default)]
    pub problems: Vec<String>,
    #[graphql(default)]
    pub solutions: Vec<String>,
    #[graphql(name = "uniqueValueProposition")]
    pub unique_value_proposition: Option<String>,
    #[graphql(name = "customerSegments", default)]
    pub customer_segments: Vec<String>,
    #[graphql(default)]
    pub channels: Vec<String>,
}

#[derive(InputObject)]
pub struct IcpInput {
    pub persona: Option<String>,
    #[graphql(default)]
    pub pains: Vec<String>,
    #[graphql(default)]
    pub goals: Vec<String>,
    #[graphql(default)]
    pub triggers: Vec<String>,
    pub language: Option<String>,
}

#[derive(InputObject)]
pub struct CreateHypothesisInput {
    #[graphql(name = "projectId")]
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    #[graphql(name = "leanCanvas")]
    pub lean_canvas: Option<LeanCanvasInput>,
    pub icp: Option<IcpInput>,
}

impl From<CreateHypothesisInput> for NewHypothesis {
    fn from(input: CreateHypothesisInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            lean_canvas: input.lean_canvas.map(|canvas| LeanCanvas {
                problems: canvas.problems,
                solutions: canvas.solutions,
                unique_value_proposition: canvas.unique_value_proposition,
                customer_segments: canvas.customer_segments,
                channels: canvas.channels,
            }),
            icp: input.icp.map(|icp| IcpProfile {
                persona: icp.persona,
                pains: icp.pains,
                goals: icp.goals,
                triggers: icp.triggers,
                language: icp.language,
            }),
        }
    }
}
