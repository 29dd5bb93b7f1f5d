use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ApiError;
use crate::auth::{authenticate, Actor};
use crate::database::entities::seo_content_items;
use crate::errors::CoreError;
use crate::server::app::AppState;
use crate::services::image_generator::ImageVariant;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    pub content_item_id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub variant: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub success: bool,
    pub content_item_id: i32,
    pub image_url: Option<String>,
    pub image_status: String,
}

impl From<seo_content_items::Model> for ImageResponse {
    fn from(item: seo_content_items::Model) -> Self {
        Self {
            success: true,
            content_item_id: item.id,
            image_url: item.image_url,
            image_status: item.image_status,
        }
    }
}

fn actor_from_headers(state: &AppState, headers: &HeaderMap) -> Result<Actor, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    Ok(authenticate(state.app.token_verifier().as_ref(), header)?)
}

pub async fn generate_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<GenerateImageRequest>,
) -> Result<Json<ImageResponse>, ApiError> {
    let actor = actor_from_headers(&state, &headers)?;
    let variant = match payload.variant.as_deref() {
        Some(raw) => raw.parse::<ImageVariant>()?,
        None => ImageVariant::Hero,
    };
    info!(
        "Generating {} image for content item {}",
        variant.as_str(),
        payload.content_item_id
    );

    let item = state
        .app
        .content_service()
        .generate_image(
            &actor,
            payload.content_item_id,
            payload.title.as_deref().unwrap_or_default(),
            payload.description.as_deref(),
            variant,
        )
        .await?;

    Ok(Json(ImageResponse::from(item)))
}

pub async fn delete_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(content_item_id): Path<String>,
) -> Result<Json<ImageResponse>, ApiError> {
    let actor = actor_from_headers(&state, &headers)?;
    let content_item_id = content_item_id.parse::<i32>().map_err(|_| {
        CoreError::validation(format!("Invalid content item id '{}'", content_item_id))
    })?;

    let item = state
        .app
        .content_service()
        .delete_image(&actor, content_item_id)
        .await?;

    Ok(Json(ImageResponse::from(item)))
}
