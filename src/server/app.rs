use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

#[cfg(feature = "graphql")]
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
#[cfg(feature = "graphql")]
use axum::{extract::State, http::HeaderMap};

use crate::app_context::AppContext;
#[cfg(feature = "graphql")]
use crate::graphql::{build_schema, execute_request, GraphQLSchema};

use super::handlers::{health, images};

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<AppContext>,
    #[cfg(feature = "graphql")]
    pub graphql_schema: GraphQLSchema,
}

#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub cors_origin: Option<String>,
    /// Directory served under `/media`.
    pub storage_root: PathBuf,
}

pub fn create_app(app: Arc<AppContext>, options: &ServerOptions) -> Result<Router> {
    let state = AppState {
        #[cfg(feature = "graphql")]
        graphql_schema: build_schema(app.clone()),
        app,
    };

    let cors = match options.cors_origin.as_deref() {
        Some(origin) => CorsLayer::new()
            .allow_origin(
                origin
                    .parse::<axum::http::HeaderValue>()
                    .map_err(|e| anyhow!("Invalid CORS origin: {}", e))?,
            )
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any)
            .allow_credentials(false),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any)
            .allow_credentials(false),
    };

    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/images/generate", post(images::generate_image))
        .route("/api/images/:id", delete(images::delete_image));

    #[cfg(feature = "graphql")]
    {
        router = router.route(
            "/graphql",
            get(graphql_playground)
                .post(graphql_handler)
                .options(|| async { axum::http::StatusCode::OK }),
        );
    }

    let router = router
        .nest_service("/media", ServeDir::new(&options.storage_root))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state);

    Ok(router)
}

#[cfg(feature = "graphql")]
async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let authorization = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    tracing::debug!("GraphQL request received");
    let response = execute_request(
        &state.graphql_schema,
        &state.app,
        request.into_inner(),
        authorization,
    )
    .await;
    tracing::debug!("GraphQL request completed");
    response.into()
}

#[cfg(feature = "graphql")]
async fn graphql_playground() -> impl axum::response::IntoResponse {
    axum::response::Html(async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new("/graphql"),
    ))
}
