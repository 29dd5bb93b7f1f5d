use std::sync::Arc;

use async_graphql::{Context, Result};

use crate::app_context::AppContext;
use crate::auth::{authenticate, Actor};
use crate::graphql::errors::core_error_to_graphql_error;

/// Raw `Authorization` header of the HTTP request, attached as request data.
#[derive(Clone, Debug, Default)]
pub struct RequestAuth(pub Option<String>);

impl RequestAuth {
    pub fn bearer(token: &str) -> Self {
        Self(Some(format!("Bearer {}", token)))
    }
}

#[derive(Clone)]
pub struct GraphQLContext {
    pub app: Arc<AppContext>,
}

impl GraphQLContext {
    pub fn new(app: Arc<AppContext>) -> Self {
        Self { app }
    }

    /// Resolve the caller from the request's bearer token.
    pub fn actor_for_request(&self, ctx: &Context<'_>) -> Result<Actor> {
        let header = ctx
            .data_opt::<RequestAuth>()
            .and_then(|auth| auth.0.as_deref());
        authenticate(self.app.token_verifier().as_ref(), header).map_err(core_error_to_graphql_error)
    }
}
