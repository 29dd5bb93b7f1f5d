use std::sync::Arc;

use async_graphql::*;

use crate::app_context::AppContext;
use crate::graphql::context::{GraphQLContext, RequestAuth};
use crate::graphql::errors::finalize_response;
use crate::graphql::mutations::Mutation;
use crate::graphql::queries::Query;

pub type GraphQLSchema = Schema<Query, Mutation, EmptySubscription>;

pub fn build_schema(app: Arc<AppContext>) -> GraphQLSchema {
    Schema::build(Query, Mutation::default(), EmptySubscription)
        .data(GraphQLContext::new(app))
        .finish()
}

/// Run a request with the caller's `Authorization` header and pass the
/// response through error finalisation.
pub async fn execute_request(
    schema: &GraphQLSchema,
    app: &AppContext,
    request: Request,
    authorization: Option<String>,
) -> Response {
    let response = schema.execute(request.data(RequestAuth(authorization))).await;
    finalize_response(response, app.notifier().as_ref()).await
}
