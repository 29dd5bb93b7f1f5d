use async_graphql::*;

use crate::graphql::context::GraphQLContext;
use crate::graphql::errors::core_error_to_graphql_error;
use crate::graphql::types::{
    ConnectionResult, PublishResult, PublishToWordPressInput, WordPressCredentialsInput,
};

#[derive(Default)]
pub struct PublishMutation;

#[Object]
impl PublishMutation {
    /// Publish a ready content item. WordPress failures come back as
    /// `success: false` and change nothing.
    #[graphql(name = "publishToWordPress")]
    async fn publish_to_wordpress(
        &self,
        ctx: &Context<'_>,
        input: PublishToWordPressInput,
    ) -> Result<PublishResult> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let outcome = context
            .app
            .publish_service()
            .publish(&actor, input.into())
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(PublishResult::from(outcome))
    }

    #[graphql(name = "testWordPressConnection")]
    async fn test_wordpress_connection(
        &self,
        ctx: &Context<'_>,
        input: WordPressCredentialsInput,
    ) -> Result<ConnectionResult> {
        let context = ctx.data::<GraphQLContext>()?;
        context.actor_for_request(ctx)?;
        let outcome = context
            .app
            .publish_service()
            .test_connection(input.into())
            .await;

        Ok(ConnectionResult::from(outcome))
    }
}
