use async_graphql::*;

use crate::graphql::context::GraphQLContext;
use crate::graphql::errors::core_error_to_graphql_error;
use crate::graphql::types::{CreateHypothesisInput, CreateProjectInput, Hypothesis, Project};

#[derive(Default)]
pub struct ProjectMutation;

#[Object]
impl ProjectMutation {
    /// Create a project owned by the caller
    async fn create_project(&self, ctx: &Context<'_>, input: CreateProjectInput) -> Result<Project> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let project = context
            .app
            .project_service()
            .create_project(&actor, input.into())
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(Project::from(project))
    }

    async fn create_hypothesis(
        &self,
        ctx: &Context<'_>,
        input: CreateHypothesisInput,
    ) -> Result<Hypothesis> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let project_id = input.project_id;
        let hypothesis = context
            .app
            .project_service()
            .create_hypothesis(&actor, project_id, input.into())
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(Hypothesis::from(hypothesis))
    }
}
