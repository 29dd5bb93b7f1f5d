use async_graphql::*;

use crate::graphql::context::GraphQLContext;
use crate::graphql::errors::core_error_to_graphql_error;
use crate::graphql::types::{SeoSprintSettings, SeoSprintSettingsInput};

#[derive(Default)]
pub struct SprintSettingsMutation;

#[Object]
impl SprintSettingsMutation {
    /// Create or replace the settings of a (project, hypothesis) pair.
    /// Omitted WordPress fields keep their stored values.
    #[graphql(name = "upsertSeoSprintSettings")]
    async fn upsert_seo_sprint_settings(
        &self,
        ctx: &Context<'_>,
        input: SeoSprintSettingsInput,
    ) -> Result<SeoSprintSettings> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let settings = context
            .app
            .sprint_settings_service()
            .upsert(&actor, input.into())
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(SeoSprintSettings::from(settings))
    }

    #[graphql(name = "deleteSeoSprintSettings")]
    async fn delete_seo_sprint_settings(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "projectId")] project_id: i32,
        #[graphql(name = "hypothesisId")] hypothesis_id: i32,
    ) -> Result<bool> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        context
            .app
            .sprint_settings_service()
            .delete(&actor, project_id, hypothesis_id)
            .await
            .map_err(core_error_to_graphql_error)
    }
}
