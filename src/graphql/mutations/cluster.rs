use async_graphql::*;

use crate::graphql::context::GraphQLContext;
use crate::graphql::errors::core_error_to_graphql_error;
use crate::graphql::types::{CreateSeoClusterInput, SeoCluster, UpdateSeoClusterInput};

#[derive(Default)]
pub struct ClusterMutation;

#[Object]
impl ClusterMutation {
    #[graphql(name = "createSeoCluster")]
    async fn create_seo_cluster(
        &self,
        ctx: &Context<'_>,
        input: CreateSeoClusterInput,
    ) -> Result<SeoCluster> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let cluster = context
            .app
            .cluster_service()
            .create(&actor, input.into())
            .await
            .map_err(core_error_to_graphql_error)?;

        SeoCluster::try_from(cluster).map_err(core_error_to_graphql_error)
    }

    #[graphql(name = "updateSeoCluster")]
    async fn update_seo_cluster(
        &self,
        ctx: &Context<'_>,
        id: i32,
        input: UpdateSeoClusterInput,
    ) -> Result<SeoCluster> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        let cluster = context
            .app
            .cluster_service()
            .update(&actor, id, input.into())
            .await
            .map_err(core_error_to_graphql_error)?;

        SeoCluster::try_from(cluster).map_err(core_error_to_graphql_error)
    }

    /// Ideas in the cluster are kept and unlinked
    #[graphql(name = "deleteSeoCluster")]
    async fn delete_seo_cluster(&self, ctx: &Context<'_>, id: i32) -> Result<bool> {
        let context = ctx.data::<GraphQLContext>()?;
        let actor = context.actor_for_request(ctx)?;
        context
            .app
            .cluster_service()
            .delete(&actor, id)
            .await
            .map_err(core_error_to_graphql_error)?;

        Ok(true)
    }
}
