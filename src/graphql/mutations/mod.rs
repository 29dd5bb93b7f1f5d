// Mutation roots grouped by functional area and merged into one schema type.

mod backlog;
mod cluster;
mod content;
mod project;
mod publish;
mod sprint_settings;

use async_graphql::*;

#[derive(Default, MergedObject)]
pub struct Mutation(
    pub project::ProjectMutation,
    pub cluster::ClusterMutation,
    pub backlog::BacklogMutation,
    pub content::ContentMutation,
    pub sprint_settings::SprintSettingsMutation,
    pub publish::PublishMutation,
);
