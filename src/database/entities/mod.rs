pub mod common_types;
pub mod hypotheses;
pub mod projects;
pub mod seo_backlog_ideas;
pub mod seo_clusters;
pub mod seo_content_items;
pub mod seo_sprint_settings;

pub use common_types::{
    BacklogCategory, BacklogStatus, ClusterIntent, ContentFormat, ContentStatus, ImageStatus,
};
