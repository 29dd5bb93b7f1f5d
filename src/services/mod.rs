pub mod authorization;
pub mod backlog_service;
pub mod cluster_service;
pub mod content_generator;
pub mod content_service;
pub mod context_loader;
pub mod idea_generator;
pub mod image_generator;
pub mod image_jobs;
pub mod project_service;
pub mod prompt_builder;
pub mod publish_service;
pub mod sprint_settings_service;
pub mod validation;

pub use authorization::*;
pub use backlog_service::*;
pub use cluster_service::*;
pub use content_service::*;
pub use project_service::*;
pub use publish_service::*;
pub use sprint_settings_service::*;
pub use validation::*;
