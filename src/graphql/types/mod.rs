pub mod backlog;
pub mod cluster;
pub mod content;
pub mod project;
pub mod sprint_settings;
pub mod wordpress;

pub use backlog::*;
pub use cluster::*;
pub use content::*;
pub use project::*;
pub use sprint_settings::*;
pub use wordpress::*;

use crate::errors::CoreError;
use crate::graphql::errors::core_error_to_graphql_error;

/// Convert stored models whose string columns must parse into GraphQL enums.
pub fn convert_all<M, T>(models: Vec<M>) -> async_graphql::Result<Vec<T>>
where
    T: TryFrom<M, Error = CoreError>,
{
    models
        .into_iter()
        .map(|model| T::try_from(model).map_err(core_error_to_graphql_error))
        .collect()
}

/// Undefined keeps the stored value, null clears it.
pub fn patch<T>(value: async_graphql::MaybeUndefined<T>) -> Option<Option<T>> {
    match value {
        async_graphql::MaybeUndefined::Undefined => None,
        async_graphql::MaybeUndefined::Null => Some(None),
        async_graphql::MaybeUndefined::Value(value) => Some(Some(value)),
    }
}
