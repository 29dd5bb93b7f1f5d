//! Error types shared by every service in the crate.
//!
//! Services return [`CoreError`], whose [`CoreErrorKind`] mirrors the failure
//! taxonomy exposed to clients:
//!
//! - **NotFound**: an id does not resolve (project, hypothesis, idea, content item, cluster)
//! - **Forbidden**: the entity exists but is outside the caller's project chain
//! - **Validation**: malformed enum values or out-of-range settings
//! - **Generation**: the AI provider returned no usable content or image
//! - **Publish**: the CMS rejected a post or did not confirm it
//! - **ExternalService**: transport-level failures talking to third parties
//!
//! Integration clients keep their own `thiserror` enums and convert into
//! `CoreError` at the service boundary.
//!
//! ```rust
//! use seo_agent::errors::{CoreError, CoreErrorKind};
//!
//! let err = CoreError::not_found("Project", 42);
//! assert_eq!(err.kind(), CoreErrorKind::NotFound);
//! assert_eq!(err.http_status(), 404);
//! ```

pub mod core_error;

pub use core_error::{CoreError, CoreErrorKind};

/// Result type alias for service operations
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_carries_entity_fields() {
        let err = CoreError::not_found("ContentItem", 7);
        let fields = err.fields().unwrap();
        assert_eq!(fields.get("entity").map(String::as_str), Some("ContentItem"));
        assert_eq!(fields.get("id").map(String::as_str), Some("7"));
        assert_eq!(err.to_string(), "ContentItem 7 not found");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(CoreError::forbidden("no").http_status(), 403);
        assert_eq!(CoreError::unauthorized("no").http_status(), 401);
        assert_eq!(CoreError::validation("bad").http_status(), 400);
        assert_eq!(CoreError::conflict("taken").http_status(), 409);
        assert_eq!(CoreError::generation("empty").http_status(), 502);
        assert_eq!(CoreError::publish("rejected").http_status(), 502);
        assert_eq!(CoreError::internal("boom").http_status(), 500);
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(CoreError::validation("x").code(), "VALIDATION_FAILED");
        assert_eq!(CoreError::external("x").code(), "SERVICE_ERROR");
        assert_eq!(CoreError::publish("x").code(), "PUBLISH_FAILED");
    }
}
