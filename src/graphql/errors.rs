use async_graphql::*;
use tracing::warn;

use crate::auth::MISSING_TOKEN_MESSAGE;
use crate::errors::CoreError;
use crate::integrations::ErrorNotifier;

/// Convert a service error into a GraphQL error carrying a `code` extension
/// plus any structured fields (entity, id).
pub fn core_error_to_graphql_error(error: CoreError) -> Error {
    let code = error.code();
    let fields = error.fields().cloned();
    Error::new(error.message().to_string()).extend_with(move |_, e| {
        e.set("code", code);
        if let Some(fields) = &fields {
            for (key, value) in fields {
                e.set(key, value.as_str());
            }
        }
    })
}

fn error_code(error: &ServerError) -> Option<String> {
    match error.extensions.as_ref().and_then(|ext| ext.get("code")) {
        Some(Value::String(code)) => Some(code.clone()),
        _ => None,
    }
}

fn format_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(|segment| match segment {
            PathSegment::Field(name) => name.clone(),
            PathSegment::Index(index) => index.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Missing tokens are routine client noise and never reach the operator channel.
pub fn is_missing_token_error(error: &ServerError) -> bool {
    error_code(error).as_deref() == Some("UNAUTHORIZED") && error.message == MISSING_TOKEN_MESSAGE
}

/// Forward every error to the notifier, then strip extensions so clients
/// only see `message`, `locations` and `path`.
pub async fn finalize_response(mut response: Response, notifier: &dyn ErrorNotifier) -> Response {
    for error in response.errors.iter_mut() {
        if !is_missing_token_error(error) {
            let code = error_code(error).unwrap_or_else(|| "INTERNAL_ERROR".to_string());
            let path = format_path(&error.path);
            warn!("GraphQL error [{}] at '{}': {}", code, path, error.message);
            notifier
                .notify(&format!(
                    "GraphQL error [{}] at '{}': {}",
                    code, path, error.message
                ))
                .await;
        }
        error.extensions = None;
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    fn extension_value<'a>(error: &'a Error, key: &str) -> Option<&'a Value> {
        error.extensions.as_ref().and_then(|ext| ext.get(key))
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ErrorNotifier for RecordingNotifier {
        async fn notify(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    fn server_error(error: Error) -> ServerError {
        error.into_server_error(Pos::default())
    }

    #[test]
    fn test_codes_are_attached() {
        let validation = core_error_to_graphql_error(CoreError::validation("invalid"));
        assert_eq!(
            extension_value(&validation, "code"),
            Some(&Value::from("VALIDATION_FAILED"))
        );

        let publish = core_error_to_graphql_error(CoreError::publish("rejected"));
        assert_eq!(
            extension_value(&publish, "code"),
            Some(&Value::from("PUBLISH_FAILED"))
        );
    }

    #[test]
    fn test_not_found_includes_fields() {
        let error = core_error_to_graphql_error(CoreError::not_found("ContentItem", 12));
        assert_eq!(extension_value(&error, "code"), Some(&Value::from("NOT_FOUND")));
        assert_eq!(
            extension_value(&error, "entity"),
            Some(&Value::from("ContentItem"))
        );
        assert_eq!(extension_value(&error, "id"), Some(&Value::from("12")));
    }

    #[tokio::test]
    async fn test_finalize_strips_extensions_and_skips_missing_token() {
        let notifier = RecordingNotifier::default();
        let response = Response::from_errors(vec![
            server_error(core_error_to_graphql_error(CoreError::unauthorized(
                MISSING_TOKEN_MESSAGE,
            ))),
            server_error(core_error_to_graphql_error(CoreError::forbidden("not yours"))),
        ]);

        let response = finalize_response(response, &notifier).await;

        assert!(response.errors.iter().all(|e| e.extensions.is_none()));
        let messages = notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("FORBIDDEN"));
    }
}
