use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoreErrorKind {
    NotFound,
    Forbidden,
    Unauthorized,
    Validation,
    Conflict,
    /// Upstream AI provider returned nothing usable.
    Generation,
    /// Remote CMS rejected a post or did not confirm it.
    Publish,
    ExternalService,
    Internal,
}

#[derive(Debug)]
pub struct CoreError {
    kind: CoreErrorKind,
    message: String,
    fields: Option<BTreeMap<String, String>>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl CoreError {
    pub fn new(kind: CoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: None,
            source: None,
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        let entity = entity.into();
        let id = id.to_string();
        let mut fields = BTreeMap::new();
        fields.insert("entity".to_string(), entity.clone());
        fields.insert("id".to_string(), id.clone());

        Self {
            kind: CoreErrorKind::NotFound,
            message: format!("{} {} not found", entity, id),
            fields: Some(fields),
            source: None,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Forbidden, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Unauthorized, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Validation, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Conflict, message)
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Generation, message)
    }

    pub fn publish(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Publish, message)
    }

    pub fn external(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::ExternalService, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(CoreErrorKind::Internal, message)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> CoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        self.fields.as_ref()
    }

    /// Stable machine-readable code, shared by GraphQL extensions and logs.
    pub fn code(&self) -> &'static str {
        match self.kind {
            CoreErrorKind::NotFound => "NOT_FOUND",
            CoreErrorKind::Forbidden => "FORBIDDEN",
            CoreErrorKind::Unauthorized => "UNAUTHORIZED",
            CoreErrorKind::Validation => "VALIDATION_FAILED",
            CoreErrorKind::Conflict => "CONFLICT",
            CoreErrorKind::Generation => "GENERATION_FAILED",
            CoreErrorKind::Publish => "PUBLISH_FAILED",
            CoreErrorKind::ExternalService => "SERVICE_ERROR",
            CoreErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self.kind {
            CoreErrorKind::NotFound => 404,
            CoreErrorKind::Forbidden => 403,
            CoreErrorKind::Unauthorized => 401,
            CoreErrorKind::Validation => 400,
            CoreErrorKind::Conflict => 409,
            CoreErrorKind::Generation | CoreErrorKind::Publish | CoreErrorKind::ExternalService => {
                502
            }
            CoreErrorKind::Internal => 500,
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for CoreError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<sea_orm::DbErr> for CoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        CoreError::internal(format!("Database error: {}", err)).with_source(err)
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::internal(format!("Unhandled error: {}", err))
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::internal(format!("Serialization error: {}", err)).with_source(err)
    }
}
