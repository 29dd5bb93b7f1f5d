use std::collections::HashMap;

use crate::errors::{CoreError, CoreResult};

pub const MISSING_TOKEN_MESSAGE: &str = "Missing authentication token";

/// The authenticated caller of a request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Actor {
    pub user_id: i32,
}

impl Actor {
    pub fn user(user_id: i32) -> Self {
        Self { user_id }
    }
}

/// Resolves bearer tokens to user ids. Token issuance lives outside this crate.
pub trait TokenVerifier: Send + Sync {
    fn user_id_from_token(&self, token: &str) -> CoreResult<i32>;
}

/// Fixed token table, configured through `SEO_AGENT_API_TOKENS`.
#[derive(Clone, Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, i32>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: HashMap<String, i32>) -> Self {
        Self { tokens }
    }

    /// Parse `token:userId` pairs separated by commas.
    pub fn parse(table: &str) -> CoreResult<Self> {
        let mut tokens = HashMap::new();
        for entry in table.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (token, user) = entry.rsplit_once(':').ok_or_else(|| {
                CoreError::validation(format!("Invalid token entry '{}', expected token:userId", entry))
            })?;
            let user_id = user.trim().parse::<i32>().map_err(|_| {
                CoreError::validation(format!("Invalid user id in token entry '{}'", entry))
            })?;
            tokens.insert(token.trim().to_string(), user_id);
        }
        Ok(Self { tokens })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn user_id_from_token(&self, token: &str) -> CoreResult<i32> {
        self.tokens
            .get(token)
            .copied()
            .ok_or_else(|| CoreError::unauthorized("Invalid or expired token"))
    }
}

/// Extract the bearer token from an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve an actor from an optional header value.
pub fn authenticate(verifier: &dyn TokenVerifier, header: Option<&str>) -> CoreResult<Actor> {
    let token = bearer_token(header).ok_or_else(|| CoreError::unauthorized(MISSING_TOKEN_MESSAGE))?;
    verifier.user_id_from_token(token).map(Actor::user)
}
