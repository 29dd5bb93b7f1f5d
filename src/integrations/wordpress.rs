//! WordPress REST API client (`/wp-json/wp/v2`) using application passwords.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::errors::CoreError;

const PAGE_SIZE: usize = 100;
const MAX_PAGES: u32 = 50;

#[derive(Debug, Error)]
pub enum WordPressError {
    #[error("WordPress request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("WordPress rejected the credentials (401): {0}. Check the username and application password")]
    Unauthorized(String),

    #[error("WordPress denied access (403): {0}. The user may lack the publish capability")]
    Forbidden(String),

    #[error("WordPress endpoint not found (404): {0}. Check the base URL and that the REST API is enabled")]
    NotFound(String),

    #[error("WordPress API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("WordPress did not confirm the post: {0}")]
    Unconfirmed(String),

    #[error("Invalid WordPress base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl From<WordPressError> for CoreError {
    fn from(err: WordPressError) -> Self {
        match err {
            WordPressError::InvalidBaseUrl(_) => CoreError::validation(err.to_string()),
            other => CoreError::publish(other.to_string()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct WordPressCredentials {
    pub base_url: String,
    pub username: String,
    pub app_password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct WordPressPost {
    pub title: String,
    pub content: String,
    /// `publish`, `draft` or `future`.
    pub status: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_gmt: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishConfirmation {
    pub post_id: i64,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct WordPressTerm {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordPressPostType {
    pub slug: String,
    pub name: String,
    pub rest_base: String,
    pub taxonomies: Vec<String>,
}

#[derive(Deserialize)]
struct RawPostType {
    #[serde(default)]
    name: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    rest_base: Option<String>,
    #[serde(default)]
    taxonomies: Vec<String>,
}

impl RawPostType {
    fn into_post_type(self, key: &str) -> WordPressPostType {
        let slug = if self.slug.is_empty() {
            key.to_string()
        } else {
            self.slug
        };
        WordPressPostType {
            rest_base: self
                .rest_base
                .filter(|base| !base.is_empty())
                .unwrap_or_else(|| slug.clone()),
            name: self.name,
            slug,
            taxonomies: self.taxonomies,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TaxonomyKind {
    Category,
    Tag,
}

impl TaxonomyKind {
    fn default_endpoint(&self) -> &'static str {
        match self {
            TaxonomyKind::Category => "categories",
            TaxonomyKind::Tag => "tags",
        }
    }

    fn builtin_slug(&self) -> &'static str {
        match self {
            TaxonomyKind::Category => "category",
            TaxonomyKind::Tag => "post_tag",
        }
    }

    fn matches(&self, taxonomy: &str) -> bool {
        let lower = taxonomy.to_lowercase();
        match self {
            TaxonomyKind::Category => lower.contains("cat"),
            TaxonomyKind::Tag => lower.contains("tag"),
        }
    }
}

/// Accept a publish response only when it carries a numeric id and a link.
pub fn confirm_publication(body: &Value) -> Result<PublishConfirmation, WordPressError> {
    let post_id = body
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| WordPressError::Unconfirmed("response has no numeric id".to_string()))?;
    let url = body
        .get("link")
        .and_then(Value::as_str)
        .filter(|link| !link.trim().is_empty())
        .ok_or_else(|| WordPressError::Unconfirmed("response has no post link".to_string()))?;
    Ok(PublishConfirmation {
        post_id,
        url: url.to_string(),
    })
}

#[derive(Clone)]
pub struct WordPressClient {
    http: Client,
    api_root: String,
    username: String,
    app_password: String,
}

impl WordPressClient {
    pub fn new(credentials: &WordPressCredentials, timeout: Duration) -> Result<Self, WordPressError> {
        let base = credentials.base_url.trim().trim_end_matches('/');
        let parsed = url::Url::parse(base)
            .map_err(|_| WordPressError::InvalidBaseUrl(credentials.base_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(WordPressError::InvalidBaseUrl(credentials.base_url.clone()));
        }

        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            api_root: format!("{}/wp-json/wp/v2", base),
            username: credentials.username.clone(),
            app_password: credentials.app_password.clone(),
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}/{}", self.api_root, path))
            .basic_auth(&self.username, Some(&self.app_password))
    }

    /// Verify credentials; returns the authenticated user's display name.
    pub async fn test_connection(&self) -> Result<String, WordPressError> {
        let response = self
            .get("users/me")
            .query(&[("context", "edit")])
            .send()
            .await?;
        let body = Self::checked_json(response).await?;
        Ok(body
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(&self.username)
            .to_string())
    }

    /// Create a post, or update `existing_id` in place.
    pub async fn publish(
        &self,
        post_type: &str,
        existing_id: Option<i64>,
        post: &WordPressPost,
    ) -> Result<PublishConfirmation, WordPressError> {
        let rest_base = self.resolve_rest_base(post_type).await?;
        let url = match existing_id {
            Some(id) => format!("{}/{}/{}", self.api_root, rest_base, id),
            None => format!("{}/{}", self.api_root, rest_base),
        };

        info!(
            "Publishing to WordPress: post_type={}, existing_id={:?}, status={}",
            post_type, existing_id, post.status
        );
        let response = self
            .http
            .post(url)
            .basic_auth(&self.username, Some(&self.app_password))
            .json(post)
            .send()
            .await?;
        let body = Self::checked_json(response).await?;
        confirm_publication(&body)
    }

    pub async fn get_post_types(&self) -> Result<Vec<WordPressPostType>, WordPressError> {
        let response = self.get("types").send().await?;
        let body = Self::checked_json(response).await?;
        let map: std::collections::BTreeMap<String, RawPostType> = serde_json::from_value(body)
            .map_err(|e| WordPressError::Api {
                status: 200,
                message: format!("unexpected post types payload: {}", e),
            })?;
        Ok(map
            .into_iter()
            .map(|(key, raw)| raw.into_post_type(&key))
            .collect())
    }

    pub async fn get_categories(&self, post_type: &str) -> Result<Vec<WordPressTerm>, WordPressError> {
        self.terms_for(post_type, TaxonomyKind::Category).await
    }

    pub async fn get_tags(&self, post_type: &str) -> Result<Vec<WordPressTerm>, WordPressError> {
        self.terms_for(post_type, TaxonomyKind::Tag).await
    }

    async fn terms_for(
        &self,
        post_type: &str,
        kind: TaxonomyKind,
    ) -> Result<Vec<WordPressTerm>, WordPressError> {
        let endpoint = self.resolve_taxonomy_endpoint(post_type, kind).await?;
        if endpoint == kind.default_endpoint() {
            return self.fetch_all_terms(&endpoint).await;
        }
        match self.fetch_all_terms(&endpoint).await {
            Err(WordPressError::NotFound(_)) => {
                warn!(
                    "Taxonomy endpoint {} missing for post type {}, using {}",
                    endpoint,
                    post_type,
                    kind.default_endpoint()
                );
                self.fetch_all_terms(kind.default_endpoint()).await
            }
            other => other,
        }
    }

    async fn resolve_rest_base(&self, post_type: &str) -> Result<String, WordPressError> {
        match post_type {
            "" | "post" => return Ok("posts".to_string()),
            "page" => return Ok("pages".to_string()),
            _ => {}
        }
        match self.fetch_post_type(post_type).await? {
            Some(found) => Ok(found.rest_base),
            None => Ok(post_type.to_string()),
        }
    }

    async fn fetch_post_type(&self, post_type: &str) -> Result<Option<WordPressPostType>, WordPressError> {
        let response = self.get(&format!("types/{}", post_type)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = Self::checked_json(response).await?;
        let raw: RawPostType = serde_json::from_value(body).map_err(|e| WordPressError::Api {
            status: 200,
            message: format!("unexpected post type payload: {}", e),
        })?;
        Ok(Some(raw.into_post_type(post_type)))
    }

    async fn resolve_taxonomy_endpoint(
        &self,
        post_type: &str,
        kind: TaxonomyKind,
    ) -> Result<String, WordPressError> {
        if matches!(post_type, "" | "post") {
            return Ok(kind.default_endpoint().to_string());
        }
        let Some(found) = self.fetch_post_type(post_type).await? else {
            return Ok(kind.default_endpoint().to_string());
        };

        let taxonomy = found
            .taxonomies
            .iter()
            .find(|t| t.as_str() == kind.builtin_slug())
            .or_else(|| found.taxonomies.iter().find(|t| kind.matches(t)));
        let Some(taxonomy) = taxonomy else {
            return Ok(kind.default_endpoint().to_string());
        };
        if taxonomy == kind.builtin_slug() {
            return Ok(kind.default_endpoint().to_string());
        }

        let response = self.get(&format!("taxonomies/{}", taxonomy)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(taxonomy.clone());
        }
        let body = Self::checked_json(response).await?;
        Ok(body
            .get("rest_base")
            .and_then(Value::as_str)
            .filter(|base| !base.is_empty())
            .unwrap_or(taxonomy)
            .to_string())
    }

    async fn fetch_all_terms(&self, endpoint: &str) -> Result<Vec<WordPressTerm>, WordPressError> {
        let mut terms = Vec::new();
        let mut page = 1u32;
        loop {
            let response = self
                .get(endpoint)
                .query(&[("per_page", PAGE_SIZE.to_string()), ("page", page.to_string())])
                .send()
                .await?;

            // WordPress answers 400 rest_post_invalid_page_number past the last page.
            if page > 1 && response.status() == StatusCode::BAD_REQUEST {
                break;
            }

            let total_pages = response
                .headers()
                .get("x-wp-totalpages")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u32>().ok());
            let body = Self::checked_json(response).await?;
            let batch: Vec<WordPressTerm> =
                serde_json::from_value(body).map_err(|e| WordPressError::Api {
                    status: 200,
                    message: format!("unexpected terms payload: {}", e),
                })?;
            let batch_len = batch.len();
            terms.extend(batch);

            let done = match total_pages {
                Some(total) => page >= total,
                None => batch_len < PAGE_SIZE,
            };
            if done || page >= MAX_PAGES {
                break;
            }
            page += 1;
        }
        debug!("Fetched {} terms from {}", terms.len(), endpoint);
        Ok(terms)
    }

    async fn checked_json(response: Response) -> Result<Value, WordPressError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Value>().await?);
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&raw)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(raw);
        Err(match status {
            StatusCode::UNAUTHORIZED => WordPressError::Unauthorized(message),
            StatusCode::FORBIDDEN => WordPressError::Forbidden(message),
            StatusCode::NOT_FOUND => WordPressError::NotFound(message),
            _ => WordPressError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_confirmation_requires_id_and_link() {
        let ok = confirm_publication(&json!({"id": 12, "link": "https://blog.example.com/?p=12"}))
            .unwrap();
        assert_eq!(ok.post_id, 12);

        assert!(confirm_publication(&json!({"id": "12", "link": "x"})).is_err());
        assert!(confirm_publication(&json!({"id": 12, "link": ""})).is_err());
        assert!(confirm_publication(&json!({"link": "https://blog.example.com"})).is_err());
    }

    #[test]
    fn test_base_url_must_be_http() {
        let creds = |base: &str| WordPressCredentials {
            base_url: base.to_string(),
            username: "u".to_string(),
            app_password: "p".to_string(),
        };
        assert!(WordPressClient::new(&creds("https://blog.example.com/"), Duration::from_secs(1)).is_ok());
        assert!(WordPressClient::new(&creds("ftp://blog.example.com"), Duration::from_secs(1)).is_err());
        assert!(WordPressClient::new(&creds("not a url"), Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_error_hints() {
        let err = WordPressError::Unauthorized("Sorry, you are not allowed".to_string());
        assert!(err.to_string().contains("application password"));
        let core: CoreError = err.into();
        assert_eq!(core.code(), "PUBLISH_FAILED");
    }
}
