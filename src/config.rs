use std::{collections::HashMap, path::Path, str::FromStr, time::Duration};

use crate::errors::{CoreError, CoreResult};

/// Image-generation backends selectable through `SEO_AGENT_IMAGE_PROVIDER`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ImageProviderKind {
    Gemini,
    OpenAi,
}

impl ImageProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageProviderKind::Gemini => "gemini",
            ImageProviderKind::OpenAi => "openai",
        }
    }
}

impl FromStr for ImageProviderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(ImageProviderKind::Gemini),
            "openai" | "open_ai" | "open-ai" => Ok(ImageProviderKind::OpenAi),
            other => Err(CoreError::validation(format!(
                "Unknown image provider '{}'",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChatSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub fallback_model: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct ImageSettings {
    pub provider: ImageProviderKind,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub openai_model: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

#[derive(Clone, Debug)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
}

/// Application configuration assembled from a YAML file and the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: String,
    pub port: u16,
    pub cors_origin: Option<String>,
    pub public_url: String,
    pub storage_root: String,
    pub api_tokens: String,
    pub chat: ChatSettings,
    pub image: ImageSettings,
    pub telegram: Option<TelegramSettings>,
}

impl AppConfig {
    /// Keys read from the environment, with their defaults.
    pub fn tracked_keys() -> &'static [(&'static str, &'static str)] {
        &[
            ("SEO_AGENT_DATABASE", "seo-agent.db"),
            ("SEO_AGENT_PORT", "3000"),
            ("SEO_AGENT_CORS_ORIGIN", ""),
            ("SEO_AGENT_PUBLIC_URL", "http://localhost:3000"),
            ("SEO_AGENT_STORAGE_ROOT", "./storage"),
            ("SEO_AGENT_API_TOKENS", ""),
            ("OPENAI_API_KEY", ""),
            ("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            ("SEO_AGENT_OPENAI_MODEL", "gpt-4o"),
            ("SEO_AGENT_OPENAI_FALLBACK_MODEL", "gpt-4o-mini"),
            ("SEO_AGENT_CHAT_TIMEOUT_SECS", "120"),
            ("SEO_AGENT_IMAGE_PROVIDER", "gemini"),
            ("GEMINI_API_KEY", ""),
            (
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            (
                "SEO_AGENT_GEMINI_IMAGE_MODEL",
                "gemini-2.0-flash-preview-image-generation",
            ),
            ("SEO_AGENT_OPENAI_IMAGE_MODEL", "gpt-image-1"),
            ("SEO_AGENT_IMAGE_TIMEOUT_SECS", "30"),
            ("SEO_AGENT_IMAGE_MAX_ATTEMPTS", "3"),
            ("SEO_AGENT_IMAGE_RETRY_DELAY_SECS", "5"),
            ("TELEGRAM_BOT_TOKEN", ""),
            ("TELEGRAM_CHAT_ID", ""),
        ]
    }

    pub fn from_env() -> CoreResult<Self> {
        Self::load(None)
    }

    /// Load from an optional flat YAML mapping, then let the environment override it.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut values = match path {
            Some(path) => read_yaml_map(path)?,
            None => HashMap::new(),
        };
        for (key, _) in Self::tracked_keys() {
            if let Ok(value) = std::env::var(key) {
                values.insert(key.to_string(), value);
            }
        }
        Self::from_map(&values)
    }

    pub fn from_map(values: &HashMap<String, String>) -> CoreResult<Self> {
        fn read(values: &HashMap<String, String>, key: &str) -> String {
            values
                .get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .or_else(|| {
                    AppConfig::tracked_keys()
                        .iter()
                        .find(|(k, _)| *k == key)
                        .map(|(_, default)| default.to_string())
                })
                .unwrap_or_default()
        }

        fn optional(values: &HashMap<String, String>, key: &str) -> Option<String> {
            Some(read(values, key)).filter(|value| !value.is_empty())
        }

        fn number<T: FromStr>(values: &HashMap<String, String>, key: &str) -> CoreResult<T> {
            let raw = read(values, key);
            raw.parse::<T>().map_err(|_| {
                CoreError::validation(format!("Invalid numeric value '{}' for {}", raw, key))
            })
        }

        let max_attempts: u32 = number(values, "SEO_AGENT_IMAGE_MAX_ATTEMPTS")?;
        if max_attempts == 0 {
            return Err(CoreError::validation(
                "SEO_AGENT_IMAGE_MAX_ATTEMPTS must be at least 1",
            ));
        }

        let telegram = match (
            optional(values, "TELEGRAM_BOT_TOKEN"),
            optional(values, "TELEGRAM_CHAT_ID"),
        ) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramSettings { bot_token, chat_id }),
            _ => None,
        };

        Ok(Self {
            database: read(values, "SEO_AGENT_DATABASE"),
            port: number(values, "SEO_AGENT_PORT")?,
            cors_origin: optional(values, "SEO_AGENT_CORS_ORIGIN"),
            public_url: read(values, "SEO_AGENT_PUBLIC_URL")
                .trim_end_matches('/')
                .to_string(),
            storage_root: read(values, "SEO_AGENT_STORAGE_ROOT"),
            api_tokens: read(values, "SEO_AGENT_API_TOKENS"),
            chat: ChatSettings {
                api_key: optional(values, "OPENAI_API_KEY"),
                base_url: read(values, "OPENAI_BASE_URL")
                    .trim_end_matches('/')
                    .to_string(),
                model: read(values, "SEO_AGENT_OPENAI_MODEL"),
                fallback_model: read(values, "SEO_AGENT_OPENAI_FALLBACK_MODEL"),
                timeout: Duration::from_secs(number(values, "SEO_AGENT_CHAT_TIMEOUT_SECS")?),
            },
            image: ImageSettings {
                provider: read(values, "SEO_AGENT_IMAGE_PROVIDER").parse()?,
                gemini_api_key: optional(values, "GEMINI_API_KEY"),
                gemini_base_url: read(values, "GEMINI_BASE_URL")
                    .trim_end_matches('/')
                    .to_string(),
                gemini_model: read(values, "SEO_AGENT_GEMINI_IMAGE_MODEL"),
                openai_model: read(values, "SEO_AGENT_OPENAI_IMAGE_MODEL"),
                timeout: Duration::from_secs(number(values, "SEO_AGENT_IMAGE_TIMEOUT_SECS")?),
                max_attempts,
                retry_delay: Duration::from_secs(number(
                    values,
                    "SEO_AGENT_IMAGE_RETRY_DELAY_SECS",
                )?),
            },
            telegram,
        })
    }
}

fn read_yaml_map(path: &Path) -> CoreResult<HashMap<String, String>> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CoreError::validation(format!("Failed to read config {}: {}", path.display(), e))
    })?;
    let parsed: HashMap<String, serde_yaml::Value> = serde_yaml::from_str(&raw).map_err(|e| {
        CoreError::validation(format!("Invalid config {}: {}", path.display(), e))
    })?;

    let mut values = HashMap::new();
    for (key, value) in parsed {
        let value = match value {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            serde_yaml::Value::Null => String::new(),
            _ => {
                return Err(CoreError::validation(format!(
                    "Config key {} must be a scalar value",
                    key
                )))
            }
        };
        values.insert(key, value);
    }
    Ok(values)
}
