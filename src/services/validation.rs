use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{CoreError, CoreResult};

static KEYWORD_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,\n;]+").expect("Invalid regex pattern for keyword splitting"));

/// Input validation and normalisation shared by the services.
pub struct ValidationService;

impl ValidationService {
    pub fn validate_title(title: &str) -> CoreResult<String> {
        let trimmed = title.trim();

        if trimmed.is_empty() {
            return Err(CoreError::validation("Title cannot be empty").with_field("field", "title"));
        }

        if trimmed.chars().count() > 300 {
            return Err(
                CoreError::validation("Title is too long (max 300 characters)")
                    .with_field("field", "title"),
            );
        }

        Ok(trimmed.to_string())
    }

    /// Empty descriptions collapse to `None`.
    pub fn validate_description(description: Option<&str>) -> CoreResult<Option<String>> {
        let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) else {
            return Ok(None);
        };

        if description.chars().count() > 10_000 {
            return Err(
                CoreError::validation("Description is too long (max 10000 characters)")
                    .with_field("field", "description"),
            );
        }

        Ok(Some(description.to_string()))
    }

    pub fn validate_weekly_cadence(cadence: i32) -> CoreResult<i32> {
        if !(1..=7).contains(&cadence) {
            return Err(CoreError::validation(format!(
                "Weekly cadence must be between 1 and 7, got {}",
                cadence
            ))
            .with_field("field", "weeklyCadence"));
        }
        Ok(cadence)
    }

    /// Weekday indices, 0 = Sunday. Returned sorted and deduplicated.
    pub fn validate_publish_days(days: &[i32]) -> CoreResult<Vec<u8>> {
        let mut result = Vec::with_capacity(days.len());
        for &day in days {
            if !(0..=6).contains(&day) {
                return Err(CoreError::validation(format!(
                    "Publish day must be between 0 and 6, got {}",
                    day
                ))
                .with_field("field", "publishDays"));
            }
            result.push(day as u8);
        }
        result.sort_unstable();
        result.dedup();
        Ok(result)
    }

    pub fn validate_base_url(raw: &str) -> CoreResult<String> {
        let trimmed = raw.trim().trim_end_matches('/');
        let parsed = url::Url::parse(trimmed).map_err(|e| {
            CoreError::validation(format!("Invalid URL '{}': {}", raw, e))
                .with_field("field", "wordpressBaseUrl")
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CoreError::validation(format!(
                "URL must use http or https, got '{}'",
                parsed.scheme()
            ))
            .with_field("field", "wordpressBaseUrl"));
        }

        Ok(trimmed.to_string())
    }

    /// Keywords keep their order; duplicates are allowed, blanks are dropped.
    pub fn normalize_keywords(keywords: &[String]) -> Vec<String> {
        keywords
            .iter()
            .flat_map(|k| KEYWORD_SPLIT.split(k))
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate_idea_count(count: i32) -> CoreResult<usize> {
        if !(1..=20).contains(&count) {
            return Err(CoreError::validation(format!(
                "Idea count must be between 1 and 20, got {}",
                count
            )));
        }
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        assert_eq!(ValidationService::validate_title("  Hello ").unwrap(), "Hello");
        assert!(ValidationService::validate_title("   ").is_err());
        assert!(ValidationService::validate_title(&"x".repeat(301)).is_err());
    }

    #[test]
    fn test_cadence_bounds() {
        assert!(ValidationService::validate_weekly_cadence(0).is_err());
        assert!(ValidationService::validate_weekly_cadence(8).is_err());
        assert_eq!(ValidationService::validate_weekly_cadence(7).unwrap(), 7);
    }

    #[test]
    fn test_publish_days() {
        assert_eq!(
            ValidationService::validate_publish_days(&[5, 1, 1, 3]).unwrap(),
            vec![1, 3, 5]
        );
        assert!(ValidationService::validate_publish_days(&[7]).is_err());
        assert!(ValidationService::validate_publish_days(&[-1]).is_err());
    }

    #[test]
    fn test_base_url() {
        assert_eq!(
            ValidationService::validate_base_url("https://blog.example.com/").unwrap(),
            "https://blog.example.com"
        );
        assert!(ValidationService::validate_base_url("blog.example.com").is_err());
        assert!(ValidationService::validate_base_url("ftp://blog.example.com").is_err());
    }

    #[test]
    fn test_keywords_keep_order_and_duplicates() {
        let keywords = vec![
            "crm, sales crm".to_string(),
            " ".to_string(),
            "crm".to_string(),
        ];
        assert_eq!(
            ValidationService::normalize_keywords(&keywords),
            vec!["crm", "sales crm", "crm"]
        );
    }
}
