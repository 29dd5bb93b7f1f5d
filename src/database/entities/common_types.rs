//! String-backed enums stored in entity columns.
//!
//! Columns hold the lowercase `as_str` form. Parsing is exhaustive: an
//! unrecognised value is a validation error rather than a pass-through.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($variant:ident => $value:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "graphql", derive(async_graphql::Enum))]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($value $(| $alias)* => Ok($name::$variant),)+
                    other => Err(CoreError::validation(format!(
                        "Invalid {}: '{}'",
                        $label, other
                    ))),
                }
            }
        }
    };
}

string_enum! {
    /// Lifecycle of a backlog idea.
    BacklogStatus, "backlog status" {
        Pending => "pending",
        Scheduled => "scheduled",
        InProgress => "in_progress" | "in-progress" | "inprogress",
        Completed => "completed",
        Archived => "archived",
    }
}

impl BacklogStatus {
    /// Statuses that must carry a scheduled date, and only these.
    pub fn requires_scheduled_date(&self) -> bool {
        matches!(
            self,
            BacklogStatus::Scheduled | BacklogStatus::InProgress | BacklogStatus::Completed
        )
    }

    /// Sprint view membership, i.e. everything that left the backlog.
    pub fn is_in_sprint(&self) -> bool {
        self.requires_scheduled_date()
    }

    /// Moves a caller may request. Scheduled to in-progress is absent: only a
    /// confirmed publish makes that move.
    pub fn can_transition_to(&self, next: BacklogStatus) -> bool {
        use BacklogStatus::*;
        match (self, next) {
            (from, to) if *from == to => true,
            (_, Archived) => true,
            (Pending, Scheduled) => true,
            (Scheduled, Pending) | (InProgress, Pending) => true,
            (InProgress, Completed) => true,
            (Archived, Pending) => true,
            _ => false,
        }
    }
}

string_enum! {
    /// Editorial angle of an idea.
    BacklogCategory, "backlog category" {
        Pain => "pain",
        Goal => "goal",
        Trigger => "trigger",
        Feature => "feature",
        Benefit => "benefit",
        Faq => "faq",
        Info => "info",
    }
}

string_enum! {
    ContentFormat, "content format" {
        Article => "article" | "blog",
        CommercialPage => "commercial_page" | "commercial" | "landing",
    }
}

string_enum! {
    ContentStatus, "content status" {
        Draft => "draft",
        Ready => "ready",
        Published => "published",
    }
}

string_enum! {
    /// Progress of the background image job attached to a content item.
    ImageStatus, "image status" {
        NoImage => "none",
        Pending => "pending",
        Ready => "ready",
        Failed => "failed",
    }
}

string_enum! {
    ClusterIntent, "cluster intent" {
        Commercial => "commercial",
        Transactional => "transactional",
        Informational => "informational",
        Navigational => "navigational",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_exhaustive() {
        assert_eq!(
            "IN_PROGRESS".parse::<BacklogStatus>().unwrap(),
            BacklogStatus::InProgress
        );
        let err = "done".parse::<BacklogStatus>().unwrap_err();
        assert!(err.message().contains("backlog status"));
    }

    #[test]
    fn test_scheduled_date_requirement() {
        assert!(!BacklogStatus::Pending.requires_scheduled_date());
        assert!(BacklogStatus::Scheduled.requires_scheduled_date());
        assert!(BacklogStatus::InProgress.requires_scheduled_date());
        assert!(BacklogStatus::Completed.requires_scheduled_date());
        assert!(!BacklogStatus::Archived.requires_scheduled_date());
    }

    #[test]
    fn test_transitions() {
        use BacklogStatus::*;
        assert!(Pending.can_transition_to(Scheduled));
        assert!(!Scheduled.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Pending));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Completed.can_transition_to(Archived));
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Scheduled));
    }

    #[test]
    fn test_unknown_intent_is_rejected() {
        assert!("commercial".parse::<ClusterIntent>().is_ok());
        assert!("viral".parse::<ClusterIntent>().is_err());
        assert_eq!(ContentFormat::CommercialPage.as_str(), "commercial_page");
    }
}
