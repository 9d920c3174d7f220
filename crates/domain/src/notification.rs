//! Notification — a human-readable alert handed to a notification sink.

use serde::{Deserialize, Serialize};

/// Urgency of a notification, ordered from least to most urgent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Moderate,
    High,
    Emergency,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Emergency => "emergency",
        })
    }
}

/// A message for a human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub title: String,
    pub priority: Priority,
}

impl Notification {
    /// Create a notification.
    #[must_use]
    pub fn new(message: impl Into<String>, title: impl Into<String>, priority: Priority) -> Self {
        Self {
            message: message.into(),
            title: title.into(),
            priority,
        }
    }
}
