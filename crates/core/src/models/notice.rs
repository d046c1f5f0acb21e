use serde::{Deserialize, Serialize};

/// Severity of a notice; maps onto the page's alert styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    /// Bootstrap contextual class for the alert element.
    pub fn css_class(self) -> &'static str {
        match self {
            NoticeLevel::Info => "alert-info",
            NoticeLevel::Success => "alert-success",
            NoticeLevel::Warning => "alert-warning",
            NoticeLevel::Error => "alert-danger",
        }
    }
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Success => write!(f, "success"),
            NoticeLevel::Warning => write!(f, "warning"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// How long an alert stays up and how long it takes to slide away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DismissTiming {
    /// Time fully visible, in milliseconds.
    pub delay_ms: u64,
    /// Duration of the closing animation, in milliseconds.
    pub slide_ms: u64,
}

impl DismissTiming {
    /// Milliseconds from posting until the alert is gone.
    pub fn total_ms(&self) -> u64 {
        self.delay_ms.saturating_add(self.slide_ms)
    }
}

impl Default for DismissTiming {
    fn default() -> Self {
        Self {
            delay_ms: 2000,
            slide_ms: 500,
        }
    }
}

/// A transient, self-dismissing message banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub timing: DismissTiming,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>, timing: DismissTiming) -> Self {
        Self {
            level,
            message: message.into(),
            timing,
        }
    }

    pub fn error(message: impl Into<String>, timing: DismissTiming) -> Self {
        Self::new(NoticeLevel::Error, message, timing)
    }
}
