use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a navigation request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavMode {
    /// The content region was replaced with a fetched fragment.
    Fragment,
    /// A full document load: initial load, non-dashboard target, or a
    /// fallback after the fragment path was abandoned.
    FullLoad,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadOutcome {
    pub url: String,
    pub status_code: u16,
    pub mode: NavMode,
    pub pushed_history: bool,
    pub response_time: Duration,
    pub fallback_reason: Option<String>,
}

impl LoadOutcome {
    pub fn fragment(url: String, status_code: u16) -> Self {
        Self {
            url,
            status_code,
            mode: NavMode::Fragment,
            pushed_history: false,
            response_time: Duration::from_secs(0),
            fallback_reason: None,
        }
    }

    pub fn full_load(url: String, status_code: u16) -> Self {
        Self {
            url,
            status_code,
            mode: NavMode::FullLoad,
            pushed_history: false,
            response_time: Duration::from_secs(0),
            fallback_reason: None,
        }
    }

    pub fn with_fallback_reason(mut self, reason: impl Into<String>) -> Self {
        self.fallback_reason = Some(reason.into());
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}
