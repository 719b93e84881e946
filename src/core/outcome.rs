use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
}

impl TestStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One test run result as reported by a harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub title: String,
    pub status: TestStatus,
    /// Milliseconds. Harnesses sometimes omit it; it then counts as zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl TestOutcome {
    pub fn passed(title: impl Into<String>, duration: u64, timestamp: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: TestStatus::Passed,
            duration: Some(duration),
            timestamp: timestamp.into(),
            error: None,
            screenshot: None,
        }
    }

    pub fn failed(
        title: impl Into<String>,
        duration: u64,
        timestamp: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            status: TestStatus::Failed,
            duration: Some(duration),
            timestamp: timestamp.into(),
            error: Some(error.into()),
            screenshot: None,
        }
    }

    pub fn with_screenshot(mut self, path: impl Into<String>) -> Self {
        self.screenshot = Some(path.into());
        self
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration.unwrap_or(0)
    }
}
