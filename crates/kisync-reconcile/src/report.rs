//! Per-issue outcomes and the run summary.

use kisync_core::KnownIssue;
use kisync_remote::RemoteEnvironment;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
}

/// What a reconciliation would do, reported instead of applied in dry-run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncDecision {
    pub title: String,
    pub test_name: String,
    pub action: Action,
    pub projects: Vec<String>,
    pub environment_slugs: Vec<String>,
    /// Remote environment URLs the issue would be attached to.
    pub environments: Vec<String>,
}

impl SyncDecision {
    #[must_use]
    pub fn new(issue: &KnownIssue, action: Action, environments: &[RemoteEnvironment]) -> Self {
        Self {
            title: issue.title().to_string(),
            test_name: issue.test_name().to_string(),
            action,
            projects: issue.target_projects().iter().cloned().collect(),
            environment_slugs: issue.target_environment_slugs().iter().cloned().collect(),
            environments: environments.iter().map(|env| env.url.clone()).collect(),
        }
    }
}

/// Terminal state of one successfully processed known issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied(Action),
    DryRun(SyncDecision),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedIssue {
    pub title: String,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedIssue {
    /// Title when known, else the declared test name.
    pub subject: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub applied: Vec<AppliedIssue>,
    pub skipped: Vec<SyncDecision>,
    pub failed: Vec<FailedIssue>,
}

impl SyncReport {
    pub fn merge(&mut self, other: Self) {
        self.applied.extend(other.applied);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn log_summary(&self, scope: &str) {
        tracing::info!(
            scope,
            applied = self.applied.len(),
            skipped = self.skipped.len(),
            failed = self.failed.len(),
            "sync summary"
        );
    }
}
