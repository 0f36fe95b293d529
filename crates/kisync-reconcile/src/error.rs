//! Reconciliation error types.

use kisync_core::KnownIssueError;
use kisync_remote::RemoteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote API failed or answered ambiguously.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A known issue could not be resolved; affects only that issue.
    #[error(transparent)]
    Validation(#[from] KnownIssueError),

    /// A known issue failed validation while strict mode was on.
    #[error("strict validation failed for {subject}: {source}")]
    StrictValidation {
        subject: String,
        #[source]
        source: KnownIssueError,
    },

    /// A declared sub-project does not exist on the remote instance.
    #[error("project {project} doesn't exist in the instance {instance}")]
    SanityCheck { project: String, instance: String },
}

impl SyncError {
    /// Whether this error ends the whole run rather than one known issue.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::StrictValidation { .. } | Self::SanityCheck { .. })
    }
}
