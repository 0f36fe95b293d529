//! # kisync-reconcile
//!
//! Brings the remote known-issue records in line with the declared ones.
//!
//! Per known issue: look up the existing record by `(title, test_name)`,
//! resolve the target sub-projects' remote environments, keep those whose
//! slug was selected, build the payload and create or update, unless the
//! run is a dry run, in which case the decision is reported instead.

mod catalog;
mod driver;
mod error;
mod options;
mod payload;
mod report;

pub use catalog::RemoteCatalog;
pub use driver::Reconciler;
pub use error::SyncError;
pub use options::SyncOptions;
pub use payload::KnownIssuePayload;
pub use report::{Action, AppliedIssue, FailedIssue, Outcome, SyncDecision, SyncReport};
