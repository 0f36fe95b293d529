//! Validation error types.
//!
//! Errors raised while building a topology or normalizing a known issue.
//! Remote and configuration failures live in their own crates; the
//! reconciliation driver decides which of these abort the run.

use thiserror::Error;

/// A project declaration cannot be turned into a topology.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    /// The project has no remote URL, so nothing about it is usable.
    #[error("project '{name}' has no url")]
    MissingUrl { name: String },
}

/// A single known-issue declaration failed validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KnownIssueError {
    /// The declaration has no `test_name`.
    #[error("known issue has no test_name")]
    MissingTestName,

    /// A target sub-project is not a member of the topology.
    #[error("project not defined: {0}")]
    UnknownProject(String),

    /// An environment selector names a slug the topology does not declare.
    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),

    /// An environment selector names an architecture no environment has.
    #[error("unknown architecture: {0}")]
    UnknownArchitecture(String),

    /// An environment selector carries neither a slug nor an architecture.
    #[error("environment selector has neither slug nor architecture")]
    EmptySelector,

    /// A sub-project name is not in `group/slug` form.
    #[error("project name '{0}' is not in group/slug form")]
    MalformedProjectName(String),

    /// A skiplist field holds a value of the wrong shape.
    #[error("invalid skiplist {field}: {reason}")]
    InvalidSkiplist { field: &'static str, reason: String },
}

/// Split a qualified sub-project name into `(group, slug)`.
///
/// Only the first `/` separates; the slug may contain further slashes.
///
/// # Errors
///
/// Returns [`KnownIssueError::MalformedProjectName`] when `name` has no `/`
/// or either half is empty.
pub fn split_project_name(name: &str) -> Result<(&str, &str), KnownIssueError> {
    match name.split_once('/') {
        Some((group, slug)) if !group.is_empty() && !slug.is_empty() => Ok((group, slug)),
        _ => Err(KnownIssueError::MalformedProjectName(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_slash() {
        assert_eq!(
            split_project_name("lkft/linux-next-oe").unwrap(),
            ("lkft", "linux-next-oe")
        );
        assert_eq!(split_project_name("a/b/c").unwrap(), ("a", "b/c"));
    }

    #[test]
    fn rejects_unqualified_names() {
        for name in ["linux-next-oe", "/slug", "group/", ""] {
            assert_eq!(
                split_project_name(name),
                Err(KnownIssueError::MalformedProjectName(name.to_string()))
            );
        }
    }

    #[test]
    fn error_messages_name_the_culprit() {
        assert_eq!(
            KnownIssueError::UnknownArchitecture("riscv".into()).to_string(),
            "unknown architecture: riscv"
        );
        assert_eq!(
            TopologyError::MissingUrl { name: "LKFT".into() }.to_string(),
            "project 'LKFT' has no url"
        );
    }
}
