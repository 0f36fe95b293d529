//! # kisync-core
//!
//! Pure, in-memory building blocks of the known-issue reconciler.
//!
//! - [`topology`]: a project family's declared sub-projects and environments,
//!   with the slug and architecture lookups derived from them
//! - [`known_issue`]: raw known-issue declarations and their normalized form,
//!   validated against a topology
//! - [`skiplist`]: conversion of skiplist entries into project declarations
//! - [`errors`]: validation and topology error types
//!
//! Nothing in this crate talks to the network.

pub mod errors;
pub mod known_issue;
pub mod skiplist;
pub mod topology;

pub use errors::{KnownIssueError, TopologyError};
pub use known_issue::{EnvironmentSelector, KnownIssue, KnownIssueDeclaration, Validation};
pub use topology::{EnvironmentDeclaration, ProjectDeclaration, ProjectTopology};
