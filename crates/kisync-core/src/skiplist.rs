//! Conversion of LKFT skiplist entries into project declarations.
//!
//! A skiplist entry names tests, boards and kernel branches. Branches map to
//! sub-projects through a fixed table and the entry's `environments` field
//! picks the deployment(s) it belongs to: `all` means both the production
//! and the staging instance. That is deployment selection, not environment
//! slug selection; boards become explicit slug selectors.

use serde::{Deserialize, Serialize};

use crate::errors::KnownIssueError;
use crate::known_issue::{EnvironmentSelector, KnownIssueDeclaration};
use crate::topology::{EnvironmentDeclaration, ProjectDeclaration};

/// Kernel branch key to LKFT sub-project.
pub const BRANCH_PROJECTS: &[(&str, &str)] = &[
    ("4.4", "lkft/linux-stable-rc-4.4-oe"),
    ("4.9", "lkft/linux-stable-rc-4.9-oe"),
    ("4.14", "lkft/linux-stable-rc-4.14-oe"),
    ("4.15", "lkft/linux-stable-rc-4.15-oe"),
    ("4.16", "lkft/linux-stable-rc-4.16-oe"),
    ("4.17", "lkft/linux-stable-rc-4.17-oe"),
    ("mainline", "lkft/linux-mainline-oe"),
    ("next", "lkft/linux-next-oe"),
];

/// Board slug and architecture, shared by both deployments.
pub const BOARDS: &[(&str, &str)] = &[
    ("hi6220-hikey", "arm64"),
    ("juno-r2", "arm64"),
    ("dragonboard-410c", "arm64"),
    ("x15", "arm32"),
    ("x86", "x86_64"),
    ("qemu_x86_64", "x86_64"),
    ("qemu_x86_32", "x86"),
    ("qemu_arm", "arm32"),
    ("qemu_arm64", "arm64"),
];

const ALL: &str = "all";

/// A remote instance converted skiplists are written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    Production,
    Staging,
}

impl Deployment {
    #[must_use]
    pub const fn project_name(self) -> &'static str {
        match self {
            Self::Production => "LKFT",
            Self::Staging => "LKFT-staging",
        }
    }

    #[must_use]
    pub const fn url(self) -> &'static str {
        match self {
            Self::Production => "https://qa-reports.linaro.org",
            Self::Staging => "https://staging-qa-reports.linaro.org",
        }
    }

    /// Suffix used for the converted document's file name.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Staging => "staging",
        }
    }

    /// Empty project declaration for this deployment's catalog.
    #[must_use]
    pub fn catalog_project(self) -> ProjectDeclaration {
        ProjectDeclaration {
            name: self.project_name().to_string(),
            url: Some(self.url().to_string()),
            projects: BRANCH_PROJECTS
                .iter()
                .map(|(_, project)| (*project).to_string())
                .collect(),
            environments: BOARDS
                .iter()
                .map(|(slug, arch)| EnvironmentDeclaration::new(*slug, Some(*arch)))
                .collect(),
            known_issues: Vec::new(),
        }
    }
}

/// A single test name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tests {
    One(String),
    Many(Vec<String>),
}

impl Tests {
    fn names(&self) -> &[String] {
        match self {
            Self::One(name) => std::slice::from_ref(name),
            Self::Many(names) => names,
        }
    }
}

/// Either a keyword (only `all` is meaningful) or an explicit list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection<T> {
    Keyword(String),
    List(Vec<T>),
}

/// A branch key; YAML reads `4.4` as a number and `next` as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BranchKey {
    Name(String),
    Integer(i64),
    Float(f64),
}

impl BranchKey {
    fn render(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) if value.fract() == 0.0 => format!("{value:.1}"),
            Self::Float(value) => value.to_string(),
        }
    }
}

/// One item of a skiplist document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkiplistEntry {
    pub tests: Tests,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    pub boards: Selection<String>,
    pub branches: Selection<BranchKey>,
    #[serde(default)]
    pub environments: Option<String>,
}

impl SkiplistEntry {
    /// Deployments this entry belongs to. Unrecognized values select none.
    #[must_use]
    pub fn deployments(&self) -> &'static [Deployment] {
        match self.environments.as_deref() {
            Some(ALL) => &[Deployment::Production, Deployment::Staging],
            Some("production") => &[Deployment::Production],
            Some("staging") => &[Deployment::Staging],
            _ => &[],
        }
    }

    /// One known-issue declaration per listed test, named `<suite>/<test>`.
    ///
    /// # Errors
    ///
    /// Returns [`KnownIssueError::InvalidSkiplist`] when `boards` or
    /// `branches` is a keyword other than `all`.
    pub fn to_declarations(
        &self,
        suite: &str,
    ) -> Result<Vec<KnownIssueDeclaration>, KnownIssueError> {
        let environments: Vec<EnvironmentSelector> = match &self.boards {
            Selection::Keyword(word) if word == ALL => BOARDS
                .iter()
                .map(|(slug, _)| EnvironmentSelector::slug(*slug))
                .collect(),
            Selection::List(boards) => boards.iter().map(EnvironmentSelector::slug).collect(),
            Selection::Keyword(word) => {
                return Err(KnownIssueError::InvalidSkiplist {
                    field: "boards",
                    reason: format!("expected 'all' or a list, got '{word}'"),
                });
            }
        };

        let projects: Vec<String> = match &self.branches {
            Selection::Keyword(word) if word == ALL => BRANCH_PROJECTS
                .iter()
                .map(|(_, project)| (*project).to_string())
                .collect(),
            Selection::List(branches) => branches
                .iter()
                .filter_map(|key| {
                    let key = key.render();
                    let project = branch_project(&key);
                    if project.is_none() {
                        tracing::warn!(branch = %key, "unknown branch, skipping");
                    }
                    project
                })
                .collect(),
            Selection::Keyword(word) => {
                return Err(KnownIssueError::InvalidSkiplist {
                    field: "branches",
                    reason: format!("expected 'all' or a list, got '{word}'"),
                });
            }
        };

        Ok(self
            .tests
            .names()
            .iter()
            .map(|test| KnownIssueDeclaration {
                test_name: Some(format!("{suite}/{test}")),
                url: self.url.clone(),
                notes: self.reason.clone(),
                active: None,
                intermittent: None,
                projects: projects.clone(),
                environments: environments.clone(),
            })
            .collect())
    }
}

fn branch_project(key: &str) -> Option<String> {
    BRANCH_PROJECTS
        .iter()
        .find(|(branch, _)| *branch == key)
        .map(|(_, project)| (*project).to_string())
}

/// Production and staging project declarations produced from skiplists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub production: ProjectDeclaration,
    pub staging: ProjectDeclaration,
}

impl Conversion {
    #[must_use]
    pub const fn project(&self, deployment: Deployment) -> &ProjectDeclaration {
        match deployment {
            Deployment::Production => &self.production,
            Deployment::Staging => &self.staging,
        }
    }

    fn project_mut(&mut self, deployment: Deployment) -> &mut ProjectDeclaration {
        match deployment {
            Deployment::Production => &mut self.production,
            Deployment::Staging => &mut self.staging,
        }
    }
}

/// Convert skiplist entries into one project declaration per deployment.
///
/// Invalid entries are logged and skipped.
#[must_use]
pub fn convert(entries: &[SkiplistEntry], suite: &str) -> Conversion {
    let mut conversion = Conversion {
        production: Deployment::Production.catalog_project(),
        staging: Deployment::Staging.catalog_project(),
    };

    for entry in entries {
        let declarations = match entry.to_declarations(suite) {
            Ok(declarations) => declarations,
            Err(error) => {
                tracing::warn!(%error, tests = ?entry.tests, "skipping skiplist entry");
                continue;
            }
        };
        let deployments = entry.deployments();
        if deployments.is_empty() {
            tracing::debug!(
                environments = ?entry.environments,
                tests = ?entry.tests,
                "skiplist entry selects no deployment"
            );
        }
        for deployment in deployments {
            conversion
                .project_mut(*deployment)
                .known_issues
                .extend(declarations.iter().cloned());
        }
    }

    conversion
}
