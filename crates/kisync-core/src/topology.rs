//! Project declarations and the topology derived from them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::TopologyError;
use crate::known_issue::KnownIssueDeclaration;

/// One environment of a project family as declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentDeclaration {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
}

impl EnvironmentDeclaration {
    pub fn new(slug: impl Into<String>, architecture: Option<&str>) -> Self {
        Self {
            slug: slug.into(),
            architecture: architecture.map(str::to_string),
        }
    }
}

/// A project block of a project document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Member sub-projects in `group/slug` form.
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub environments: Vec<EnvironmentDeclaration>,
    #[serde(default)]
    pub known_issues: Vec<KnownIssueDeclaration>,
}

impl ProjectDeclaration {
    /// The remote URL, which every other part of the project depends on.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::MissingUrl`] when the declaration has no
    /// (or an empty) `url`.
    pub fn require_url(&self) -> Result<&str, TopologyError> {
        self.url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| TopologyError::MissingUrl {
                name: self.name.clone(),
            })
    }
}

/// Read-only view of a project family: its members, its environments and the
/// lookups derived from the environments.
///
/// The derived sets are computed once in [`ProjectTopology::from_declaration`]
/// and never change independently of `environments`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTopology {
    name: String,
    base_url: String,
    member_projects: Vec<String>,
    environments: Vec<EnvironmentDeclaration>,
    environment_slugs: BTreeSet<String>,
    architecture_to_slugs: BTreeMap<String, BTreeSet<String>>,
}

impl ProjectTopology {
    /// Build the topology for a declared project.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::MissingUrl`] when the project has no URL.
    pub fn from_declaration(declaration: &ProjectDeclaration) -> Result<Self, TopologyError> {
        let base_url = declaration.require_url()?.to_string();

        let mut environment_slugs = BTreeSet::new();
        let mut architecture_to_slugs: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for env in &declaration.environments {
            environment_slugs.insert(env.slug.clone());
            if let Some(arch) = &env.architecture {
                architecture_to_slugs
                    .entry(arch.clone())
                    .or_default()
                    .insert(env.slug.clone());
            }
        }

        Ok(Self {
            name: declaration.name.clone(),
            base_url,
            member_projects: declaration.projects.clone(),
            environments: declaration.environments.clone(),
            environment_slugs,
            architecture_to_slugs,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn member_projects(&self) -> &[String] {
        &self.member_projects
    }

    #[must_use]
    pub fn environments(&self) -> &[EnvironmentDeclaration] {
        &self.environments
    }

    #[must_use]
    pub fn is_member(&self, project: &str) -> bool {
        self.member_projects.iter().any(|p| p == project)
    }

    /// Every declared environment slug.
    #[must_use]
    pub const fn environment_slugs(&self) -> &BTreeSet<String> {
        &self.environment_slugs
    }

    /// Architecture name to the slugs declared with that architecture.
    #[must_use]
    pub const fn architecture_to_slugs(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.architecture_to_slugs
    }

    /// Slugs having `architecture`, if any environment declares it.
    #[must_use]
    pub fn slugs_for_architecture(&self, architecture: &str) -> Option<&BTreeSet<String>> {
        self.architecture_to_slugs.get(architecture)
    }
}
