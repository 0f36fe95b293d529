//! Known-issue declarations and their normalization against a topology.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::KnownIssueError;
use crate::topology::ProjectTopology;

/// How unresolvable references in a declaration are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Validation {
    /// Drop references the topology does not know.
    #[default]
    Lenient,
    /// Fail the declaration on the first unknown reference.
    Strict,
}

/// Selects environments by slug, by architecture, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
}

impl EnvironmentSelector {
    pub fn slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            architecture: None,
        }
    }

    pub fn architecture(architecture: impl Into<String>) -> Self {
        Self {
            slug: None,
            architecture: Some(architecture.into()),
        }
    }
}

/// A known issue as written in a project document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownIssueDeclaration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermittent: Option<bool>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub environments: Vec<EnvironmentSelector>,
}

/// A known issue resolved against a topology and ready for reconciliation.
///
/// Immutable once built; `target_environment_slugs` is always a subset of the
/// topology's environment slugs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownIssue {
    test_name: String,
    title: String,
    url: Option<String>,
    notes: Option<String>,
    active: Option<bool>,
    intermittent: Option<bool>,
    target_projects: BTreeSet<String>,
    target_environment_slugs: BTreeSet<String>,
}

impl KnownIssue {
    /// Resolve a declaration's project and environment selectors.
    ///
    /// # Errors
    ///
    /// Always fails with [`KnownIssueError::MissingTestName`] when the test
    /// name is absent. Under [`Validation::Strict`] also fails on the first
    /// project, slug or architecture the topology does not declare, and on
    /// selectors that name nothing.
    pub fn normalize(
        declaration: &KnownIssueDeclaration,
        topology: &ProjectTopology,
        validation: Validation,
    ) -> Result<Self, KnownIssueError> {
        let test_name = declaration
            .test_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(KnownIssueError::MissingTestName)?
            .to_string();
        let title = format!("{}/{test_name}", topology.name());

        let mut target_projects = BTreeSet::new();
        for project in &declaration.projects {
            if topology.is_member(project) {
                target_projects.insert(project.clone());
            } else {
                reject(validation, KnownIssueError::UnknownProject(project.clone()))?;
            }
        }

        let mut target_environment_slugs = BTreeSet::new();
        for selector in &declaration.environments {
            if selector.slug.is_none() && selector.architecture.is_none() {
                reject(validation, KnownIssueError::EmptySelector)?;
            }
            if let Some(slug) = &selector.slug {
                if topology.environment_slugs().contains(slug) {
                    target_environment_slugs.insert(slug.clone());
                } else {
                    reject(validation, KnownIssueError::UnknownEnvironment(slug.clone()))?;
                }
            }
            if let Some(arch) = &selector.architecture {
                match topology.slugs_for_architecture(arch) {
                    Some(slugs) => target_environment_slugs.extend(slugs.iter().cloned()),
                    None => reject(validation, KnownIssueError::UnknownArchitecture(arch.clone()))?,
                }
            }
        }

        Ok(Self {
            test_name,
            title,
            url: declaration.url.clone(),
            notes: declaration.notes.clone(),
            active: declaration.active,
            intermittent: declaration.intermittent,
            target_projects,
            target_environment_slugs,
        })
    }

    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// `<topology name>/<test name>`.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    #[must_use]
    pub const fn active(&self) -> Option<bool> {
        self.active
    }

    #[must_use]
    pub const fn intermittent(&self) -> Option<bool> {
        self.intermittent
    }

    #[must_use]
    pub const fn target_projects(&self) -> &BTreeSet<String> {
        &self.target_projects
    }

    #[must_use]
    pub const fn target_environment_slugs(&self) -> &BTreeSet<String> {
        &self.target_environment_slugs
    }
}

fn reject(validation: Validation, error: KnownIssueError) -> Result<(), KnownIssueError> {
    match validation {
        Validation::Strict => Err(error),
        Validation::Lenient => {
            tracing::debug!(%error, "ignoring unresolved reference");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::topology::{EnvironmentDeclaration, ProjectDeclaration};

    fn topology() -> ProjectTopology {
        ProjectTopology::from_declaration(&ProjectDeclaration {
            name: "LKFT".to_string(),
            url: Some("https://qa-reports.linaro.org".to_string()),
            projects: vec![
                "lkft/linux-next-oe".to_string(),
                "lkft/linux-mainline-oe".to_string(),
            ],
            environments: vec![
                EnvironmentDeclaration::new("hi6220-hikey", Some("arm64")),
                EnvironmentDeclaration::new("juno-r2", Some("arm64")),
                EnvironmentDeclaration::new("dragonboard-410c", Some("arm64")),
                EnvironmentDeclaration::new("x15", Some("arm32")),
                EnvironmentDeclaration::new("x86", Some("x86_64")),
                EnvironmentDeclaration::new("qemu", None),
            ],
            known_issues: Vec::new(),
        })
        .unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn declaration(
        projects: &[&str],
        environments: Vec<EnvironmentSelector>,
    ) -> KnownIssueDeclaration {
        KnownIssueDeclaration {
            test_name: Some("boot/test1".to_string()),
            projects: projects.iter().map(ToString::to_string).collect(),
            environments,
            ..KnownIssueDeclaration::default()
        }
    }

    #[test]
    fn architecture_selector_expands_to_slugs() {
        let decl = declaration(
            &["lkft/linux-next-oe"],
            vec![EnvironmentSelector::architecture("arm64")],
        );
        let issue = KnownIssue::normalize(&decl, &topology(), Validation::Strict).unwrap();

        assert_eq!(issue.title(), "LKFT/boot/test1");
        assert_eq!(issue.target_projects(), &set(&["lkft/linux-next-oe"]));
        assert_eq!(
            issue.target_environment_slugs(),
            &set(&["hi6220-hikey", "juno-r2", "dragonboard-410c"])
        );
    }

    #[test]
    fn all_slugs_and_architectures_select_everything() {
        let topo = topology();
        let mut selectors: Vec<EnvironmentSelector> = topo
            .architecture_to_slugs()
            .keys()
            .map(EnvironmentSelector::architecture)
            .collect();
        selectors.extend(topo.environment_slugs().iter().map(EnvironmentSelector::slug));

        let issue =
            KnownIssue::normalize(&declaration(&[], selectors), &topo, Validation::Strict).unwrap();
        assert_eq!(issue.target_environment_slugs(), topo.environment_slugs());
    }

    #[test]
    fn slug_and_architecture_in_one_selector_union() {
        let selector = EnvironmentSelector {
            slug: Some("x86".to_string()),
            architecture: Some("arm32".to_string()),
        };
        let issue = KnownIssue::normalize(
            &declaration(&[], vec![selector]),
            &topology(),
            Validation::Strict,
        )
        .unwrap();
        assert_eq!(issue.target_environment_slugs(), &set(&["x15", "x86"]));
    }

    #[test]
    fn unknown_project_is_dropped_when_lenient() {
        let decl = declaration(
            &["lkft/linux-next-oe", "lkft/nope", "lkft/linux-mainline-oe"],
            vec![],
        );
        let issue = KnownIssue::normalize(&decl, &topology(), Validation::Lenient).unwrap();
        assert_eq!(
            issue.target_projects(),
            &set(&["lkft/linux-next-oe", "lkft/linux-mainline-oe"])
        );
    }

    #[test]
    fn unknown_project_fails_when_strict() {
        let decl = declaration(&["lkft/linux-next-oe", "lkft/nope"], vec![]);
        assert_eq!(
            KnownIssue::normalize(&decl, &topology(), Validation::Strict),
            Err(KnownIssueError::UnknownProject("lkft/nope".to_string()))
        );
    }

    #[test]
    fn consecutive_unknown_projects_are_all_dropped() {
        let decl = declaration(&["lkft/a", "lkft/b", "lkft/linux-next-oe", "lkft/c"], vec![]);
        let issue = KnownIssue::normalize(&decl, &topology(), Validation::Lenient).unwrap();
        assert_eq!(issue.target_projects(), &set(&["lkft/linux-next-oe"]));
    }

    #[test]
    fn unknown_environment_selectors_follow_validation_mode() {
        let topo = topology();
        let decl = declaration(
            &[],
            vec![
                EnvironmentSelector::slug("x15"),
                EnvironmentSelector::slug("beaglebone"),
                EnvironmentSelector::architecture("riscv"),
            ],
        );

        let lenient = KnownIssue::normalize(&decl, &topo, Validation::Lenient).unwrap();
        assert_eq!(lenient.target_environment_slugs(), &set(&["x15"]));

        assert_eq!(
            KnownIssue::normalize(&decl, &topo, Validation::Strict),
            Err(KnownIssueError::UnknownEnvironment("beaglebone".to_string()))
        );

        let arch_only = declaration(&[], vec![EnvironmentSelector::architecture("riscv")]);
        assert_eq!(
            KnownIssue::normalize(&arch_only, &topo, Validation::Strict),
            Err(KnownIssueError::UnknownArchitecture("riscv".to_string()))
        );
    }

    #[test]
    fn empty_selector_raises_only_when_strict() {
        let decl = declaration(&[], vec![EnvironmentSelector::default()]);
        assert_eq!(
            KnownIssue::normalize(&decl, &topology(), Validation::Strict),
            Err(KnownIssueError::EmptySelector)
        );
        let issue = KnownIssue::normalize(&decl, &topology(), Validation::Lenient).unwrap();
        assert!(issue.target_environment_slugs().is_empty());
    }

    #[test]
    fn missing_test_name_fails_in_both_modes() {
        let decl = KnownIssueDeclaration::default();
        for mode in [Validation::Lenient, Validation::Strict] {
            assert_eq!(
                KnownIssue::normalize(&decl, &topology(), mode),
                Err(KnownIssueError::MissingTestName)
            );
        }
    }

    #[test]
    fn optional_fields_pass_through() {
        let decl = KnownIssueDeclaration {
            test_name: Some("ltp/madvise".to_string()),
            url: Some("https://bugs.linaro.org/1".to_string()),
            notes: Some("flaky on hikey".to_string()),
            active: Some(true),
            intermittent: None,
            ..KnownIssueDeclaration::default()
        };
        let issue = KnownIssue::normalize(&decl, &topology(), Validation::Lenient).unwrap();
        assert_eq!(issue.url(), Some("https://bugs.linaro.org/1"));
        assert_eq!(issue.notes(), Some("flaky on hikey"));
        assert_eq!(issue.active(), Some(true));
        assert_eq!(issue.intermittent(), None);
    }

    #[test]
    fn declaration_reads_yaml_shape() {
        let yaml = r"
test_name: boot/test1
active: true
projects:
  - lkft/linux-next-oe
environments:
  - architecture: arm64
  - slug: x15
";
        let decl: KnownIssueDeclaration = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(decl.test_name.as_deref(), Some("boot/test1"));
        assert_eq!(decl.environments.len(), 2);
        assert_eq!(decl.environments[1], EnvironmentSelector::slug("x15"));
        assert_eq!(decl.notes, None);
    }
}
