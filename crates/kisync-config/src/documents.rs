//! Project and skiplist YAML documents.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use kisync_core::ProjectDeclaration;
use kisync_core::skiplist::SkiplistEntry;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A file holding one or more project blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDocument {
    #[serde(default)]
    pub projects: Vec<ProjectDeclaration>,
}

/// A file holding skiplist entries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SkiplistDocument {
    #[serde(default)]
    pub skiplist: Vec<SkiplistEntry>,
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, contents: &str) -> Result<T, ConfigError> {
    serde_yaml::from_str(contents).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Load project documents and merge their projects by name.
///
/// A project repeated in a later file replaces the earlier one. Projects come
/// back in name order, each with a usable URL.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] or [`ConfigError::Yaml`] for unreadable or
/// malformed files and [`ConfigError::Project`] for a project without URL.
pub fn load_projects<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ProjectDeclaration>, ConfigError> {
    let mut merged = BTreeMap::new();
    for path in paths {
        let path = path.as_ref();
        let document: ProjectDocument = parse(path, &read(path)?)?;
        tracing::debug!(
            path = %path.display(),
            projects = document.projects.len(),
            "loaded project document"
        );

        for project in document.projects {
            project
                .require_url()
                .map_err(|source| ConfigError::Project {
                    path: path.to_path_buf(),
                    source,
                })?;
            if merged.contains_key(&project.name) {
                tracing::debug!(name = %project.name, path = %path.display(), "project redefined");
            }
            merged.insert(project.name.clone(), project);
        }
    }
    Ok(merged.into_values().collect())
}

/// Load and concatenate the entries of skiplist documents, in file order.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] or [`ConfigError::Yaml`] for unreadable or
/// malformed files.
pub fn load_skiplists<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<SkiplistEntry>, ConfigError> {
    let mut entries = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let document: SkiplistDocument = parse(path, &read(path)?)?;
        entries.extend(document.skiplist);
    }
    Ok(entries)
}

/// Write `project` as a single-project document.
///
/// # Errors
///
/// Returns [`ConfigError::Yaml`] if serialization fails and
/// [`ConfigError::Io`] if the file cannot be written.
pub fn write_project(path: &Path, project: &ProjectDeclaration) -> Result<(), ConfigError> {
    let document = ProjectDocument {
        projects: vec![project.clone()],
    };
    let yaml = serde_yaml::to_string(&document).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, yaml).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
