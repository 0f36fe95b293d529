use std::path::{Path, PathBuf};

use anyhow::Context;
use kisync_config::{load_skiplists, write_project};
use kisync_core::skiplist::{self, Conversion, Deployment};

use crate::cli::ConvertArgs;

/// Handle `kisync convert`.
pub fn handle(args: &ConvertArgs) -> anyhow::Result<()> {
    let entries = load_skiplists(&args.config).context("failed to load skiplist documents")?;
    let conversion = skiplist::convert(&entries, &args.suite);

    for path in write_conversion(&conversion, &args.suite, &args.output_dir)? {
        tracing::info!(path = %path.display(), "wrote project document");
    }
    Ok(())
}

/// Write each deployment's project to `<dir>/<suite>-<deployment>.yaml`.
fn write_conversion(
    conversion: &Conversion,
    suite: &str,
    dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for deployment in [Deployment::Production, Deployment::Staging] {
        let path = dir.join(format!("{suite}-{}.yaml", deployment.suffix()));
        let project = conversion.project(deployment);
        write_project(&path, project)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(
            project = %project.name,
            known_issues = project.known_issues.len(),
            "converted"
        );
        written.push(path);
    }
    Ok(written)
}
