use std::path::PathBuf;

use anyhow::Context;
use kisync_config::{KisyncSettings, load_projects};
use kisync_core::ProjectTopology;
use kisync_reconcile::{Reconciler, SyncReport};
use kisync_remote::{HttpTransport, RemoteClient, TransportOptions, host_key};
use kisync_secrets::CredentialStore;

use crate::cli::{GlobalFlags, SyncArgs};
use crate::output;

/// Handle `kisync sync`.
///
/// Projects are reconciled one after the other, each against its own remote
/// instance. Record-scoped failures are logged and counted; only run-level
/// errors make the command fail.
pub async fn handle(args: &SyncArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let settings = KisyncSettings::load_with_dotenv().context("failed to load kisync settings")?;
    let projects = load_projects(&args.config).context("failed to load project documents")?;
    if projects.is_empty() {
        tracing::warn!("no projects declared, nothing to sync");
        return Ok(());
    }

    let credentials_path = credentials_path(args, &settings)?;
    let store = CredentialStore::load(&credentials_path)?;
    let transport_options = TransportOptions {
        timeout: settings.http.timeout()?,
        user_agent: settings.http.user_agent.clone(),
    };
    let options = args.options();

    let mut report = SyncReport::default();
    for declaration in &projects {
        let topology = ProjectTopology::from_declaration(declaration)?;
        let host = host_key(topology.base_url())?;
        let credentials = store.require(&host)?;
        let transport = HttpTransport::new(&credentials.token, &transport_options)?;
        let client = RemoteClient::new(topology.base_url(), transport)?;

        let mut reconciler = Reconciler::new(client, options);
        let project_report = reconciler
            .sync(&topology, &declaration.known_issues)
            .await
            .with_context(|| format!("sync of project {} aborted", topology.name()))?;
        report.merge(project_report);
    }

    if projects.len() > 1 {
        report.log_summary("all projects");
    }
    if !report.is_clean() {
        tracing::warn!(failed = report.failed.len(), "some known issues were not synced");
    }
    if !options.applies_changes() && !flags.quiet {
        output::output(&report.skipped)?;
    }

    Ok(())
}

/// `--credentials`, else the configured file, else `~/.netrc`.
fn credentials_path(args: &SyncArgs, settings: &KisyncSettings) -> anyhow::Result<PathBuf> {
    if let Some(path) = args.credentials.as_ref().or(settings.credentials_file.as_ref()) {
        return Ok(path.clone());
    }
    Ok(kisync_secrets::default_path()?)
}
