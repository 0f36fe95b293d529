//! Per-topology reconciliation of known issues against the remote API.

use std::collections::HashSet;

use kisync_core::errors::split_project_name;
use kisync_core::{KnownIssue, KnownIssueDeclaration, ProjectTopology, Validation};
use kisync_remote::{Record, RemoteClient, RemoteEnvironment, RemoteError, Transport, record_id};
use serde_json::Value;
use tracing::Instrument;

use crate::catalog::RemoteCatalog;
use crate::error::SyncError;
use crate::options::SyncOptions;
use crate::payload::KnownIssuePayload;
use crate::report::{Action, AppliedIssue, FailedIssue, Outcome, SyncDecision, SyncReport};

const KNOWN_ISSUES: &str = "knownissues";

/// Reconciles the known issues of one remote instance.
///
/// The only component that mutates remote state. Issues are processed one
/// at a time; a failure scoped to one issue is recorded in the report and the
/// next issue proceeds.
pub struct Reconciler<T> {
    client: RemoteClient<T>,
    options: SyncOptions,
    catalog: RemoteCatalog,
}

impl<T: Transport> Reconciler<T> {
    #[must_use]
    pub fn new(client: RemoteClient<T>, options: SyncOptions) -> Self {
        Self {
            client,
            options,
            catalog: RemoteCatalog::default(),
        }
    }

    /// Normalize and reconcile every declaration of `topology`.
    ///
    /// # Errors
    ///
    /// Only run-level failures are returned: a sanity-check miss, any error
    /// during the sanity pass, or a validation error in strict mode.
    pub async fn sync(
        &mut self,
        topology: &ProjectTopology,
        declarations: &[KnownIssueDeclaration],
    ) -> Result<SyncReport, SyncError> {
        let span = tracing::info_span!("sync", project = topology.name());
        self.sync_declarations(topology, declarations)
            .instrument(span)
            .await
    }

    async fn sync_declarations(
        &mut self,
        topology: &ProjectTopology,
        declarations: &[KnownIssueDeclaration],
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();
        let issues = self.normalize_all(topology, declarations, &mut report)?;

        if self.options.sanity_check {
            self.sanity_check(topology).await?;
        }

        for issue in &issues {
            let title = issue.title().to_string();
            let span = tracing::info_span!("known_issue", title = %title);
            match self.reconcile(issue).instrument(span).await {
                Ok(Outcome::Applied(action)) => {
                    tracing::info!(%title, ?action, "applied");
                    report.applied.push(AppliedIssue { title, action });
                }
                Ok(Outcome::DryRun(decision)) => {
                    tracing::info!(
                        %title,
                        action = ?decision.action,
                        projects = ?decision.projects,
                        environments = ?decision.environment_slugs,
                        "dry run, not applied"
                    );
                    report.skipped.push(decision);
                }
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    tracing::error!(%title, %error, "known issue failed");
                    report.failed.push(FailedIssue {
                        subject: title,
                        error: error.to_string(),
                    });
                }
            }
        }

        report.log_summary(topology.name());
        Ok(report)
    }

    /// Resolve every declaration before anything is sent to the remote.
    ///
    /// In strict mode the first invalid declaration aborts the run; otherwise
    /// it is recorded as failed and left out.
    fn normalize_all(
        &self,
        topology: &ProjectTopology,
        declarations: &[KnownIssueDeclaration],
        report: &mut SyncReport,
    ) -> Result<Vec<KnownIssue>, SyncError> {
        let validation = self.options.validation();
        let mut issues = Vec::with_capacity(declarations.len());

        for declaration in declarations {
            let subject = declaration
                .test_name
                .clone()
                .unwrap_or_else(|| "<unnamed>".to_string());
            match KnownIssue::normalize(declaration, topology, validation) {
                Ok(issue) => issues.push(issue),
                Err(source) if validation == Validation::Strict => {
                    return Err(SyncError::StrictValidation { subject, source });
                }
                Err(error) => {
                    tracing::warn!(%subject, %error, "skipping invalid known issue");
                    report.failed.push(FailedIssue {
                        subject,
                        error: error.to_string(),
                    });
                }
            }
        }

        Ok(issues)
    }

    /// Confirm every member sub-project of `topology` exists remotely.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SanityCheck`] for the first missing project and
    /// propagates lookup failures.
    pub async fn sanity_check(&mut self, topology: &ProjectTopology) -> Result<(), SyncError> {
        for project in topology.member_projects() {
            let (group, slug) =
                split_project_name(project).map_err(|source| SyncError::StrictValidation {
                    subject: project.clone(),
                    source,
                })?;
            if self.catalog.project(&self.client, group, slug).await?.is_none() {
                return Err(SyncError::SanityCheck {
                    project: project.clone(),
                    instance: topology.base_url().to_string(),
                });
            }
            tracing::debug!(project = %project, "project exists");
        }
        Ok(())
    }

    /// Create or update the remote record of one known issue, or report what
    /// would happen when changes are not applied.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Remote`] for API failures (including ambiguous
    /// filters) and [`SyncError::Validation`] for malformed sub-project names.
    pub async fn reconcile(&mut self, issue: &KnownIssue) -> Result<Outcome, SyncError> {
        let existing: Option<Record> = self
            .client
            .fetch_single(
                KNOWN_ISSUES,
                &[
                    ("title", issue.title().to_string()),
                    ("test_name", issue.test_name().to_string()),
                ],
            )
            .await?;
        let environments = self.resolve_environments(issue).await?;
        let action = if existing.is_some() {
            Action::Update
        } else {
            Action::Create
        };

        if !self.options.applies_changes() {
            return Ok(Outcome::DryRun(SyncDecision::new(issue, action, &environments)));
        }

        let payload = KnownIssuePayload::new(issue, &environments);
        match existing {
            None => {
                self.client
                    .create(KNOWN_ISSUES, &Value::Object(payload.to_record()))
                    .await?;
            }
            Some(record) => {
                let id = record_id(&record).ok_or_else(|| RemoteError::MissingIdentity {
                    endpoint: KNOWN_ISSUES.to_string(),
                })?;
                let merged = payload.merge_into(record);
                self.client
                    .update(KNOWN_ISSUES, &id, &Value::Object(merged))
                    .await?;
            }
        }
        Ok(Outcome::Applied(action))
    }

    /// Remote environments of the issue's sub-projects whose slug is
    /// targeted, deduplicated by URL in discovery order.
    async fn resolve_environments(
        &mut self,
        issue: &KnownIssue,
    ) -> Result<Vec<RemoteEnvironment>, SyncError> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for project in issue.target_projects() {
            let (group, slug) = split_project_name(project)?;
            let Some(remote) = self.catalog.project(&self.client, group, slug).await? else {
                tracing::info!(project = %project, "project not on remote yet, skipping");
                continue;
            };

            for env in self.catalog.environments(&self.client, &remote).await? {
                if issue.target_environment_slugs().contains(&env.slug)
                    && seen.insert(env.url.clone())
                {
                    tracing::debug!(project = %project, slug = %env.slug, "adding environment");
                    resolved.push(env);
                }
            }
        }

        Ok(resolved)
    }
}
