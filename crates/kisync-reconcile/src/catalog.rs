//! Within-run cache of remote project and environment lookups.
//!
//! The remote catalog does not change during a run, so each `(group, slug)`
//! and each project's environment list is fetched at most once. Failed or
//! truncated lookups are not cached.

use std::collections::HashMap;

use kisync_remote::{RemoteClient, RemoteEnvironment, RemoteError, RemoteProject, Transport};

const PROJECTS: &str = "projects";
const ENVIRONMENTS: &str = "environments";

#[derive(Debug, Default)]
pub struct RemoteCatalog {
    projects: HashMap<(String, String), Option<RemoteProject>>,
    environments: HashMap<u64, Vec<RemoteEnvironment>>,
}

impl RemoteCatalog {
    /// The project `group/slug`, or `None` if the remote does not have it.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Conflict`] if the filter is ambiguous, or any
    /// transport/parse error from the lookup.
    pub async fn project<T: Transport>(
        &mut self,
        client: &RemoteClient<T>,
        group: &str,
        slug: &str,
    ) -> Result<Option<RemoteProject>, RemoteError> {
        let key = (group.to_string(), slug.to_string());
        if let Some(cached) = self.projects.get(&key) {
            return Ok(cached.clone());
        }

        let listing = client
            .list_pages::<RemoteProject>(
                PROJECTS,
                &[("group__slug", group.to_string()), ("slug", slug.to_string())],
            )
            .await?;
        let complete = listing.complete;
        let project = listing.into_single(PROJECTS)?;
        if complete {
            self.projects.insert(key, project.clone());
        }
        Ok(project)
    }

    /// Every environment registered under `project`. A listing cut short by
    /// a failed page is returned but fetched again next time.
    ///
    /// # Errors
    ///
    /// Returns any transport/parse error from the listing.
    pub async fn environments<T: Transport>(
        &mut self,
        client: &RemoteClient<T>,
        project: &RemoteProject,
    ) -> Result<Vec<RemoteEnvironment>, RemoteError> {
        if let Some(cached) = self.environments.get(&project.id) {
            return Ok(cached.clone());
        }

        let listing = client
            .list_pages::<RemoteEnvironment>(ENVIRONMENTS, &[("project", project.id.to_string())])
            .await?;
        if listing.complete {
            self.environments.insert(project.id, listing.records.clone());
        } else {
            tracing::warn!(project = %project.url, "environment listing incomplete, not cached");
        }
        Ok(listing.records)
    }
}

#[cfg(test)]
mod tests {
    use kisync_remote::Method;
    use kisync_remote::testing::FakeTransport;
    use serde_json::json;

    use super::*;

    const BASE: &str = "https://qa-reports.linaro.org";

    #[tokio::test]
    async fn lookups_are_fetched_once() {
        let transport = FakeTransport::new();
        let client = RemoteClient::new(BASE, &transport).unwrap();
        transport.respond_json(
            Method::Get,
            &client.endpoint_url(
                PROJECTS,
                &[("group__slug", "lkft".into()), ("slug", "linux-next-oe".into())],
            ),
            200,
            json!({
                "next": null,
                "results": [{
                    "id": 3,
                    "url": format!("{BASE}/api/projects/3/"),
                    "slug": "linux-next-oe",
                }],
            }),
        );
        transport.respond_json(
            Method::Get,
            &client.endpoint_url(ENVIRONMENTS, &[("project", "3".into())]),
            200,
            json!({
                "next": null,
                "results": [{
                    "id": 1,
                    "url": format!("{BASE}/api/environments/1/"),
                    "slug": "x15",
                }],
            }),
        );

        let mut catalog = RemoteCatalog::default();
        for _ in 0..3 {
            let project = catalog
                .project(&client, "lkft", "linux-next-oe")
                .await
                .unwrap()
                .expect("project exists");
            let envs = catalog.environments(&client, &project).await.unwrap();
            assert_eq!(envs.len(), 1);
        }
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn missing_projects_are_remembered() {
        let transport = FakeTransport::new();
        let client = RemoteClient::new(BASE, &transport).unwrap();
        transport.respond_json(
            Method::Get,
            &client.endpoint_url(
                PROJECTS,
                &[("group__slug", "lkft".into()), ("slug", "gone".into())],
            ),
            200,
            json!({"next": null, "results": []}),
        );

        let mut catalog = RemoteCatalog::default();
        assert!(catalog.project(&client, "lkft", "gone").await.unwrap().is_none());
        assert!(catalog.project(&client, "lkft", "gone").await.unwrap().is_none());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn truncated_environment_listing_is_refetched() {
        let transport = FakeTransport::new();
        let client = RemoteClient::new(BASE, &transport).unwrap();
        let project = RemoteProject {
            id: 3,
            url: format!("{BASE}/api/projects/3/"),
            slug: "linux-next-oe".into(),
        };
        let second = format!("{BASE}/api/environments/?project=3&page=2");
        transport.respond_json(
            Method::Get,
            &client.endpoint_url(ENVIRONMENTS, &[("project", "3".into())]),
            200,
            json!({
                "next": second,
                "results": [{"id": 1, "url": format!("{BASE}/api/environments/1/"), "slug": "a"}],
            }),
        );
        transport.respond(Method::Get, &second, 503, "unavailable");

        let mut catalog = RemoteCatalog::default();
        let partial = catalog.environments(&client, &project).await.unwrap();
        assert_eq!(partial.len(), 1);

        transport.respond_json(
            Method::Get,
            &second,
            200,
            json!({
                "next": null,
                "results": [{"id": 2, "url": format!("{BASE}/api/environments/2/"), "slug": "b"}],
            }),
        );
        let full = catalog.environments(&client, &project).await.unwrap();
        let slugs: Vec<&str> = full.iter().map(|env| env.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b"]);

        let cached = catalog.environments(&client, &project).await.unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(transport.requests().len(), 4);
    }
}
