//! `MarathonClient` — reqwest implementation of the cluster API.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::api::ClusterApi;
use crate::error::{ClientError, ClientResult};
use crate::types::{App, AppSpec, Deployment, DeploymentRef, Task};

/// HTTP client for the Marathon v2 API.
pub struct MarathonClient {
    http: reqwest::Client,
    base: Url,
}

impl MarathonClient {
    /// Create a client for the given server endpoint.
    pub fn new(server: &str) -> ClientResult<Self> {
        let base = Url::parse(server)?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, base })
    }

    /// Build a URL under the server endpoint. Marathon app ids are
    /// path-like and may contain slashes, so the id is spliced into the
    /// path rather than percent-encoded as a single segment.
    fn url(&self, path: &str, force: bool) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        if force {
            url.set_query(Some("force=true"));
        }
        url
    }

    fn app_path(app_id: &str) -> String {
        format!("/v2/apps/{}", app_id.trim_start_matches('/'))
    }

    /// Turn a non-2xx response into an `Api` error, keeping the body
    /// text — it is the scheduler's own explanation of what went wrong.
    async fn check(resp: Response) -> ClientResult<Response> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(ClientError::Api { status, body })
        }
    }
}

/// Wrapper around `GET /v2/apps/{id}` responses.
#[derive(Deserialize)]
struct AppResponse {
    app: App,
}

/// Wrapper around `GET /v2/apps/{id}/tasks` responses.
#[derive(Deserialize)]
struct TasksResponse {
    tasks: Vec<Task>,
}

/// Shape of a `POST /v2/apps` response: the created app record with the
/// installing deployment listed under `deployments`.
#[derive(Deserialize)]
struct CreateResponse {
    version: String,
    #[serde(default)]
    deployments: Vec<CreatedDeployment>,
}

#[derive(Deserialize)]
struct CreatedDeployment {
    id: String,
}

#[async_trait]
impl ClusterApi for MarathonClient {
    async fn get_application(&self, app_id: &str) -> ClientResult<App> {
        let url = self.url(&Self::app_path(app_id), false);
        debug!(%url, "GET application");
        let resp = self.http.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                app_id: app_id.to_string(),
            });
        }
        let resp = Self::check(resp).await?;
        let wrapper: AppResponse = resp.json().await?;
        Ok(wrapper.app)
    }

    async fn create_application(&self, spec: &AppSpec) -> ClientResult<DeploymentRef> {
        let url = self.url("/v2/apps", false);
        debug!(%url, app_id = %spec.id, "POST application");
        let resp = self.http.post(url).json(spec).send().await?;
        let resp = Self::check(resp).await?;
        let created: CreateResponse = resp.json().await?;
        let deployment = created
            .deployments
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Decode("creation response carried no deployment".into()))?;
        Ok(DeploymentRef {
            id: deployment.id,
            version: created.version,
        })
    }

    async fn update_application(&self, spec: &AppSpec, force: bool) -> ClientResult<DeploymentRef> {
        let url = self.url(&Self::app_path(&spec.id), force);
        debug!(%url, app_id = %spec.id, force, "PUT application");
        let resp = self.http.put(url).json(spec).send().await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json().await?)
    }

    async fn list_deployments(&self) -> ClientResult<Vec<Deployment>> {
        let url = self.url("/v2/deployments", false);
        let resp = self.http.get(url).send().await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json().await?)
    }

    async fn cancel_deployment(
        &self,
        deployment_id: &str,
        force: bool,
    ) -> ClientResult<Option<DeploymentRef>> {
        let url = self.url(&format!("/v2/deployments/{deployment_id}"), force);
        debug!(%url, force, "DELETE deployment");
        let resp = self.http.delete(url).send().await?;
        let resp = Self::check(resp).await?;
        if force {
            // Forced removal carries no counter-deployment.
            return Ok(None);
        }
        Ok(Some(resp.json().await?))
    }

    async fn set_application_version(
        &self,
        app_id: &str,
        version: &str,
    ) -> ClientResult<DeploymentRef> {
        let url = self.url(&Self::app_path(app_id), true);
        debug!(%url, %version, "PUT application version");
        let body = serde_json::json!({ "id": app_id, "version": version });
        let resp = self.http.put(url).json(&body).send().await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json().await?)
    }

    async fn list_tasks(&self, app_id: &str) -> ClientResult<Vec<Task>> {
        let url = self.url(&format!("{}/tasks", Self::app_path(app_id)), false);
        let resp = self.http.get(url).send().await?;
        let resp = Self::check(resp).await?;
        let wrapper: TasksResponse = resp.json().await?;
        Ok(wrapper.tasks)
    }
}
