//! The cluster API contract the rollout core is written against.

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::types::{App, AppSpec, Deployment, DeploymentRef, Task};

/// Operations the rollout flow needs from the cluster scheduler.
///
/// `MarathonClient` is the production implementation; tests drive the
/// rollout state machine against an in-memory fake instead.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Read the current server-side record of an application.
    ///
    /// A missing application is reported as `ClientError::NotFound`,
    /// which callers use to choose create-vs-update.
    async fn get_application(&self, app_id: &str) -> ClientResult<App>;

    /// Create a new application and return the deployment that installs it.
    async fn create_application(&self, spec: &AppSpec) -> ClientResult<DeploymentRef>;

    /// Update an existing application. With `force`, the submission
    /// supersedes any deployment already in progress for the app.
    async fn update_application(&self, spec: &AppSpec, force: bool) -> ClientResult<DeploymentRef>;

    /// List all deployments currently tracked by the scheduler.
    async fn list_deployments(&self) -> ClientResult<Vec<Deployment>>;

    /// Cancel a deployment. Without `force` the scheduler registers a
    /// counter-deployment reverting the change and returns its handle;
    /// with `force` the deployment record is simply removed.
    async fn cancel_deployment(
        &self,
        deployment_id: &str,
        force: bool,
    ) -> ClientResult<Option<DeploymentRef>>;

    /// Pin an application to a previously deployed version. The
    /// scheduler reconstructs the full spec for that version from its
    /// own history.
    async fn set_application_version(
        &self,
        app_id: &str,
        version: &str,
    ) -> ClientResult<DeploymentRef>;

    /// List the tasks currently belonging to an application.
    async fn list_tasks(&self, app_id: &str) -> ClientResult<Vec<Task>>;
}
