//! Rollout orchestrator — the top-level entry point.
//!
//! Submits the new spec, watches the resulting deployment, and on a
//! watch timeout hands over to the rollback coordinator when rollback
//! is enabled. One application, one rollout, one sequential control
//! path; nothing persists across invocations.

use std::time::Duration;

use marathon_client::{AppSpec, ClientError, ClusterApi, DeploymentRef};
use tracing::{info, warn};

use crate::error::RolloutError;
use crate::rollback::run_rollback;
use crate::watch::await_deployment;

/// Final result of a successful rollout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutOutcome {
    pub app_id: String,
    pub deployment_id: String,
    /// Version token the application now runs.
    pub version: String,
}

/// Drives one rollout against a cluster scheduler.
pub struct Rollout<C> {
    client: C,
    timeout: Duration,
    rollback: bool,
}

impl<C: ClusterApi> Rollout<C> {
    /// Create an orchestrator with rollback enabled.
    pub fn new(client: C, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            rollback: true,
        }
    }

    /// Enable or disable the rollback path.
    pub fn with_rollback(mut self, enabled: bool) -> Self {
        self.rollback = enabled;
        self
    }

    /// The underlying cluster client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run the rollout for `spec`.
    ///
    /// Rollback runs only when the flag is set and the deployment watch
    /// timed out — never on submit failure, never on transport errors.
    pub async fn run(&self, spec: &AppSpec) -> Result<RolloutOutcome, RolloutError> {
        info!(app_id = %spec.id, timeout = ?self.timeout, rollback = self.rollback, "starting rollout");

        let (prior_version, exists) = self.read_current_state(spec).await;
        let deployment = self.submit(spec, exists).await?;
        info!(
            app_id = %spec.id,
            deployment_id = %deployment.id,
            version = %deployment.version,
            "deployment submitted"
        );

        match await_deployment(&self.client, &spec.id, &deployment, self.timeout).await {
            Ok(()) => {
                info!(app_id = %spec.id, version = %deployment.version, "rollout succeeded");
                Ok(RolloutOutcome {
                    app_id: spec.id.clone(),
                    deployment_id: deployment.id,
                    version: deployment.version,
                })
            }
            Err(err @ RolloutError::DeploymentTimeout { .. }) if self.rollback => Err(run_rollback(
                &self.client,
                &spec.id,
                &deployment,
                prior_version.as_deref(),
                self.timeout,
                err,
            )
            .await),
            Err(err @ RolloutError::DeploymentTimeout { .. }) => {
                warn!(app_id = %spec.id, "deployment timed out and rollback is not enabled");
                Err(RolloutError::RollbackDisabled {
                    source: Box::new(err),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Read the application's current record: decides create-vs-update
    /// and, when rollback is enabled, captures the prior version.
    ///
    /// A read failure other than "not found" is not fatal — it only
    /// disables the rollback's final revert step — so it is downgraded
    /// to a warning and the submit proceeds as a forced update.
    async fn read_current_state(&self, spec: &AppSpec) -> (Option<String>, bool) {
        match self.client.get_application(&spec.id).await {
            Ok(app) => {
                let prior = if self.rollback { app.version } else { None };
                if let Some(version) = &prior {
                    info!(app_id = %spec.id, prior_version = %version, "captured prior version");
                }
                (prior, true)
            }
            Err(ClientError::NotFound { .. }) => {
                info!(app_id = %spec.id, "application does not exist yet");
                (None, false)
            }
            Err(e) => {
                warn!(
                    app_id = %spec.id,
                    error = %e,
                    "failed to read current application state, continuing without a revert target"
                );
                (None, true)
            }
        }
    }

    async fn submit(&self, spec: &AppSpec, exists: bool) -> Result<DeploymentRef, RolloutError> {
        let deployment = if exists {
            // Force: the new submission supersedes any deployment
            // already in progress for this application.
            self.client.update_application(spec, true).await?
        } else {
            self.client.create_application(spec).await?
        };
        Ok(deployment)
    }
}
