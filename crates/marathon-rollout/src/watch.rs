//! Deployment watcher — waits for a deployment to leave the active list.

use std::time::Duration;

use marathon_client::{ClientError, ClusterApi, DeploymentRef};
use tracing::{error, info};

use crate::error::RolloutError;
use crate::poll::{POLL_INTERVAL, PollOutcome, poll_until};

/// Block until the scheduler's active-deployments list no longer
/// contains `deployment`, or `timeout` elapses.
///
/// Never returns success while the deployment id was present at the
/// moment of the last successful check. This is a liveness check with a
/// hard deadline, not a correctness check of the deployed content.
pub async fn await_deployment<C: ClusterApi>(
    client: &C,
    app_id: &str,
    deployment: &DeploymentRef,
    timeout: Duration,
) -> Result<(), RolloutError> {
    info!(
        app_id,
        deployment_id = %deployment.id,
        version = %deployment.version,
        ?timeout,
        "waiting for deployment to finish"
    );

    let deployment_id = deployment.id.as_str();
    let outcome = poll_until(POLL_INTERVAL, timeout, || async move {
        let active = client.list_deployments().await?;
        Ok::<_, ClientError>(!active.iter().any(|d| d.id == deployment_id))
    })
    .await;

    match outcome {
        PollOutcome::Resolved => {
            info!(app_id, deployment_id, "deployment finished");
            Ok(())
        }
        PollOutcome::TimedOut => Err(RolloutError::DeploymentTimeout {
            deployment_id: deployment.id.clone(),
            timeout,
        }),
        PollOutcome::Failed(e) => {
            error!(app_id, deployment_id, error = %e, "failed to read active deployments");
            Err(e.into())
        }
    }
}
