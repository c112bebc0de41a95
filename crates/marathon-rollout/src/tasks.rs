//! Task-death confirmer — waits until no task of an application still
//! carries a torn-down version.
//!
//! After a failed deployment is cancelled, the container runtime may
//! take time to actually kill its tasks. Reverting while they are still
//! alive risks resource contention or port collisions with the tasks of
//! the restored version, so this gate runs before any revert submission.

use std::time::Duration;

use marathon_client::{ClientError, ClusterApi};
use tracing::{error, info};

use crate::error::RolloutError;
use crate::poll::{POLL_INTERVAL, PollOutcome, poll_until};

/// Block until no task of `app_id` still reports `version`, or
/// `timeout` elapses.
pub async fn await_task_death<C: ClusterApi>(
    client: &C,
    app_id: &str,
    version: &str,
    timeout: Duration,
) -> Result<(), RolloutError> {
    info!(app_id, version, ?timeout, "waiting for tasks of failed version to die");

    let outcome = poll_until(POLL_INTERVAL, timeout, || async move {
        let tasks = client.list_tasks(app_id).await?;
        Ok::<_, ClientError>(!tasks.iter().any(|t| t.version == version))
    })
    .await;

    match outcome {
        PollOutcome::Resolved => {
            info!(app_id, version, "no tasks left on failed version");
            Ok(())
        }
        PollOutcome::TimedOut => Err(RolloutError::TasksStillRunning {
            app_id: app_id.to_string(),
            version: version.to_string(),
            timeout,
        }),
        PollOutcome::Failed(e) => {
            error!(app_id, error = %e, "failed to read task list");
            Err(e.into())
        }
    }
}
