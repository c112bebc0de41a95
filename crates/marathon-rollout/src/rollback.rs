//! Rollback coordinator — the recovery protocol for failed deployments.
//!
//! Strict order, no step skipped: cancel the failed deployment, confirm
//! its tasks have died, resubmit the prior version, and watch that
//! reversion under the same deadline. Rollback can restore safety but
//! never turns the rollout into a success, so this module always
//! returns the `RolloutError` to report.

use std::time::Duration;

use marathon_client::{ClusterApi, DeploymentRef};
use tracing::{debug, error, info, warn};

use crate::error::RolloutError;
use crate::tasks::await_task_death;
use crate::watch::await_deployment;

/// Attempt to restore `app_id` to `prior_version` after `failed` did
/// not complete. `original` is the watch error that triggered the
/// rollback; it stays the reported cause wherever the protocol cannot
/// improve on it.
pub async fn run_rollback<C: ClusterApi>(
    client: &C,
    app_id: &str,
    failed: &DeploymentRef,
    prior_version: Option<&str>,
    timeout: Duration,
    original: RolloutError,
) -> RolloutError {
    warn!(
        app_id,
        deployment_id = %failed.id,
        version = %failed.version,
        "deployment failed, rolling back"
    );

    // Cancel first. Reverting with the failed deployment still
    // registered would leave two deployments racing on the same app.
    match client.cancel_deployment(&failed.id, false).await {
        Ok(Some(counter)) => {
            debug!(deployment_id = %counter.id, "scheduler registered counter-deployment")
        }
        Ok(None) => {}
        Err(e) => {
            error!(
                app_id,
                deployment_id = %failed.id,
                error = %e,
                "failed to cancel deployment, aborting rollback"
            );
            return e.into();
        }
    }

    let Some(prior_version) = prior_version else {
        warn!(app_id, "no prior version captured, nothing to revert to");
        return original;
    };

    // The failed version's tasks must be gone before the revert starts.
    if let Err(e) = await_task_death(client, app_id, &failed.version, timeout).await {
        return e;
    }

    let revert = match client.set_application_version(app_id, prior_version).await {
        Ok(revert) => revert,
        Err(e) => {
            error!(app_id, version = prior_version, error = %e, "failed to submit revert");
            return e.into();
        }
    };
    info!(
        app_id,
        deployment_id = %revert.id,
        version = prior_version,
        "reverting to prior version"
    );

    match await_deployment(client, app_id, &revert, timeout).await {
        Ok(()) => {
            info!(app_id, version = prior_version, "rollback completed, prior version restored");
            RolloutError::RolledBack {
                restored_version: prior_version.to_string(),
                source: Box::new(original),
            }
        }
        Err(e) => {
            // Best-effort cleanup of the revert's own deployment; its
            // failure does not change the already-failed outcome.
            if let Err(cleanup) = client.cancel_deployment(&revert.id, true).await {
                warn!(
                    deployment_id = %revert.id,
                    error = %cleanup,
                    "failed to clean up rollback deployment"
                );
            }
            match e {
                // A timed-out reversion leaves the cluster state
                // genuinely ambiguous, unlike an ordinary timeout which
                // at least leaves the prior version intact.
                RolloutError::DeploymentTimeout { .. } => RolloutError::RollbackUnknownState {
                    app_id: app_id.to_string(),
                },
                other => other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FOREVER, FakeCluster, handle};

    fn original() -> RolloutError {
        RolloutError::DeploymentTimeout {
            deployment_id: "d1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_failure_aborts_before_any_revert() {
        let fake = FakeCluster::new().fail_cancels("cancel rejected");
        let err = run_rollback(
            &fake,
            "/app",
            &handle("d1", "v1"),
            Some("v0"),
            Duration::from_secs(60),
            original(),
        )
        .await;
        assert!(matches!(err, RolloutError::Client(_)));
        assert!(!fake.called("list_tasks"));
        assert!(!fake.called("set_version"));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_prior_version_returns_the_original_error() {
        let fake = FakeCluster::new();
        let err = run_rollback(
            &fake,
            "/app",
            &handle("d1", "v1"),
            None,
            Duration::from_secs(60),
            original(),
        )
        .await;
        assert!(matches!(err, RolloutError::DeploymentTimeout { .. }));
        assert!(fake.called("cancel d1"));
        assert!(!fake.called("list_tasks"));
        assert!(!fake.called("set_version"));
    }

    #[tokio::test(start_paused = true)]
    async fn surviving_tasks_block_the_revert() {
        let fake = FakeCluster::new().with_task("t1", "/app", "v1", FOREVER);
        let err = run_rollback(
            &fake,
            "/app",
            &handle("d1", "v1"),
            Some("v0"),
            Duration::from_secs(30),
            original(),
        )
        .await;
        assert!(matches!(err, RolloutError::TasksStillRunning { .. }));
        assert!(!fake.called("set_version"));
    }

    #[tokio::test(start_paused = true)]
    async fn successful_rollback_reports_rolled_back() {
        let fake = FakeCluster::new()
            .with_task("t1", "/app", "v1", 1)
            .with_set_version(handle("d2", "v0"));
        let err = run_rollback(
            &fake,
            "/app",
            &handle("d1", "v1"),
            Some("v0"),
            Duration::from_secs(60),
            original(),
        )
        .await;
        match err {
            RolloutError::RolledBack {
                restored_version,
                source,
            } => {
                assert_eq!(restored_version, "v0");
                assert!(matches!(*source, RolloutError::DeploymentTimeout { .. }));
            }
            other => panic!("expected RolledBack, got {other:?}"),
        }
        assert!(fake.called("set_version /app v0"));
    }

    #[tokio::test(start_paused = true)]
    async fn revert_timeout_becomes_unknown_state_and_cleans_up() {
        let fake = FakeCluster::new()
            .with_set_version(handle("d2", "v0"))
            .activate("d2", FOREVER);
        let err = run_rollback(
            &fake,
            "/app",
            &handle("d1", "v1"),
            Some("v0"),
            Duration::from_secs(60),
            original(),
        )
        .await;
        match &err {
            RolloutError::RollbackUnknownState { app_id } => assert_eq!(app_id, "/app"),
            other => panic!("expected RollbackUnknownState, got {other:?}"),
        }
        assert!(fake.called("cancel d2 force=true"));
        assert_eq!(
            err.to_string(),
            "rollback failed, application /app is in an unknown state"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn revert_transport_error_passes_through() {
        let fake = FakeCluster::new()
            .with_set_version(handle("d2", "v0"))
            .fail_lists("connection refused");
        let err = run_rollback(
            &fake,
            "/app",
            &handle("d1", "v1"),
            Some("v0"),
            Duration::from_secs(60),
            original(),
        )
        .await;
        assert!(matches!(err, RolloutError::Client(_)));
        assert!(fake.called("cancel d2 force=true"));
    }
}
