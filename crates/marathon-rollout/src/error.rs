//! Error types for the rollout engine.

use std::path::PathBuf;
use std::time::Duration;

use marathon_client::ClientError;
use thiserror::Error;

/// Errors produced while driving a rollout.
///
/// Transport and API errors propagate unchanged. The only message
/// substitutions happen at the layer that knows whether rollback
/// applies: a watch timeout becomes `RollbackDisabled` when rollback is
/// off, and a timeout of the reversion itself becomes
/// `RollbackUnknownState` because at that point the cluster's true
/// state is unknown to the caller.
#[derive(Debug, Error)]
pub enum RolloutError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("deployment {deployment_id} did not complete within {timeout:?}")]
    DeploymentTimeout {
        deployment_id: String,
        timeout: Duration,
    },

    #[error("tasks of {app_id} still running version {version} after {timeout:?}")]
    TasksStillRunning {
        app_id: String,
        version: String,
        timeout: Duration,
    },

    #[error("deployment failed and rollback is not enabled: {source}")]
    RollbackDisabled { source: Box<RolloutError> },

    /// The rollout failed but the prior version was restored. Still an
    /// error: rollback restores safety, it does not make the attempted
    /// rollout succeed.
    #[error("deployment failed, rolled back to version {restored_version}: {source}")]
    RolledBack {
        restored_version: String,
        source: Box<RolloutError>,
    },

    #[error("rollback failed, application {app_id} is in an unknown state")]
    RollbackUnknownState { app_id: String },
}

/// Errors produced while preparing a manifest into an `AppSpec`.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("no marathonfile or inline app config provided")]
    MissingInput,

    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("manifest is neither a JSON object nor a YAML mapping")]
    Unrecognized,

    #[error("manifest is missing the 'id' key")]
    MissingId,

    #[error("failed to decode manifest: {0}")]
    Decode(#[from] serde_json::Error),
}
