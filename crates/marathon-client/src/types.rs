//! Wire types for the Marathon v2 API.
//!
//! Known fields are typed; everything else a manifest carries rides
//! along in a flattened map so it reaches the API untouched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Marathon application identifier (path-like, e.g. `/realtime/app`).
pub type AppId = String;

/// Opaque deployment identifier assigned by Marathon.
pub type DeploymentId = String;

// ── Application spec ──────────────────────────────────────────────

/// Desired state of one application, as submitted to `PUT /v2/apps/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSpec {
    pub id: AppId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpus: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instances: Option<u32>,
    /// Environment variables injected into the tasks.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<Container>,
    /// Artifacts fetched into the task sandbox before launch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fetch: Vec<FetchUri>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub health_checks: Vec<HealthCheck>,
    /// Set only for version-pinning submissions (rollback revert).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Manifest fields this client does not model (labels, upgrade
    /// strategy, port definitions, ...). Passed through verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Container section of an application spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Container type, usually "DOCKER".
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker: Option<Docker>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Docker-specific container settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Docker {
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port_mappings: Vec<PortMapping>,
    /// Arbitrary `docker run` parameters (key/value pairs).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<DockerParameter>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single port mapping for a Docker container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// A `docker run` parameter, e.g. `log-opt max-size=10m`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerParameter {
    pub key: String,
    pub value: String,
}

/// An artifact to fetch into the task sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchUri {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,
}

/// Health check attached to an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace_period_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_consecutive_failures: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Server-side records ───────────────────────────────────────────

/// Current server-side record of an application.
#[derive(Debug, Clone, Deserialize)]
pub struct App {
    pub id: AppId,
    /// Version token of the currently configured spec.
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Handle for an asynchronous rollout tracked by Marathon.
///
/// Returned by submit, revert, and (non-forced) cancel calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeploymentRef {
    #[serde(rename = "deploymentId")]
    pub id: DeploymentId,
    /// Version token the deployment is moving the application to.
    pub version: String,
}

/// Entry of the active-deployments list (`GET /v2/deployments`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: DeploymentId,
    #[serde(default)]
    pub affected_apps: Vec<AppId>,
    #[serde(default)]
    pub version: Option<String>,
}

/// A running (or staged) task of an application.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub app_id: AppId,
    /// Version of the spec this task was launched from.
    pub version: String,
}
