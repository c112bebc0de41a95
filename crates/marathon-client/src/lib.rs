//! Typed client for the Marathon v2 REST API.
//!
//! This crate covers exactly the operations the rollout flow needs:
//! reading and submitting applications, listing and cancelling
//! deployments, pinning an application to a prior version, and listing
//! an application's tasks.
//!
//! # Components
//!
//! - **`types`** — Wire types (`AppSpec`, `App`, `DeploymentRef`, `Task`)
//! - **`api`** — The `ClusterApi` trait the rollout core is written against
//! - **`client`** — `MarathonClient`, the reqwest implementation
//! - **`error`** — `ClientError`

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use api::ClusterApi;
pub use client::MarathonClient;
pub use error::{ClientError, ClientResult};
pub use types::{
    App, AppSpec, Container, Deployment, DeploymentRef, Docker, DockerParameter, FetchUri,
    HealthCheck, PortMapping, Task,
};
