//! Rollout engine for Marathon deployments.
//!
//! Drives one application rollout against a remote Marathon scheduler
//! and leaves the cluster in a known-good state even when the rollout
//! fails: submit the new spec, watch the resulting deployment until it
//! completes or a deadline fires, and — on timeout — cancel the failed
//! deployment, confirm its tasks have actually died, revert to the last
//! known-good version, and watch that reversion under the same deadline.
//!
//! # Components
//!
//! - **`manifest`** — Manifest text → normalized `AppSpec` (env expansion, format sniffing, defaults)
//! - **`poll`** — Deadline-bounded poll loop shared by the watchers
//! - **`watch`** — Waits for a deployment to leave the active list
//! - **`tasks`** — Waits for tasks of a torn-down version to die
//! - **`rollback`** — The recovery protocol for failed deployments
//! - **`rollout`** — Top-level orchestrator
//! - **`error`** — `RolloutError` / `ManifestError`

pub mod error;
pub mod manifest;
pub mod poll;
pub mod rollback;
pub mod rollout;
pub mod tasks;
pub mod watch;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ManifestError, RolloutError};
pub use manifest::{ManifestSource, prepare};
pub use rollout::{Rollout, RolloutOutcome};
