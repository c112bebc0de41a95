//! Manifest preparation — raw manifest text to a normalized `AppSpec`.
//!
//! Manifests are human-authored YAML or JSON. Preparation expands
//! `${VAR}` environment placeholders, sniffs the format, requires the
//! identifying `id` key, and fills in the defaults Marathon would
//! otherwise pick surprising values for (fetch extraction, health-check
//! timing, container log rotation).

use std::path::PathBuf;
use std::sync::LazyLock;

use marathon_client::{AppSpec, DockerParameter};
use regex::{Captures, Regex};
use tracing::{info, warn};

use crate::error::ManifestError;

/// Where the manifest text comes from.
#[derive(Debug, Clone)]
pub enum ManifestSource {
    /// A marathonfile on disk.
    File(PathBuf),
    /// Manifest text passed inline. Deprecated in favor of a file.
    Inline(String),
}

/// Prepare a manifest into a normalized application spec.
///
/// No network traffic happens here: a manifest that fails preparation
/// never reaches the scheduler.
pub fn prepare(source: &ManifestSource) -> Result<AppSpec, ManifestError> {
    let raw = read_input(source)?;
    let expanded = expand_env(&raw);
    let value = sniff_to_json(&expanded)?;

    let obj = value.as_object().ok_or(ManifestError::Unrecognized)?;
    if !obj.contains_key("id") {
        return Err(ManifestError::MissingId);
    }

    let mut spec: AppSpec = serde_json::from_value(value)?;
    normalize(&mut spec);
    Ok(spec)
}

fn read_input(source: &ManifestSource) -> Result<String, ManifestError> {
    match source {
        ManifestSource::File(path) => {
            info!(path = %path.display(), "reading marathonfile");
            std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
                path: path.clone(),
                source,
            })
        }
        ManifestSource::Inline(text) => {
            warn!("inline app config is deprecated and will be removed, use a marathonfile instead");
            Ok(text.clone())
        }
    }
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:(\$)|\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("placeholder regex")
});

/// Expand `${VAR}` and `$VAR` placeholders from the process environment.
///
/// Unset variables expand to the empty string; `$$` escapes a literal
/// dollar sign.
pub fn expand_env(text: &str) -> String {
    expand_with(text, |name| std::env::var(name).ok())
}

fn expand_with(text: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                return "$".to_string();
            }
            let name = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            lookup(name).unwrap_or_default()
        })
        .into_owned()
}

/// Detect the manifest format and produce a JSON value.
///
/// JSON is tried first; anything else is handed to the YAML parser and
/// converted. Only top-level objects/mappings qualify.
fn sniff_to_json(text: &str) -> Result<serde_json::Value, ManifestError> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
        if value.is_object() {
            return Ok(value);
        }
        return Err(ManifestError::Unrecognized);
    }

    match serde_yaml::from_str::<serde_yaml::Value>(text) {
        Ok(value) if value.is_mapping() => {
            info!("manifest is YAML, converting to JSON");
            serde_json::to_value(value).map_err(ManifestError::Decode)
        }
        _ => Err(ManifestError::Unrecognized),
    }
}

/// Archive suffixes Mesos auto-extracts in the task sandbox.
const ARCHIVE_SUFFIXES: &[&str] = &[
    ".tgz", ".tar.gz", ".tbz2", ".tar.bz2", ".txz", ".tar.xz", ".zip",
];

/// Marathon health-check timing defaults.
const GRACE_PERIOD_SECS: u32 = 300;
const INTERVAL_SECS: u32 = 60;
const TIMEOUT_SECS: u32 = 20;
const MAX_CONSECUTIVE_FAILURES: u32 = 3;

/// Fill in defaults the scheduler leaves to the client.
fn normalize(spec: &mut AppSpec) {
    for fetch in &mut spec.fetch {
        let is_archive = ARCHIVE_SUFFIXES.iter().any(|s| fetch.uri.ends_with(s));
        fetch.extract.get_or_insert(is_archive);
        fetch.executable.get_or_insert(false);
        fetch.cache.get_or_insert(false);
    }

    for check in &mut spec.health_checks {
        check.grace_period_seconds.get_or_insert(GRACE_PERIOD_SECS);
        check.interval_seconds.get_or_insert(INTERVAL_SECS);
        check.timeout_seconds.get_or_insert(TIMEOUT_SECS);
        check
            .max_consecutive_failures
            .get_or_insert(MAX_CONSECUTIVE_FAILURES);
    }

    // Docker tasks get log rotation unless the manifest sets its own.
    if let Some(docker) = spec.container.as_mut().and_then(|c| c.docker.as_mut()) {
        if !docker.parameters.iter().any(|p| p.key == "log-opt") {
            docker.parameters.push(DockerParameter {
                key: "log-opt".to_string(),
                value: "max-size=10m".to_string(),
            });
            docker.parameters.push(DockerParameter {
                key: "log-opt".to_string(),
                value: "max-file=3".to_string(),
            });
        }
    }
}
