use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use marathon_client::MarathonClient;
use marathon_rollout::{ManifestSource, Rollout, prepare};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "marathon-deploy",
    about = "Deploy an application to Marathon and roll back on failure",
    version,
)]
struct Cli {
    /// Marathon server endpoint
    #[arg(long, env = "PLUGIN_SERVER", default_value = "http://master.mesos:8080")]
    server: String,

    /// Path to the application marathonfile
    #[arg(long, env = "PLUGIN_MARATHONFILE")]
    marathonfile: Option<PathBuf>,

    /// Inline application config (deprecated, use a marathonfile)
    #[arg(long, env = "PLUGIN_APP_CONFIG")]
    app_config: Option<String>,

    /// Deployment timeout in minutes (applies to rollbacks too)
    #[arg(long, env = "PLUGIN_TIMEOUT", default_value_t = 5)]
    timeout: u64,

    /// Roll back to the previous version when the deployment fails
    #[arg(
        long,
        env = "PLUGIN_ROLLBACK",
        default_value_t = true,
        action = clap::ArgAction::Set,
    )]
    rollback: bool,
}

impl Cli {
    fn manifest_source(&self) -> Option<ManifestSource> {
        if let Some(path) = &self.marathonfile {
            return Some(ManifestSource::File(path.clone()));
        }
        self.app_config
            .as_ref()
            .map(|text| ManifestSource::Inline(text.clone()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("marathon_rollout=info".parse()?)
                .add_directive("marathon_client=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let source = cli
        .manifest_source()
        .ok_or(marathon_rollout::ManifestError::MissingInput)?;
    let spec = prepare(&source)?;

    let client = MarathonClient::new(&cli.server)?;
    let timeout = Duration::from_secs(cli.timeout * 60);
    let rollout = Rollout::new(client, timeout).with_rollback(cli.rollback);

    let outcome = rollout.run(&spec).await?;
    info!(
        app_id = %outcome.app_id,
        deployment_id = %outcome.deployment_id,
        version = %outcome.version,
        "application deployed"
    );
    Ok(())
}
