use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use pollgate_hooks::config::{ENV_FILE, load_env_file};
use pollgate_hooks::{
    CognitoIdentity, HOOKS_VERSION, HookConfig, Route53Zone, init_tracing, post_deploy,
};
use tracing::Instrument;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let env_file = load_env_file(Path::new(ENV_FILE));
    init_tracing();
    match env_file {
        Ok(true) => tracing::debug!(path = ENV_FILE, "Loaded environment file"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring environment file"),
    }
    tracing::info!(version = HOOKS_VERSION, "Starting post-deploy");

    let span = tracing::info_span!("post_deploy", service = "post-deploy");
    match run().instrument(span).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Post-deploy failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = HookConfig::from_env().context("failed to load configuration")?;
    let sdk_config = config.load_sdk_config().await;
    let zone = Route53Zone::from_sdk_config(&sdk_config, &config.hosted_zone_id);
    let identity = CognitoIdentity::from_sdk_config(&sdk_config);

    post_deploy::run(&zone, &identity, &config).await?;
    Ok(())
}
