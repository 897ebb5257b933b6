//! Hook configuration, read from the process environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use pollgate::PollConfig;

use crate::error::{HookError, Result};
use crate::freshness::FreshnessPolicy;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_UI_CLIENT_ID: &str = "ALL";
pub const DEFAULT_CSS_PATH: &str = "./public/hosted-ui.css";
pub const DEFAULT_LOGO_PATH: &str = "./public/logo-min.png";
pub const ENV_FILE: &str = ".env";

const WARN_VAR: &str = "UI_FRESHNESS_WARN_SECS";
const FAIL_VAR: &str = "UI_FRESHNESS_FAIL_SECS";

#[derive(Debug, Clone)]
pub struct HookConfig {
    pub region: String,
    /// Hosted authentication domain; also the name of the alias record.
    pub domain_name: String,
    pub hosted_zone_id: String,
    /// Set identifier given to the alias record when it is created.
    pub domain_identifier: Option<String>,
    pub ui_client_id: String,
    pub css_path: PathBuf,
    pub logo_path: PathBuf,
    pub poll: PollConfig,
    pub freshness: FreshnessPolicy,
}

impl HookConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| HookError::Config(format!("{key} must be set")))
        };

        let freshness = freshness_from(&get);

        Ok(Self {
            region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            domain_name: required("DOMAIN_NAME")?,
            hosted_zone_id: required("HOSTED_ZONE_ID")?,
            domain_identifier: get("COGNITO_DOMAIN_IDENTIFIER"),
            ui_client_id: get("UI_CLIENT_ID").unwrap_or_else(|| DEFAULT_UI_CLIENT_ID.to_string()),
            css_path: get("UI_CSS_PATH")
                .unwrap_or_else(|| DEFAULT_CSS_PATH.to_string())
                .into(),
            logo_path: get("UI_LOGO_PATH")
                .unwrap_or_else(|| DEFAULT_LOGO_PATH.to_string())
                .into(),
            poll: PollConfig::from_lookup(&lookup),
            freshness,
        })
    }

    /// Shared SDK configuration: default credential chain, configured region.
    pub async fn load_sdk_config(&self) -> aws_config::SdkConfig {
        aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(self.region.clone()))
            .load()
            .await
    }
}

/// Load `KEY=value` lines from `path` into the process environment.
///
/// Variables already set keep their values. Returns `false` when the file does
/// not exist, which is not an error.
pub fn load_env_file(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(HookError::Config(format!(
            "failed to load {}: {e}",
            path.display()
        ))),
    }
}

/// Numeric settings follow the poll settings: malformed values are reported
/// and replaced by the defaults.
fn freshness_from(get: &impl Fn(&str) -> Option<String>) -> FreshnessPolicy {
    let defaults = FreshnessPolicy::default();
    let policy = FreshnessPolicy {
        warn_after: seconds(get, WARN_VAR).unwrap_or(defaults.warn_after),
        fail_after: seconds(get, FAIL_VAR).unwrap_or(defaults.fail_after),
    };

    if policy.warn_after > policy.fail_after {
        tracing::warn!(
            warn_secs = policy.warn_after.as_secs(),
            fail_secs = policy.fail_after.as_secs(),
            "Ignoring freshness settings, warn threshold exceeds fail threshold"
        );
        return defaults;
    }
    policy
}

fn seconds(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let raw = get(key)?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            tracing::warn!(
                variable = key,
                value = %raw,
                "Ignoring invalid freshness setting, expected a whole number of seconds"
            );
            None
        }
    }
}
