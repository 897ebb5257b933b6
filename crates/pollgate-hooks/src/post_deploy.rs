//! Post-deploy: recreate the hosted domain's alias record, push the hosted UI
//! customization, and wait until the zone lists the new record.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use pollgate::{Poller, Prerequisite};

use crate::assets::UiAssets;
use crate::config::HookConfig;
use crate::dns::{AliasRecord, ChangeAction, DnsZone, find_alias_records, too_many_records};
use crate::error::HookError;
use crate::freshness::{Freshness, FreshnessPolicy};
use crate::identity::{IdentityProvider, UiCustomization, UiCustomizationRequest};

pub const CREATE_COMMENT: &str = "Create the cognito domain alias CNAME record after deploy";

/// Outcome of checking what the identity provider reports after an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiVerification {
    Verified,
    /// No last-modified time was reported, so the logo upload cannot be confirmed.
    LogoUnverified,
    Stale(Duration),
}

/// The record to create: the domain pointed at the identity provider's alias target.
///
/// The zone only accepts a region on records that also carry a set identifier.
pub fn alias_record_for(config: &HookConfig, alias_target: &str) -> AliasRecord {
    let record = AliasRecord::cname(config.domain_name.as_str(), alias_target)
        .with_set_identifier(config.domain_identifier.clone());
    if record.set_identifier.is_some() {
        record.with_region(config.region.as_str())
    } else {
        record
    }
}

/// Submit a create for the domain's alias record unless one is already listed.
pub async fn create_alias_record(
    zone: &dyn DnsZone,
    identity: &dyn IdentityProvider,
    config: &HookConfig,
) -> anyhow::Result<()> {
    let domain = config.domain_name.as_str();

    let existing = find_alias_records(zone, domain).await?;
    if !existing.is_empty() {
        tracing::warn!(
            domain,
            count = existing.len(),
            "Alias record already exists, verify it points at the user pool's alias target"
        );
        return Ok(());
    }

    let description = identity.describe_domain(domain).await?;
    let alias_target = description.alias_target.ok_or_else(|| {
        HookError::InvalidState(format!("no alias target found for domain {domain}"))
    })?;

    let record = alias_record_for(config, &alias_target);
    tracing::info!(domain, record = %record.to_json(), "Creating alias record");
    zone.change_record(ChangeAction::Create, CREATE_COMMENT, &record)
        .await?;
    Ok(())
}

/// Upload the stylesheet and logo for the domain's user pool and check what was stored.
pub async fn upload_ui_customization(
    identity: &dyn IdentityProvider,
    config: &HookConfig,
    assets: &UiAssets,
) -> anyhow::Result<()> {
    let domain = config.domain_name.as_str();
    let description = identity.describe_domain(domain).await?;

    let request = UiCustomizationRequest::new(
        description.user_pool_id.as_deref(),
        &config.ui_client_id,
        assets.css.clone(),
        assets.logo.clone(),
    )?;
    tracing::info!(
        user_pool_id = %request.user_pool_id,
        client_id = %request.client_id,
        css_bytes = request.css.len(),
        logo_bytes = request.logo.len(),
        "Uploading hosted UI customization"
    );

    let stored = identity.set_ui_customization(request).await?;
    match verify_ui_customization(&assets.css, &stored, &config.freshness, Utc::now())? {
        UiVerification::Verified => {
            tracing::info!(domain, "Hosted UI customization verified");
        }
        UiVerification::LogoUnverified => {
            tracing::warn!(domain, "No last modified date reported, logo upload unverified");
        }
        UiVerification::Stale(elapsed) => {
            tracing::warn!(
                domain,
                elapsed_ms = elapsed.as_millis(),
                "Hosted UI customization last modified longer ago than expected"
            );
        }
    }
    Ok(())
}

/// Compare what the identity provider stored against what was uploaded.
pub fn verify_ui_customization(
    uploaded_css: &str,
    stored: &UiCustomization,
    policy: &FreshnessPolicy,
    now: DateTime<Utc>,
) -> Result<UiVerification, HookError> {
    if stored.css.as_deref() != Some(uploaded_css) {
        return Err(HookError::VerificationMismatch(
            "stored stylesheet differs from the uploaded one".to_string(),
        ));
    }

    let Some(last_modified) = stored.last_modified else {
        return Ok(UiVerification::LogoUnverified);
    };

    match policy.classify(last_modified, now) {
        Freshness::Fresh => Ok(UiVerification::Verified),
        Freshness::Stale(elapsed) => Ok(UiVerification::Stale(elapsed)),
        Freshness::Expired(elapsed) => Err(HookError::VerificationMismatch(format!(
            "customization last modified {}s ago, the upload was not stored",
            elapsed.as_secs()
        ))),
    }
}

/// `true` once the zone lists exactly one alias record for `domain`.
pub async fn verify_created(zone: &dyn DnsZone, domain: &str) -> anyhow::Result<bool> {
    let records = find_alias_records(zone, domain).await?;

    match records.len() {
        0 => Ok(false),
        1 => {
            tracing::info!(domain, "Alias record creation verified");
            Ok(true)
        }
        n => Err(too_many_records(domain, n).into()),
    }
}

pub async fn run(
    zone: &dyn DnsZone,
    identity: &dyn IdentityProvider,
    config: &HookConfig,
) -> Result<(), HookError> {
    let assets = UiAssets::load(&config.css_path, &config.logo_path).await?;
    let domain = config.domain_name.as_str();

    let prerequisites: Vec<Prerequisite<'_>> = vec![
        create_alias_record(zone, identity, config).boxed(),
        upload_ui_customization(identity, config, &assets).boxed(),
    ];

    Poller::new(config.poll)
        .with_prerequisites(prerequisites, || verify_created(zone, domain))
        .await?;

    tracing::info!(domain, "Post-deploy reconciliation complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use chrono::TimeDelta;
    use tokio::time::Instant;

    use super::*;
    use crate::identity::DomainDescription;
    use crate::testing::{LastModified, MemoryIdentity, MemoryZone};

    const DOMAIN: &str = "auth.example.com";
    const TARGET: &str = "d111.cloudfront.net";
    const POOL: &str = "us-east-1_abc123";
    const CSS: &str = ".banner-customizable { background-color: #2f3e46; }";

    fn config_in(dir: &Path, extra: &[(&str, &str)]) -> HookConfig {
        let css_path = dir.join("hosted-ui.css");
        let logo_path = dir.join("logo-min.png");
        std::fs::write(&css_path, CSS).unwrap();
        std::fs::write(&logo_path, [0x89, b'P', b'N', b'G']).unwrap();

        let mut pairs = vec![
            ("DOMAIN_NAME".to_string(), DOMAIN.to_string()),
            ("HOSTED_ZONE_ID".to_string(), "Z0123456789".to_string()),
            ("UI_CSS_PATH".to_string(), css_path.display().to_string()),
            ("UI_LOGO_PATH".to_string(), logo_path.display().to_string()),
        ];
        pairs.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        HookConfig::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    fn stored(css: &str, last_modified: Option<DateTime<Utc>>) -> UiCustomization {
        UiCustomization {
            css: Some(css.to_string()),
            last_modified,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn creates_record_and_uploads_customization() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), &[]);
        let zone = MemoryZone::default();
        let identity = MemoryIdentity::hosting(TARGET, POOL);

        run(&zone, &identity, &config).await.unwrap();

        let changes = zone.changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, ChangeAction::Create);
        assert_eq!(changes[0].comment, CREATE_COMMENT);
        assert_eq!(changes[0].record.name, "auth.example.com.");
        assert_eq!(changes[0].record.values, vec![TARGET.to_string()]);

        let uploads = identity.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].user_pool_id, POOL);
        assert_eq!(uploads[0].client_id, "ALL");
        assert_eq!(uploads[0].css, CSS);
        assert_eq!(uploads[0].logo, vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_propagation_is_checked_again() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), &[]);
        let zone = MemoryZone::default().propagating_after(2);
        let identity = MemoryIdentity::hosting(TARGET, POOL);
        let start = Instant::now();

        run(&zone, &identity, &config).await.unwrap();

        assert_eq!(zone.list_calls(), 4);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn existing_record_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), &[]);
        let zone = MemoryZone::with_records(vec![AliasRecord::cname(
            "auth.example.com.",
            "d999.cloudfront.net",
        )]);
        let identity = MemoryIdentity::hosting(TARGET, POOL);

        run(&zone, &identity, &config).await.unwrap();

        assert!(zone.changes().is_empty());
        assert_eq!(identity.uploads().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_alias_target_is_invalid_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), &[]);
        let zone = MemoryZone::default();
        let identity = MemoryIdentity::new(DomainDescription {
            alias_target: None,
            user_pool_id: Some(POOL.to_string()),
        });

        let err = run(&zone, &identity, &config).await.unwrap_err();

        assert!(err.is_invalid_state());
        assert!(zone.changes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_user_pool_is_invalid_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), &[]);
        let zone = MemoryZone::default();
        let identity = MemoryIdentity::new(DomainDescription {
            alias_target: Some(TARGET.to_string()),
            user_pool_id: None,
        });

        let err = run(&zone, &identity, &config).await.unwrap_err();

        assert!(err.is_invalid_state());
        assert!(identity.uploads().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stylesheet_mismatch_fails_verification() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), &[]);
        let zone = MemoryZone::default();
        let identity = MemoryIdentity::hosting(TARGET, POOL).reporting_css(".old {}");

        let err = run(&zone, &identity, &config).await.unwrap_err();

        assert!(err.is_verification_mismatch());
    }

    #[tokio::test(start_paused = true)]
    async fn old_customization_fails_verification() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), &[]);
        let zone = MemoryZone::default();
        let identity = MemoryIdentity::hosting(TARGET, POOL)
            .last_modified(LastModified::Ago(Duration::from_secs(3600)));

        let err = run(&zone, &identity, &config).await.unwrap_err();

        assert!(err.is_verification_mismatch());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_last_modified_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), &[]);
        let zone = MemoryZone::default();
        let identity = MemoryIdentity::hosting(TARGET, POOL).last_modified(LastModified::Missing);

        run(&zone, &identity, &config).await.unwrap();
    }

    #[tokio::test]
    async fn missing_asset_fails_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path(), &[]);
        config.logo_path = dir.path().join("absent.png");
        let zone = MemoryZone::default();
        let identity = MemoryIdentity::hosting(TARGET, POOL);

        let err = run(&zone, &identity, &config).await.unwrap_err();

        assert!(matches!(err, HookError::Asset { .. }));
        assert_eq!(zone.list_calls(), 0);
        assert!(identity.uploads().is_empty());
    }

    #[test]
    fn record_region_follows_set_identifier() {
        let dir = tempfile::tempdir().unwrap();

        let plain = alias_record_for(&config_in(dir.path(), &[]), TARGET);
        assert_eq!(plain.set_identifier, None);
        assert_eq!(plain.region, None);

        let config = config_in(
            dir.path(),
            &[
                ("COGNITO_DOMAIN_IDENTIFIER", "cognito-auth"),
                ("AWS_REGION", "eu-west-1"),
            ],
        );
        insta::assert_json_snapshot!(alias_record_for(&config, TARGET), @r#"
        {
          "name": "auth.example.com",
          "record_type": "CNAME",
          "ttl": 300,
          "set_identifier": "cognito-auth",
          "region": "eu-west-1",
          "values": [
            "d111.cloudfront.net"
          ]
        }
        "#);
    }

    #[test]
    fn verification_applies_freshness_policy() {
        let policy = FreshnessPolicy::default();
        let now = Utc::now();

        assert_eq!(
            verify_ui_customization(CSS, &stored(CSS, Some(now)), &policy, now).unwrap(),
            UiVerification::Verified
        );
        assert_eq!(
            verify_ui_customization(CSS, &stored(CSS, None), &policy, now).unwrap(),
            UiVerification::LogoUnverified
        );

        let five_ago = now - TimeDelta::seconds(5);
        assert_eq!(
            verify_ui_customization(CSS, &stored(CSS, Some(five_ago)), &policy, now).unwrap(),
            UiVerification::Stale(Duration::from_secs(5))
        );

        let minute_ago = now - TimeDelta::seconds(60);
        let err = verify_ui_customization(CSS, &stored(CSS, Some(minute_ago)), &policy, now)
            .unwrap_err();
        assert!(matches!(err, HookError::VerificationMismatch(_)));
    }

    #[test]
    fn verification_rejects_missing_stylesheet() {
        let customization = UiCustomization {
            css: None,
            last_modified: Some(Utc::now()),
        };
        let err = verify_ui_customization(
            CSS,
            &customization,
            &FreshnessPolicy::default(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(err.is_verification_mismatch());
    }

    #[tokio::test]
    async fn verify_counts_records() {
        let record = AliasRecord::cname("auth.example.com.", TARGET);

        let zone = MemoryZone::default();
        assert!(!verify_created(&zone, DOMAIN).await.unwrap());

        let zone = MemoryZone::with_records(vec![record.clone()]);
        assert!(verify_created(&zone, DOMAIN).await.unwrap());

        let zone = MemoryZone::with_records(vec![record.clone(), record]);
        assert!(verify_created(&zone, DOMAIN).await.is_err());
    }
}
