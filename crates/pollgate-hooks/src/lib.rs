//! Deployment hooks for a hosted authentication domain.
//!
//! `pre_deploy` removes the domain's alias record so the identity provider can
//! rebind the domain; `post_deploy` recreates it, pushes the hosted UI
//! customization and waits for the zone to list the record again. Both run
//! their actions as prerequisites of a `pollgate` session.

pub mod assets;
pub mod cognito;
pub mod config;
pub mod dns;
pub mod error;
pub mod freshness;
pub mod identity;
pub mod logging;
pub mod post_deploy;
pub mod pre_deploy;
pub mod route53;

#[cfg(test)]
pub(crate) mod testing;

pub use assets::UiAssets;
pub use cognito::CognitoIdentity;
pub use config::HookConfig;
pub use dns::{AliasRecord, ChangeAction, DnsZone};
pub use error::{HookError, Result};
pub use freshness::{Freshness, FreshnessPolicy};
pub use identity::{DomainDescription, IdentityProvider, UiCustomization, UiCustomizationRequest};
pub use logging::init_tracing;
pub use route53::Route53Zone;

/// pollgate-hooks version from Cargo.toml
pub const HOOKS_VERSION: &str = env!("CARGO_PKG_VERSION");
