//! Identity provider access: hosted domain metadata and hosted UI customization.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{HookError, Result};

/// Metadata about a hosted authentication domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainDescription {
    /// Content-delivery hostname the domain's alias record must point to.
    pub alias_target: Option<String>,
    pub user_pool_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiCustomizationRequest {
    pub user_pool_id: String,
    pub client_id: String,
    pub css: String,
    pub logo: Vec<u8>,
}

impl UiCustomizationRequest {
    /// Both identifiers are required; an upload without them cannot be targeted.
    pub fn new(
        user_pool_id: Option<&str>,
        client_id: &str,
        css: String,
        logo: Vec<u8>,
    ) -> Result<Self> {
        let user_pool_id = user_pool_id.filter(|id| !id.is_empty()).ok_or_else(|| {
            HookError::InvalidState("no user pool id found for the hosted domain".to_string())
        })?;
        if client_id.is_empty() {
            return Err(HookError::InvalidState(
                "a client id is required for UI customization".to_string(),
            ));
        }

        Ok(Self {
            user_pool_id: user_pool_id.to_string(),
            client_id: client_id.to_string(),
            css,
            logo,
        })
    }
}

/// What the service reports as stored after an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiCustomization {
    pub css: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn describe_domain(&self, domain: &str) -> Result<DomainDescription>;

    async fn set_ui_customization(&self, request: UiCustomizationRequest)
    -> Result<UiCustomization>;
}
