//! Cognito implementation of `IdentityProvider`.

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::DisplayErrorContext;
use aws_sdk_cognitoidentityprovider::primitives::Blob;
use chrono::{DateTime, Utc};

use crate::error::{HookError, Result};
use crate::identity::{
    DomainDescription, IdentityProvider, UiCustomization, UiCustomizationRequest,
};

pub struct CognitoIdentity {
    client: aws_sdk_cognitoidentityprovider::Client,
}

impl CognitoIdentity {
    pub fn new(client: aws_sdk_cognitoidentityprovider::Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(aws_sdk_cognitoidentityprovider::Client::new(config))
    }
}

#[async_trait]
impl IdentityProvider for CognitoIdentity {
    async fn describe_domain(&self, domain: &str) -> Result<DomainDescription> {
        let response = self
            .client
            .describe_user_pool_domain()
            .domain(domain)
            .send()
            .await
            .map_err(|e| HookError::Identity(DisplayErrorContext(&e).to_string()))?;

        Ok(response
            .domain_description()
            .map(|d| DomainDescription {
                alias_target: d.cloud_front_distribution().map(str::to_string),
                user_pool_id: d.user_pool_id().map(str::to_string),
            })
            .unwrap_or_default())
    }

    async fn set_ui_customization(
        &self,
        request: UiCustomizationRequest,
    ) -> Result<UiCustomization> {
        let response = self
            .client
            .set_ui_customization()
            .user_pool_id(request.user_pool_id)
            .client_id(request.client_id)
            .css(request.css)
            .image_file(Blob::new(request.logo))
            .send()
            .await
            .map_err(|e| HookError::Identity(DisplayErrorContext(&e).to_string()))?;

        Ok(response
            .ui_customization()
            .map(|ui| UiCustomization {
                css: ui.css().map(str::to_string),
                last_modified: ui
                    .last_modified_date()
                    .and_then(|t| to_chrono(t.secs(), t.subsec_nanos())),
            })
            .unwrap_or_default())
    }
}

fn to_chrono(secs: i64, nanos: u32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, nanos)
}
