//! Route 53 implementation of `DnsZone`.

use async_trait::async_trait;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{
    Change, ChangeAction as SdkChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet,
    ResourceRecordSetRegion, RrType,
};

use crate::dns::{AliasRecord, ChangeAction, DnsZone};
use crate::error::{HookError, Result};

pub struct Route53Zone {
    client: aws_sdk_route53::Client,
    hosted_zone_id: String,
}

impl Route53Zone {
    pub fn new(client: aws_sdk_route53::Client, hosted_zone_id: impl Into<String>) -> Self {
        Self {
            client,
            hosted_zone_id: hosted_zone_id.into(),
        }
    }

    pub fn from_sdk_config(
        config: &aws_config::SdkConfig,
        hosted_zone_id: impl Into<String>,
    ) -> Self {
        Self::new(aws_sdk_route53::Client::new(config), hosted_zone_id)
    }

    pub fn hosted_zone_id(&self) -> &str {
        &self.hosted_zone_id
    }
}

#[async_trait]
impl DnsZone for Route53Zone {
    async fn list_records(&self, start_name: &str, max_items: i32) -> Result<Vec<AliasRecord>> {
        let response = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(&self.hosted_zone_id)
            .start_record_name(start_name)
            .max_items(max_items)
            .send()
            .await
            .map_err(|e| HookError::Dns(DisplayErrorContext(&e).to_string()))?;

        Ok(response
            .resource_record_sets()
            .iter()
            .map(from_record_set)
            .collect())
    }

    async fn change_record(
        &self,
        action: ChangeAction,
        comment: &str,
        record: &AliasRecord,
    ) -> Result<()> {
        let change = Change::builder()
            .action(SdkChangeAction::from(action.as_str()))
            .resource_record_set(to_record_set(record)?)
            .build()
            .map_err(|e| HookError::Dns(e.to_string()))?;
        let batch = ChangeBatch::builder()
            .comment(comment)
            .changes(change)
            .build()
            .map_err(|e| HookError::Dns(e.to_string()))?;

        let response = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(&self.hosted_zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| HookError::Dns(DisplayErrorContext(&e).to_string()))?;

        if let Some(info) = response.change_info() {
            tracing::debug!(
                change_id = info.id(),
                status = info.status().as_str(),
                action = action.as_str(),
                "Record change submitted"
            );
        }

        Ok(())
    }
}

fn from_record_set(set: &ResourceRecordSet) -> AliasRecord {
    AliasRecord {
        name: set.name().to_string(),
        record_type: set.r#type().as_str().to_string(),
        ttl: set.ttl(),
        set_identifier: set.set_identifier().map(str::to_string),
        region: set.region().map(|r| r.as_str().to_string()),
        values: set
            .resource_records()
            .iter()
            .map(|r| r.value().to_string())
            .collect(),
    }
}

fn to_record_set(record: &AliasRecord) -> Result<ResourceRecordSet> {
    let mut builder = ResourceRecordSet::builder()
        .name(&record.name)
        .r#type(RrType::from(record.record_type.as_str()))
        .set_ttl(record.ttl)
        .set_set_identifier(record.set_identifier.clone())
        .set_region(record.region.as_deref().map(ResourceRecordSetRegion::from));

    for value in &record.values {
        let resource_record = ResourceRecord::builder()
            .value(value)
            .build()
            .map_err(|e| HookError::Dns(e.to_string()))?;
        builder = builder.resource_records(resource_record);
    }

    builder.build().map_err(|e| HookError::Dns(e.to_string()))
}
