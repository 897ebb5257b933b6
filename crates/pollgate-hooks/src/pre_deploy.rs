//! Pre-deploy: remove the hosted domain's alias record and wait until the zone
//! no longer lists it.

use futures::FutureExt;
use pollgate::{Poller, Prerequisite};

use crate::config::HookConfig;
use crate::dns::{ChangeAction, DnsZone, find_alias_records, too_many_records};
use crate::error::HookError;

pub const DELETE_COMMENT: &str = "Delete the cognito domain alias CNAME record before deploy";

/// Submit a delete for the domain's alias record, if there is one.
pub async fn delete_existing_alias_record(zone: &dyn DnsZone, domain: &str) -> anyhow::Result<()> {
    let records = find_alias_records(zone, domain).await?;

    match records.as_slice() {
        [] => {
            tracing::info!(domain, "Alias record already deleted");
            Ok(())
        }
        [record] => {
            tracing::info!(domain, record = %record.to_json(), "Deleting alias record");
            zone.change_record(ChangeAction::Delete, DELETE_COMMENT, record)
                .await?;
            Ok(())
        }
        many => Err(too_many_records(domain, many.len()).into()),
    }
}

/// `true` once the zone lists no alias record for `domain`.
pub async fn verify_deleted(zone: &dyn DnsZone, domain: &str) -> anyhow::Result<bool> {
    let records = find_alias_records(zone, domain).await?;

    match records.len() {
        0 => {
            tracing::info!(domain, "Alias record deletion verified");
            Ok(true)
        }
        1 => Ok(false),
        n => Err(too_many_records(domain, n).into()),
    }
}

pub async fn run(zone: &dyn DnsZone, config: &HookConfig) -> Result<(), HookError> {
    let domain = config.domain_name.as_str();
    let prerequisites: Vec<Prerequisite<'_>> =
        vec![delete_existing_alias_record(zone, domain).boxed()];

    Poller::new(config.poll)
        .with_prerequisites(prerequisites, || verify_deleted(zone, domain))
        .await?;

    tracing::info!(domain, "Pre-deploy reconciliation complete");
    Ok(())
}
