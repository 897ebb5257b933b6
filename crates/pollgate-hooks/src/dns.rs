//! DNS zone access for the hosted auth domain's alias record.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{HookError, Result};

pub const CNAME: &str = "CNAME";

/// Records requested per listing; the alias sorts first from its own name.
pub const LIST_PAGE_SIZE: i32 = 50;

pub const ALIAS_TTL: i64 = 300;

/// A record set as stored in the zone.
///
/// Deleting a record requires sending it back exactly as listed, so every field
/// the zone returned is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasRecord {
    /// Fully qualified name, with trailing dot when read from the zone.
    pub name: String,
    pub record_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub values: Vec<String>,
}

impl AliasRecord {
    pub fn cname(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: CNAME.to_string(),
            ttl: Some(ALIAS_TTL),
            set_identifier: None,
            region: None,
            values: vec![target.into()],
        }
    }

    pub fn with_set_identifier(mut self, set_identifier: Option<String>) -> Self {
        self.set_identifier = set_identifier;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// JSON rendering for structured log fields.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }

    /// Whether this is the CNAME record for `domain`.
    pub fn is_alias_for(&self, domain: &str) -> bool {
        self.record_type == CNAME && self.name == fully_qualified(domain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Create,
    Delete,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Delete => "DELETE",
        }
    }
}

/// A hosted zone that can be listed and changed one record at a time.
#[async_trait]
pub trait DnsZone: Send + Sync {
    /// List up to `max_items` record sets, in zone order, starting at `start_name`.
    async fn list_records(&self, start_name: &str, max_items: i32) -> Result<Vec<AliasRecord>>;

    /// Submit a single-change batch. The change is atomic on the zone side.
    async fn change_record(
        &self,
        action: ChangeAction,
        comment: &str,
        record: &AliasRecord,
    ) -> Result<()>;
}

/// All CNAME records named exactly `domain`.
pub async fn find_alias_records(zone: &dyn DnsZone, domain: &str) -> Result<Vec<AliasRecord>> {
    let records = zone.list_records(domain, LIST_PAGE_SIZE).await?;
    Ok(records
        .into_iter()
        .filter(|record| record.is_alias_for(domain))
        .collect())
}

/// There must never be more than one alias record for the hosted domain.
pub(crate) fn too_many_records(domain: &str, count: usize) -> HookError {
    HookError::InvalidState(format!(
        "{count} records found under domain {domain}, there should be at most one alias record"
    ))
}

pub fn fully_qualified(domain: &str) -> String {
    if domain.ends_with('.') {
        domain.to_string()
    } else {
        format!("{domain}.")
    }
}
