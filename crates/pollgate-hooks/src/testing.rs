//! In-memory zone and identity provider for exercising the hooks.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::dns::{AliasRecord, ChangeAction, DnsZone, fully_qualified};
use crate::error::{HookError, Result};
use crate::identity::{
    DomainDescription, IdentityProvider, UiCustomization, UiCustomizationRequest,
};

#[derive(Debug, Clone)]
pub(crate) struct RecordedChange {
    pub action: ChangeAction,
    pub comment: String,
    pub record: AliasRecord,
}

struct PendingChange {
    action: ChangeAction,
    record: AliasRecord,
    visible_at_list: usize,
}

#[derive(Default)]
struct ZoneState {
    records: Vec<AliasRecord>,
    pending: Vec<PendingChange>,
    changes: Vec<RecordedChange>,
    list_calls: usize,
    propagation_lists: usize,
    reject_changes: Option<String>,
}

/// A zone whose accepted changes become visible after a configurable number of listings.
#[derive(Default)]
pub(crate) struct MemoryZone {
    state: Mutex<ZoneState>,
}

impl MemoryZone {
    pub fn with_records(records: Vec<AliasRecord>) -> Self {
        let zone = Self::default();
        zone.state.lock().unwrap().records = records;
        zone
    }

    /// Accepted changes stay invisible for `lists` further listings.
    pub fn propagating_after(self, lists: usize) -> Self {
        self.state.lock().unwrap().propagation_lists = lists;
        self
    }

    pub fn rejecting_changes(self, reason: &str) -> Self {
        self.state.lock().unwrap().reject_changes = Some(reason.to_string());
        self
    }

    pub fn changes(&self) -> Vec<RecordedChange> {
        self.state.lock().unwrap().changes.clone()
    }

    pub fn records(&self) -> Vec<AliasRecord> {
        self.state.lock().unwrap().records.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }
}

#[async_trait]
impl DnsZone for MemoryZone {
    async fn list_records(&self, _start_name: &str, max_items: i32) -> Result<Vec<AliasRecord>> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;

        let now = state.list_calls;
        let (visible, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pending)
            .into_iter()
            .partition(|change| change.visible_at_list <= now);
        state.pending = pending;
        for change in visible {
            match change.action {
                ChangeAction::Create => state.records.push(change.record),
                ChangeAction::Delete => state.records.retain(|r| r != &change.record),
            }
        }

        Ok(state
            .records
            .iter()
            .take(max_items.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn change_record(
        &self,
        action: ChangeAction,
        comment: &str,
        record: &AliasRecord,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = &state.reject_changes {
            return Err(HookError::Dns(reason.clone()));
        }

        let record = AliasRecord {
            name: fully_qualified(&record.name),
            ..record.clone()
        };
        let exists = state.records.contains(&record);
        match action {
            ChangeAction::Create if exists => {
                return Err(HookError::Dns("record already exists".to_string()));
            }
            ChangeAction::Delete if !exists => {
                return Err(HookError::Dns("record not found".to_string()));
            }
            _ => {}
        }

        state.changes.push(RecordedChange {
            action,
            comment: comment.to_string(),
            record: record.clone(),
        });
        let visible_at_list = state.list_calls + 1 + state.propagation_lists;
        state.pending.push(PendingChange {
            action,
            record,
            visible_at_list,
        });
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum LastModified {
    Now,
    Ago(Duration),
    Missing,
}

pub(crate) struct MemoryIdentity {
    description: DomainDescription,
    last_modified: LastModified,
    reported_css: Option<String>,
    uploads: Mutex<Vec<UiCustomizationRequest>>,
}

impl MemoryIdentity {
    pub fn new(description: DomainDescription) -> Self {
        Self {
            description,
            last_modified: LastModified::Now,
            reported_css: None,
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn hosting(alias_target: &str, user_pool_id: &str) -> Self {
        Self::new(DomainDescription {
            alias_target: Some(alias_target.to_string()),
            user_pool_id: Some(user_pool_id.to_string()),
        })
    }

    pub fn last_modified(mut self, last_modified: LastModified) -> Self {
        self.last_modified = last_modified;
        self
    }

    /// Report `css` as stored regardless of what was uploaded.
    pub fn reporting_css(mut self, css: &str) -> Self {
        self.reported_css = Some(css.to_string());
        self
    }

    pub fn uploads(&self) -> Vec<UiCustomizationRequest> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn describe_domain(&self, _domain: &str) -> Result<DomainDescription> {
        Ok(self.description.clone())
    }

    async fn set_ui_customization(
        &self,
        request: UiCustomizationRequest,
    ) -> Result<UiCustomization> {
        let css = self
            .reported_css
            .clone()
            .unwrap_or_else(|| request.css.clone());
        self.uploads.lock().unwrap().push(request);

        let last_modified = match self.last_modified {
            LastModified::Now => Some(Utc::now()),
            LastModified::Ago(age) => chrono::TimeDelta::from_std(age)
                .ok()
                .map(|age| Utc::now() - age),
            LastModified::Missing => None,
        };

        Ok(UiCustomization {
            css: Some(css),
            last_modified,
        })
    }
}
