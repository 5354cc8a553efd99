//! Local draft storage and the monthly server-save quota.
//!
//! Local drafts are kept most-recent-first and are capacity bounded: once full, new drafts are
//! refused rather than evicting old ones. The server quota counter resets lazily, the first
//! time it is read or incremented in a new calendar month.

use crate::config::QuotaLimits;
use crate::ids::DraftId;
use crate::model::Graph;
use crate::store::{
    KeyValueStore, LOCAL_DRAFTS_KEY, SERVER_QUOTA_KEY, load_json_strict, save_json,
};
use crate::{Error, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalDraft {
    pub id: DraftId,
    pub title: String,
    pub graph: Graph,
    pub saved_at: DateTime<Utc>,
}

impl LocalDraft {
    pub fn new(graph: Graph) -> Self {
        Self {
            id: DraftId::new(),
            title: graph.center_text.clone(),
            graph,
            saved_at: Utc::now(),
        }
    }
}

/// Persisted server-save counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerQuota {
    server_save_count: u32,
    last_reset_year_month: i32,
}

/// Point-in-time view of draft and quota bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftQuotaState {
    pub local_draft_count: usize,
    pub server_save_count: u32,
    pub last_reset_year_month: i32,
}

#[derive(Debug)]
pub struct DraftQuotaManager<S> {
    store: S,
    limits: QuotaLimits,
    fixed_today: Option<NaiveDate>,
}

impl<S: KeyValueStore> DraftQuotaManager<S> {
    pub fn new(store: S, limits: QuotaLimits) -> Self {
        Self {
            store,
            limits,
            fixed_today: None,
        }
    }

    /// Overrides the calendar date used for the monthly window.
    ///
    /// Intended for tests and reproducible tooling; `None` uses the local system date.
    pub fn with_fixed_today(mut self, today: Option<NaiveDate>) -> Self {
        self.fixed_today = today;
        self
    }

    pub fn limits(&self) -> QuotaLimits {
        self.limits
    }

    /// `year * 100 + month` of the effective "today".
    pub fn current_year_month(&self) -> i32 {
        let today = self
            .fixed_today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        today.year() * 100 + today.month() as i32
    }

    pub fn local_drafts(&self) -> Result<Vec<LocalDraft>> {
        Ok(load_json_strict(&self.store, LOCAL_DRAFTS_KEY)?.unwrap_or_default())
    }

    pub fn local_draft(&self, id: DraftId) -> Result<Option<LocalDraft>> {
        Ok(self.local_drafts()?.into_iter().find(|d| d.id == id))
    }

    pub fn can_save_local_draft(&self) -> Result<bool> {
        Ok(self.local_drafts()?.len() < self.limits.local_draft_capacity)
    }

    pub fn remaining_local_slots(&self) -> Result<usize> {
        Ok(self
            .limits
            .local_draft_capacity
            .saturating_sub(self.local_drafts()?.len()))
    }

    /// Stores `draft` as the most recent local draft.
    ///
    /// Returns `false` and leaves the stored list untouched when storage is full.
    pub fn save_local_draft(&mut self, draft: LocalDraft) -> Result<bool> {
        let mut drafts = self.local_drafts()?;
        if drafts.len() >= self.limits.local_draft_capacity {
            tracing::warn!(
                capacity = self.limits.local_draft_capacity,
                "local draft storage full; draft not saved"
            );
            return Ok(false);
        }
        tracing::info!(draft = %draft.id, title = %draft.title, "saved local draft");
        drafts.insert(0, draft);
        save_json(&mut self.store, LOCAL_DRAFTS_KEY, &drafts)?;
        Ok(true)
    }

    /// Like [`DraftQuotaManager::save_local_draft`], reporting a full store as an error.
    pub fn try_save_local_draft(&mut self, draft: LocalDraft) -> Result<()> {
        if self.save_local_draft(draft)? {
            Ok(())
        } else {
            Err(Error::LocalDraftCapacityExceeded {
                capacity: self.limits.local_draft_capacity,
            })
        }
    }

    /// Replaces the stored draft with the same id, keeping its position in the list.
    pub fn update_local_draft(&mut self, draft: LocalDraft) -> Result<bool> {
        let mut drafts = self.local_drafts()?;
        let Some(slot) = drafts.iter_mut().find(|d| d.id == draft.id) else {
            return Ok(false);
        };
        *slot = draft;
        save_json(&mut self.store, LOCAL_DRAFTS_KEY, &drafts)?;
        Ok(true)
    }

    pub fn delete_local_draft(&mut self, id: DraftId) -> Result<bool> {
        let mut drafts = self.local_drafts()?;
        let before = drafts.len();
        drafts.retain(|d| d.id != id);
        if drafts.len() == before {
            return Ok(false);
        }
        save_json(&mut self.store, LOCAL_DRAFTS_KEY, &drafts)?;
        tracing::info!(draft = %id, "deleted local draft");
        Ok(true)
    }

    /// Starts a new quota window if the calendar month changed since the last reset.
    ///
    /// This is the only reset mechanism; every quota read and increment goes through it.
    pub fn refresh_monthly_window(&mut self) -> Result<DraftQuotaState> {
        let mut quota: ServerQuota =
            load_json_strict(&self.store, SERVER_QUOTA_KEY)?.unwrap_or_default();
        let current = self.current_year_month();
        if quota.last_reset_year_month != current {
            tracing::debug!(
                from = quota.last_reset_year_month,
                to = current,
                "server save quota window rolled over"
            );
            quota = ServerQuota {
                server_save_count: 0,
                last_reset_year_month: current,
            };
            save_json(&mut self.store, SERVER_QUOTA_KEY, &quota)?;
        }
        Ok(DraftQuotaState {
            local_draft_count: self.local_drafts()?.len(),
            server_save_count: quota.server_save_count,
            last_reset_year_month: quota.last_reset_year_month,
        })
    }

    pub fn can_save_to_server(&mut self) -> Result<bool> {
        let state = self.refresh_monthly_window()?;
        Ok(state.server_save_count < self.limits.monthly_server_saves)
    }

    pub fn remaining_server_saves(&mut self) -> Result<u32> {
        let state = self.refresh_monthly_window()?;
        Ok(self
            .limits
            .monthly_server_saves
            .saturating_sub(state.server_save_count))
    }

    /// Charges one server save against this month's quota.
    ///
    /// Call exactly once per confirmed remote save, after the matching local draft is deleted.
    pub fn increment_server_save_count(&mut self) -> Result<u32> {
        let state = self.refresh_monthly_window()?;
        let quota = ServerQuota {
            server_save_count: state.server_save_count + 1,
            last_reset_year_month: state.last_reset_year_month,
        };
        save_json(&mut self.store, SERVER_QUOTA_KEY, &quota)?;
        Ok(quota.server_save_count)
    }

    pub fn state(&mut self) -> Result<DraftQuotaState> {
        self.refresh_monthly_window()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
