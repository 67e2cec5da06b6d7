//! Per-run memoization of fetched modules, keyed by canonical URL.
//!
//! Each URL owns a slot. The table-wide lock is held only to find or create
//! a slot; the fetch itself runs under the slot's own lock, so different URLs
//! download in parallel while concurrent requests for the same URL wait for
//! the first one and then reuse its result.
//!
//! Local paths are assigned over the finished table (see [`ModuleTable::entries`]),
//! so they do not depend on which fetch happened to complete first.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::FetchError;
use crate::fetch::Fetch;
use crate::url_model::plan_layout;

/// A fetched module with its place in the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    /// Canonical URL (the table key).
    pub url: String,
    /// Path relative to the output directory.
    pub local_path: String,
    pub content: Arc<str>,
}

type Slot = Mutex<Option<Arc<str>>>;

/// Module table for one run. Construct a fresh one per run.
#[derive(Debug, Default)]
pub struct ModuleTable {
    slots: Mutex<HashMap<String, Arc<Slot>>>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored content for `url`, fetching it on first request.
    ///
    /// At most one successful fetch happens per URL. A failed fetch stores
    /// nothing, so a later call tries again.
    pub fn get_or_load<F>(&self, url: &str, fetcher: &F) -> Result<Arc<str>, FetchError>
    where
        F: Fetch + ?Sized,
    {
        let slot = {
            let mut slots = self.lock_slots();
            Arc::clone(slots.entry(url.to_string()).or_default())
        };

        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(content) = guard.as_ref() {
            tracing::debug!(url, "module cache hit");
            return Ok(Arc::clone(content));
        }

        let content: Arc<str> = Arc::from(fetcher.fetch(url)?);
        tracing::debug!(url, bytes = content.len(), "module cached");
        *guard = Some(Arc::clone(&content));
        Ok(content)
    }

    /// Stored content for `url`, without loading.
    pub fn get(&self, url: &str) -> Option<Arc<str>> {
        let slot = self.lock_slots().get(url).cloned()?;
        let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    /// Snapshot of every stored module, sorted by URL, with local paths
    /// assigned. Slots whose fetch failed (or is still in flight) are skipped.
    pub fn entries(&self) -> Vec<ModuleEntry> {
        let filled = self.filled();
        let mut layout = plan_layout(filled.iter().map(|(url, _)| url.as_str()));
        let mut out: Vec<ModuleEntry> = filled
            .into_iter()
            .filter_map(|(url, content)| {
                let local_path = layout.remove(&url)?;
                Some(ModuleEntry {
                    url,
                    local_path,
                    content,
                })
            })
            .collect();
        out.sort_by(|a, b| a.url.cmp(&b.url));
        out
    }

    /// Number of stored modules.
    pub fn len(&self) -> usize {
        self.filled().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn filled(&self) -> Vec<(String, Arc<str>)> {
        let slots: Vec<(String, Arc<Slot>)> = self
            .lock_slots()
            .iter()
            .map(|(url, slot)| (url.clone(), Arc::clone(slot)))
            .collect();
        slots
            .into_iter()
            .filter_map(|(url, slot)| {
                let content = slot.lock().unwrap_or_else(PoisonError::into_inner).clone()?;
                Some((url, content))
            })
            .collect()
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, Arc<Slot>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
