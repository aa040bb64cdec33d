//! Pending-approval store with atomic create/resolve
//!
//! The in-memory map is authoritative; `resolve` is a single
//! check-and-set under one lock, so exactly one caller observes a
//! successful transition for a given id even when duplicate decision
//! events arrive interleaved. An optional durable spool mirrors records
//! as JSON files in one directory per state and reloads pending records
//! on startup.

use super::types::{ApprovalId, ApprovalStatus, DecisionAction, PendingApproval, StatusCounts};
use crate::error::{HeraldError, Result};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Thread-safe store for drafts awaiting a human decision
pub struct ApprovalStore {
    inner: Mutex<StoreInner>,
}

struct StoreInner {
    records: HashMap<ApprovalId, PendingApproval>,
    spool: Option<Spool>,
    closed: bool,
}

impl ApprovalStore {
    /// Create a purely in-memory store; approvals are lost on restart
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                records: HashMap::new(),
                spool: None,
                closed: false,
            }),
        }
    }

    /// Open a durable store rooted at `dir`, reloading any pending
    /// records a previous process left behind.
    pub fn with_spool<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let spool = Spool::open(dir.as_ref())?;
        let mut records = HashMap::new();

        for record in spool.load_pending()? {
            records.insert(record.id.clone(), record);
        }

        if !records.is_empty() {
            log::info!(
                "Reloaded {} pending approval(s) from {}",
                records.len(),
                dir.as_ref().display()
            );
        }

        Ok(Self {
            inner: Mutex::new(StoreInner {
                records,
                spool: Some(spool),
                closed: false,
            }),
        })
    }

    /// Register a new draft and return its fresh id
    pub fn create(&self, content: impl Into<String>) -> Result<ApprovalId> {
        let mut inner = self.inner.lock().expect("approval store lock poisoned");

        if inner.closed {
            return Err(HeraldError::Workflow(
                "Store is draining; new submissions are rejected".to_string(),
            ));
        }

        let mut record = PendingApproval::new(content.into());
        // uuid collisions are not expected; the loop keeps the no-reuse
        // invariant unconditional anyway.
        while inner.records.contains_key(&record.id) {
            record.id = ApprovalId::new();
        }

        if let Some(spool) = &inner.spool {
            spool.write(&record)?;
        }

        let id = record.id.clone();
        inner.records.insert(id.clone(), record);

        log::debug!("Created pending approval {}", id);
        Ok(id)
    }

    /// Atomically resolve a pending record.
    ///
    /// Returns the updated record, or `None` when the id is unknown or
    /// already terminal; the caller reports that as "already processed"
    /// and must not trigger any side effect.
    pub fn resolve(&self, id: &ApprovalId, action: DecisionAction) -> Option<PendingApproval> {
        let mut inner = self.inner.lock().expect("approval store lock poisoned");

        let record = inner.records.get_mut(id)?;
        if record.status != ApprovalStatus::Pending {
            return None;
        }

        let status = match action {
            DecisionAction::Approve => ApprovalStatus::Approved,
            DecisionAction::Reject => ApprovalStatus::Rejected,
        };
        record.settle(status);
        let resolved = record.clone();

        if let Some(spool) = &inner.spool {
            // The in-memory transition already happened; a spool failure
            // must not undo it or fail the decision.
            if let Err(e) = spool.transition(&resolved, ApprovalStatus::Pending) {
                log::error!("Failed to spool resolution of {}: {}", id, e);
            }
        }

        Some(resolved)
    }

    /// Expire pending records older than `max_age` and prune terminal
    /// records of the same age. Returns how many records were expired.
    pub fn expire(&self, max_age: std::time::Duration) -> usize {
        let max_age = Duration::from_std(max_age).unwrap_or(Duration::MAX);
        let now = Utc::now();
        let mut inner = self.inner.lock().expect("approval store lock poisoned");

        let stale: Vec<ApprovalId> = inner
            .records
            .values()
            .filter(|r| r.age(now) > max_age)
            .map(|r| r.id.clone())
            .collect();

        let mut expired = 0;
        for id in stale {
            let mut record = inner
                .records
                .remove(&id)
                .expect("stale id collected under the same lock");

            if record.status == ApprovalStatus::Pending {
                record.settle(ApprovalStatus::Expired);
                expired += 1;
                log::info!("Expired pending approval {}", id);

                if let Some(spool) = &inner.spool {
                    if let Err(e) = spool.transition(&record, ApprovalStatus::Pending) {
                        log::error!("Failed to spool expiry of {}: {}", id, e);
                    }
                }
            }
        }

        expired
    }

    /// Look up a record by id
    pub fn get(&self, id: &ApprovalId) -> Option<PendingApproval> {
        let inner = self.inner.lock().expect("approval store lock poisoned");
        inner.records.get(id).cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.counts().pending
    }

    /// Per-state counts over the records currently held
    pub fn counts(&self) -> StatusCounts {
        let inner = self.inner.lock().expect("approval store lock poisoned");
        let mut counts = StatusCounts::default();
        for record in inner.records.values() {
            counts.increment(record.status);
        }
        counts
    }

    /// Begin draining: reject new submissions while still resolving
    /// in-flight decisions.
    pub fn close(&self) {
        let mut inner = self.inner.lock().expect("approval store lock poisoned");
        inner.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        let inner = self.inner.lock().expect("approval store lock poisoned");
        inner.closed
    }
}

/// Durable JSON spool, one directory per state
struct Spool {
    root: PathBuf,
}

impl Spool {
    fn open(root: &Path) -> Result<Self> {
        for status in [
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
            ApprovalStatus::Expired,
        ] {
            fs::create_dir_all(root.join(status.directory_name()))?;
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn record_path(&self, status: ApprovalStatus, id: &ApprovalId) -> PathBuf {
        self.root
            .join(status.directory_name())
            .join(format!("approval_{}.json", id))
    }

    fn write(&self, record: &PendingApproval) -> Result<()> {
        let path = self.record_path(record.status, &record.id);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Persist an updated record and move its file out of `from`'s
    /// state directory.
    fn transition(&self, record: &PendingApproval, from: ApprovalStatus) -> Result<()> {
        let old_path = self.record_path(from, &record.id);
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&old_path, json)?;
        fs::rename(&old_path, self.record_path(record.status, &record.id))?;
        Ok(())
    }

    fn load_pending(&self) -> Result<Vec<PendingApproval>> {
        let pending_dir = self.root.join(ApprovalStatus::Pending.directory_name());
        let mut records = Vec::new();

        for entry in fs::read_dir(&pending_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let json = fs::read_to_string(&path)?;
            match serde_json::from_str::<PendingApproval>(&json) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("Skipping unreadable spool file {:?}: {}", path, e),
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration as StdDuration;
    use tempfile::TempDir;

    #[test]
    fn test_create_returns_unique_ids() {
        let store = ApprovalStore::in_memory();
        let mut seen = HashSet::new();

        for i in 0..10_000 {
            let id = store.create(format!("draft {}", i)).unwrap();
            assert!(seen.insert(id), "id collision after {} creates", i);
        }
    }

    #[test]
    fn test_resolve_unknown_id_is_none() {
        let store = ApprovalStore::in_memory();

        assert!(store
            .resolve(&ApprovalId::new(), DecisionAction::Approve)
            .is_none());
    }

    #[test]
    fn test_resolve_transitions_exactly_once() {
        let store = ApprovalStore::in_memory();
        let id = store.create("draft").unwrap();

        let first = store.resolve(&id, DecisionAction::Approve).unwrap();
        assert_eq!(first.status, ApprovalStatus::Approved);
        assert!(first.decided_at.is_some());

        assert!(store.resolve(&id, DecisionAction::Approve).is_none());
        assert!(store.resolve(&id, DecisionAction::Reject).is_none());
    }

    #[test]
    fn test_concurrent_resolve_single_winner() {
        let store = ApprovalStore::in_memory();
        let id = store.create("draft").unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let store = &store;
                    let id = id.clone();
                    scope.spawn(move || store.resolve(&id, DecisionAction::Approve).is_some())
                })
                .collect();

            let wins: usize = handles.into_iter().filter(|h| h.join().unwrap()).count();
            assert_eq!(wins, 1, "exactly one resolver must win");
        });
    }

    #[test]
    fn test_reject_resolution() {
        let store = ApprovalStore::in_memory();
        let id = store.create("draft").unwrap();

        let resolved = store.resolve(&id, DecisionAction::Reject).unwrap();
        assert_eq!(resolved.status, ApprovalStatus::Rejected);
    }

    #[test]
    fn test_expired_record_no_longer_resolves() {
        let store = ApprovalStore::in_memory();
        let id = store.create("draft").unwrap();

        // Zero max-age makes every record stale immediately
        let expired = store.expire(StdDuration::ZERO);

        assert_eq!(expired, 1);
        assert!(store.resolve(&id, DecisionAction::Approve).is_none());
    }

    #[test]
    fn test_expire_ignores_resolved_records() {
        let store = ApprovalStore::in_memory();
        let id = store.create("draft").unwrap();
        store.resolve(&id, DecisionAction::Approve).unwrap();

        assert_eq!(store.expire(StdDuration::ZERO), 0);
    }

    #[test]
    fn test_closed_store_rejects_create_but_still_resolves() {
        let store = ApprovalStore::in_memory();
        let id = store.create("draft").unwrap();

        store.close();

        assert!(store.create("another").is_err());
        assert!(store.resolve(&id, DecisionAction::Approve).is_some());
    }

    #[test]
    fn test_counts_by_state() {
        let store = ApprovalStore::in_memory();
        let _pending = store.create("one").unwrap();
        let approved = store.create("two").unwrap();
        let rejected = store.create("three").unwrap();
        store.resolve(&approved, DecisionAction::Approve).unwrap();
        store.resolve(&rejected, DecisionAction::Reject).unwrap();

        let counts = store.counts();
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.approved, 1);
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_spool_directory_layout() {
        let dir = TempDir::new().unwrap();
        let store = ApprovalStore::with_spool(dir.path()).unwrap();

        let id = store.create("draft").unwrap();
        let pending_file = dir.path().join("pending").join(format!("approval_{}.json", id));
        assert!(pending_file.exists());

        store.resolve(&id, DecisionAction::Approve).unwrap();
        assert!(!pending_file.exists());
        assert!(dir
            .path()
            .join("approved")
            .join(format!("approval_{}.json", id))
            .exists());
    }

    #[test]
    fn test_pending_approvals_survive_restart() {
        let dir = TempDir::new().unwrap();
        let kept_id;
        let resolved_id;

        {
            let store = ApprovalStore::with_spool(dir.path()).unwrap();
            kept_id = store.create("kept").unwrap();
            resolved_id = store.create("resolved").unwrap();
            store.resolve(&resolved_id, DecisionAction::Reject).unwrap();
            // Dropped here, simulating shutdown
        }

        let store = ApprovalStore::with_spool(dir.path()).unwrap();

        assert_eq!(store.pending_count(), 1);
        assert!(store.resolve(&resolved_id, DecisionAction::Approve).is_none());

        let resolved = store.resolve(&kept_id, DecisionAction::Approve).unwrap();
        assert_eq!(resolved.content, "kept");
    }
}
