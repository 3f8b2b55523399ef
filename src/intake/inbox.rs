//! One-shot inbox of pending fire reports
//!
//! Reports submitted before the dashboard loads wait here under a single key
//! and are taken exactly once by [`ReportInbox::drain`].

use super::store::KeyValueStore;
use crate::error::Result;
use firedrone_shared::{codec, Incident};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct ReportInbox {
    store: Arc<dyn KeyValueStore>,
    key: String,
    /// Serializes read-modify-write in `push` against `drain`
    lock: Mutex<()>,
}

impl ReportInbox {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    /// Queue a report for the dashboard.
    ///
    /// A corrupt pending payload is dropped and replaced, so the new report
    /// is never lost to it.
    pub async fn push(&self, report: Incident) -> Result<()> {
        let _guard = self.lock.lock().await;

        let mut pending = match self.store.get(&self.key).await? {
            Some(payload) => codec::decode(&payload).unwrap_or_else(|e| {
                warn!("[INTAKE] Discarding corrupt pending reports: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        debug!("[INTAKE] Queueing report {} ({} pending)", report.id, pending.len());
        pending.push(report);

        let payload = codec::encode(&pending)?;
        self.store.set(&self.key, payload).await?;
        Ok(())
    }

    /// Take every pending report, oldest first, and clear the inbox
    pub async fn drain(&self) -> Result<Vec<Incident>> {
        let _guard = self.lock.lock().await;

        let reports = match self.store.take(&self.key).await? {
            Some(payload) => codec::decode(&payload)?,
            None => Vec::new(),
        };
        if !reports.is_empty() {
            info!(
                "[INTAKE] Drained {} pending report(s) from {} store",
                reports.len(),
                self.store.name()
            );
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::intake::store::{FileStore, MemoryStore};
    use chrono::Utc;
    use firedrone_shared::{Coordinate, IncidentId};

    fn report(id: u64, location: &str) -> Incident {
        Incident::new(id, location, Coordinate::new(7.44, 10.52), "Smoke", Utc::now())
    }

    #[tokio::test]
    async fn test_drain_is_one_shot() {
        let inbox = ReportInbox::new(Arc::new(MemoryStore::new()), "pendingFireReports");
        inbox.push(report(1, "Kawo")).await.unwrap();
        inbox.push(report(2, "Malali")).await.unwrap();

        let drained = inbox.drain().await.unwrap();
        let ids: Vec<IncidentId> = drained.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![IncidentId::Number(1), IncidentId::Number(2)]);

        assert!(inbox.drain().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drain_empty_store() {
        let inbox = ReportInbox::new(Arc::new(MemoryStore::new()), "pendingFireReports");
        assert!(inbox.drain().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_reported_and_cleared() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("pendingFireReports", "not json".into())
            .await
            .unwrap();
        let inbox = ReportInbox::new(store.clone(), "pendingFireReports");

        assert!(matches!(inbox.drain().await, Err(DashboardError::Codec(_))));
        assert_eq!(store.get("pendingFireReports").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_inbox_usable_after_corrupt_drain() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("pendingFireReports", "not json".into())
            .await
            .unwrap();
        let inbox = ReportInbox::new(store, "pendingFireReports");

        assert!(inbox.drain().await.is_err());
        inbox.push(report(3, "Kawo")).await.unwrap();

        let drained = inbox.drain().await.unwrap();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].id, IncidentId::Number(3));
    }

    #[tokio::test]
    async fn test_push_replaces_corrupt_payload() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        store
            .set("pendingFireReports", "{\"truncated\":".into())
            .await
            .unwrap();
        let inbox = ReportInbox::new(store, "pendingFireReports");

        inbox.push(report(4, "Malali")).await.unwrap();

        let drained = inbox.drain().await.unwrap();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].location, "Malali");
    }

    #[tokio::test]
    async fn test_concurrent_pushes_are_not_lost() {
        let inbox = Arc::new(ReportInbox::new(
            Arc::new(MemoryStore::new()),
            "pendingFireReports",
        ));

        let mut tasks = Vec::new();
        for id in 0..8u64 {
            let inbox = inbox.clone();
            tasks.push(tokio::spawn(async move {
                inbox.push(report(id, "GRA")).await.unwrap();
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }

        assert_eq!(inbox.drain().await.unwrap().len(), 8);
    }
}
