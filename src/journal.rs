use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::geo::Coordinate;
use crate::observation::MoodObservation;
use crate::result::Result;
use crate::session::Session;
use crate::sync::{spawn_sync_worker, OutboundWrite, Outbox, SyncBackend, SyncConfig, SyncReport};

/// Local mood journal. Every write lands here first and is then handed to the
/// outbox, if one is attached, for background delivery.
pub struct Journal {
    session: Arc<Session>,
    outbox: Option<Outbox>,
    entries: Vec<MoodObservation>,
}

impl Journal {
    pub fn new(session: Arc<Session>, outbox: Option<Outbox>) -> Self {
        Self {
            session,
            outbox,
            entries: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Records a new entry. A missing location is stored as `(0.0, 0.0)`.
    pub fn record(
        &mut self,
        mood: &str,
        location: Option<Coordinate>,
        note: Option<String>,
        timestamp: Option<i64>,
    ) -> MoodObservation {
        let location = location.unwrap_or(Coordinate::new(0.0, 0.0));
        let observation = MoodObservation {
            id: Uuid::new_v4().to_string(),
            mood: mood.to_string(),
            latitude: location.latitude,
            longitude: location.longitude,
            timestamp: timestamp.unwrap_or_else(|| Utc::now().timestamp_millis()),
            note,
        };

        self.insert(observation.clone());
        observation
    }

    /// Inserts an observation, replacing any entry with the same id in place.
    pub fn insert(&mut self, observation: MoodObservation) {
        match self.entries.iter_mut().find(|e| e.id == observation.id) {
            Some(existing) => {
                debug!(id = %observation.id, "Replacing journal entry.");
                *existing = observation.clone();
            }
            None => self.entries.push(observation.clone()),
        }

        self.enqueue(observation);
    }

    fn enqueue(&mut self, observation: MoodObservation) {
        let outbox = match &self.outbox {
            Some(outbox) => outbox,
            None => return,
        };

        let write = OutboundWrite {
            user_id: self.session.user_id.clone(),
            observation,
        };
        if let Err(err) = outbox.enqueue(write) {
            warn!(error = %err, "Sync worker is gone, keeping journal local only.");
            self.outbox = None;
        }
    }

    pub fn entries(&self) -> &[MoodObservation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with a real location, in insertion order. This is the feed for clustering.
    pub fn located(&self) -> Vec<MoodObservation> {
        located(&self.entries)
    }

    pub fn recent(&self, limit: usize) -> Vec<MoodObservation> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit);
        entries
    }

    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = bincode::serialize(&self.entries)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!(
            entries = self.entries.len(),
            bytes = bytes.len(),
            path = %path.as_ref().display(),
            "Wrote journal snapshot."
        );
        Ok(())
    }

    /// Loads a snapshot. Entries already in the snapshot are not queued for sync again.
    pub fn load_snapshot(
        path: impl AsRef<Path>,
        session: Arc<Session>,
        outbox: Option<Outbox>,
    ) -> Result<Journal> {
        let entries = read_snapshot(path)?;
        Ok(Journal {
            session,
            outbox,
            entries,
        })
    }
}

/// Imports observations into a fresh journal wired to a sync worker, then waits
/// until every queued write has been delivered or given up on.
pub async fn import_and_sync<B>(
    observations: Vec<MoodObservation>,
    session: Arc<Session>,
    backend: Arc<B>,
    config: SyncConfig,
) -> Result<(Journal, SyncReport)>
where
    B: SyncBackend + ?Sized + 'static,
{
    config.validate()?;

    let (outbox, worker) = spawn_sync_worker(backend, session.clone(), config);
    let mut journal = Journal::new(session, Some(outbox));
    for observation in observations {
        journal.insert(observation);
    }

    // Dropping the last outbox lets the worker drain and stop.
    journal.outbox = None;
    let report = worker.await?;

    info!(
        user_id = %journal.session().user_id,
        entries = journal.len(),
        delivered = report.delivered,
        failed = report.failed,
        "Imported journal."
    );
    Ok((journal, report))
}

pub fn read_snapshot(path: impl AsRef<Path>) -> Result<Vec<MoodObservation>> {
    let bytes = std::fs::read(path.as_ref())?;
    let entries: Vec<MoodObservation> = bincode::deserialize(&bytes)?;
    info!(
        entries = entries.len(),
        path = %path.as_ref().display(),
        "Read journal snapshot."
    );
    Ok(entries)
}

/// Drops entries without a usable location and repeated ids (first occurrence wins).
pub fn located(observations: &[MoodObservation]) -> Vec<MoodObservation> {
    let mut seen = std::collections::HashSet::new();
    observations
        .iter()
        .filter(|o| o.coordinate().is_located())
        .filter(|o| seen.insert(o.id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Error;
    use crate::sync::MemoryBackend;

    fn session() -> Arc<Session> {
        Arc::new(Session::new("user-1").with_access_token("token"))
    }

    #[test]
    fn unlocated_entries_are_kept_but_not_fed_to_clustering() {
        let mut journal = Journal::new(session(), None);
        journal.record("happy", Some(Coordinate::new(41.6, -93.6)), None, Some(1));
        journal.record("sad", None, Some("no gps".to_string()), Some(2));
        journal.record("calm", Some(Coordinate::new(0.0, 0.0)), None, Some(3));

        assert_eq!(journal.len(), 3);
        let located = journal.located();
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].mood, "happy");
    }

    #[test]
    fn insert_replaces_same_id() {
        let mut journal = Journal::new(session(), None);
        journal.insert(MoodObservation::new("x", "happy", 1.0, 1.0, 1));
        journal.insert(MoodObservation::new("x", "sad", 1.0, 1.0, 2));

        assert_eq!(journal.len(), 1);
        assert_eq!(journal.entries()[0].mood, "sad");
    }

    #[test]
    fn recent_is_newest_first() {
        let mut journal = Journal::new(session(), None);
        for ts in [5, 1, 9, 3] {
            journal.record("calm", None, None, Some(ts));
        }

        let recent = journal.recent(3);
        let stamps = recent.iter().map(|o| o.timestamp).collect::<Vec<_>>();
        assert_eq!(stamps, vec![9, 5, 3]);
    }

    #[test]
    fn located_skips_repeated_ids() {
        let observations = vec![
            MoodObservation::new("a", "happy", 1.0, 1.0, 1),
            MoodObservation::new("a", "sad", 2.0, 2.0, 2),
            MoodObservation::new("b", "calm", f64::NAN, 2.0, 3),
        ];
        let located = located(&observations);
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].mood, "happy");
    }

    #[tokio::test]
    async fn import_delivers_every_entry_once() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_next(1);
        let config = SyncConfig {
            max_attempts: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        };
        let observations = vec![
            MoodObservation::new("a", "happy", 1.0, 1.0, 1).with_note("sunny walk"),
            MoodObservation::new("b", "sad", 0.0, 0.0, 2),
            MoodObservation::new("a", "calm", 1.0, 1.0, 3),
        ];

        let (journal, report) = import_and_sync(observations, session(), backend.clone(), config)
            .await
            .unwrap();

        assert_eq!(journal.len(), 2);
        assert_eq!(journal.session().user_id, "user-1");
        assert_eq!(journal.entries()[0].mood, "calm");
        assert_eq!(report.delivered, 3);
        assert_eq!(report.retries, 1);
        assert_eq!(backend.delivered()[0].observation.note.as_deref(), Some("sunny walk"));
    }

    #[tokio::test]
    async fn import_rejects_invalid_sync_config() {
        let config = SyncConfig {
            max_attempts: 0,
            initial_backoff_ms: 1,
            max_backoff_ms: 1,
        };
        let backend = Arc::new(MemoryBackend::new());
        let result = import_and_sync(Vec::new(), session(), backend, config).await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn writes_flow_to_the_outbox() {
        let backend = Arc::new(MemoryBackend::new());
        let session = session();
        let config = SyncConfig {
            max_attempts: 2,
            initial_backoff_ms: 1,
            max_backoff_ms: 1,
        };
        let (outbox, handle) = spawn_sync_worker(backend.clone(), session.clone(), config);

        let mut journal = Journal::new(session, Some(outbox));
        let recorded = journal.record("excited", Some(Coordinate::new(10.0, 10.0)), None, None);
        drop(journal);

        let report = handle.await.unwrap();
        assert_eq!(report.delivered, 1);
        let delivered = backend.delivered();
        assert_eq!(delivered[0].observation, recorded);
        assert_eq!(delivered[0].user_id, "user-1");
    }
}
