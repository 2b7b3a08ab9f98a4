use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::observation::MoodObservation;
use crate::result::{Error, Result};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundWrite {
    pub user_id: String,
    pub observation: MoodObservation,
}

/// Producer side of the write queue. Enqueueing never waits on the network.
#[derive(Debug, Clone)]
pub struct Outbox {
    sender: mpsc::UnboundedSender<OutboundWrite>,
}

impl Outbox {
    pub fn enqueue(&self, write: OutboundWrite) -> Result<()> {
        self.sender.send(write).map_err(|_| Error::SyncClosed)
    }
}

#[async_trait]
pub trait SyncBackend: Send + Sync {
    async fn push(&self, session: &Session, write: &OutboundWrite) -> Result<()>;
}

#[derive(PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 200,
            max_backoff_ms: 10_000,
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::invalid("sync max_attempts must be at least 1"));
        }

        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(Error::invalid(format!(
                "sync initial_backoff_ms ({}) exceeds max_backoff_ms ({})",
                self.initial_backoff_ms, self.max_backoff_ms
            )));
        }

        Ok(())
    }

    /// Delay before retry number `attempt` (1-based): doubles each time, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        let delay = self.initial_backoff_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_backoff_ms))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub delivered: usize,
    pub failed: usize,
    pub retries: usize,
}

/// Starts the single worker that drains the outbox. The worker stops once every
/// `Outbox` clone has been dropped and the queue is empty.
pub fn spawn_sync_worker<B>(
    backend: Arc<B>,
    session: Arc<Session>,
    config: SyncConfig,
) -> (Outbox, JoinHandle<SyncReport>)
where
    B: SyncBackend + ?Sized + 'static,
{
    let (sender, mut receiver) = mpsc::unbounded_channel::<OutboundWrite>();

    let handle = tokio::spawn(async move {
        let mut report = SyncReport::default();

        while let Some(write) = receiver.recv().await {
            deliver(backend.as_ref(), &session, &config, &write, &mut report).await;
        }

        info!(
            delivered = report.delivered,
            failed = report.failed,
            retries = report.retries,
            "Sync worker finished."
        );
        report
    });

    (Outbox { sender }, handle)
}

async fn deliver<B>(
    backend: &B,
    session: &Session,
    config: &SyncConfig,
    write: &OutboundWrite,
    report: &mut SyncReport,
) where
    B: SyncBackend + ?Sized,
{
    let mut attempt = 1;

    loop {
        match backend.push(session, write).await {
            Ok(()) => {
                debug!(id = %write.observation.id, attempt, "Delivered write.");
                report.delivered += 1;
                return;
            }
            Err(Error::Unauthenticated) => {
                warn!(id = %write.observation.id, "Dropping write, session is not authenticated.");
                report.failed += 1;
                return;
            }
            Err(err) if attempt >= config.max_attempts => {
                warn!(id = %write.observation.id, attempt, error = %err, "Giving up on write.");
                report.failed += 1;
                return;
            }
            Err(err) => {
                let delay = config.backoff(attempt);
                debug!(
                    id = %write.observation.id,
                    attempt,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "Write failed, retrying."
                );
                report.retries += 1;
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Backend that keeps delivered writes in memory. Can be told to reject the next
/// few pushes to exercise the retry path.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    delivered: Mutex<Vec<OutboundWrite>>,
    fail_next: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    pub fn delivered(&self) -> Vec<OutboundWrite> {
        match self.delivered.lock() {
            Ok(delivered) => delivered.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl SyncBackend for MemoryBackend {
    async fn push(&self, session: &Session, write: &OutboundWrite) -> Result<()> {
        session.authorization(Utc::now())?;

        let rejected = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rejected {
            return Err(Error::SyncRejected {
                status: 503,
                reason: "backend unavailable".to_string(),
            });
        }

        match self.delivered.lock() {
            Ok(mut delivered) => delivered.push(write.clone()),
            Err(poisoned) => poisoned.into_inner().push(write.clone()),
        }
        Ok(())
    }
}
