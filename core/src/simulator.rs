//! # Transaction Simulator
//!
//! Stands in for chain confirmation. Each scheduled transaction gets its own
//! tokio task that sleeps, moves the record to `processing`, sleeps again and
//! moves it to `completed`.
//!
//! ## Lifecycle
//!
//! ```text
//! schedule(tx) ──► sleep(processing_delay) ──► processing
//!                  sleep(completion_delay) ──► completed
//! ```
//!
//! The task's `JoinHandle` is kept next to the tx id, and finished handles
//! are pruned lazily. One simulation can be cancelled with
//! [`TransactionSimulator::cancel`], all of them with
//! [`TransactionSimulator::shutdown`]. A cancelled transaction keeps whatever
//! status was last written.
//!
//! The simulator never writes `failed`.

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::SimulatorConfig;
use crate::model::TransactionStatus;
use crate::store::EntityStore;

/// Drives simulated transactions through their status lifecycle.
///
/// Cheap to clone; clones share the same task table.
#[derive(Clone)]
pub struct TransactionSimulator {
    store: Arc<EntityStore>,
    config: SimulatorConfig,
    tasks: Arc<DashMap<String, JoinHandle<()>>>,
}

impl fmt::Debug for TransactionSimulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionSimulator")
            .field("config", &self.config)
            .field("in_flight", &self.tasks.len())
            .finish()
    }
}

impl TransactionSimulator {
    /// Creates a simulator that writes status changes into `store`.
    pub fn new(store: Arc<EntityStore>, config: SimulatorConfig) -> Self {
        Self {
            store,
            config,
            tasks: Arc::new(DashMap::new()),
        }
    }

    /// The timing this simulator was built with.
    pub fn config(&self) -> SimulatorConfig {
        self.config
    }

    /// Start advancing `tx_id`. Must be called from within a tokio runtime.
    ///
    /// Scheduling a transaction that already has a live task replaces (and
    /// aborts) the old task.
    pub fn schedule(&self, tx_id: &str) {
        self.prune();

        let store = Arc::clone(&self.store);
        let config = self.config;
        let id = tx_id.to_string();
        let handle = tokio::spawn(async move { advance(&store, &id, config).await });

        if let Some(previous) = self.tasks.insert(tx_id.to_string(), handle) {
            previous.abort();
        }

        tracing::debug!(
            tx_id,
            processing_ms = config.processing_delay.as_millis() as u64,
            completion_ms = config.completion_delay.as_millis() as u64,
            "transaction simulation scheduled"
        );
    }

    /// Stop the timers for one transaction. Returns `false` if nothing was
    /// in flight for it.
    pub fn cancel(&self, tx_id: &str) -> bool {
        match self.tasks.remove(tx_id) {
            Some((_, handle)) if !handle.is_finished() => {
                handle.abort();
                tracing::info!(tx_id, "transaction simulation cancelled");
                true
            }
            _ => false,
        }
    }

    /// Abort every in-flight simulation. Called once on process shutdown.
    pub fn shutdown(&self) {
        let mut aborted = 0usize;
        self.tasks.retain(|_, handle| {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
            }
            false
        });
        tracing::info!(aborted, "transaction simulator stopped");
    }

    /// Number of transactions whose timers have not finished.
    pub fn in_flight(&self) -> usize {
        self.prune();
        self.tasks.len()
    }

    /// Whether `tx_id` still has pending timers.
    pub fn is_scheduled(&self, tx_id: &str) -> bool {
        self.tasks
            .get(tx_id)
            .map_or(false, |handle| !handle.is_finished())
    }

    /// Drop handles of tasks that already ran to completion.
    fn prune(&self) {
        self.tasks.retain(|_, handle| !handle.is_finished());
    }
}

/// The timed walk `pending -> processing -> completed`.
async fn advance(store: &EntityStore, tx_id: &str, config: SimulatorConfig) {
    tokio::time::sleep(config.processing_delay).await;
    if let Err(e) = store.update_transaction_status(tx_id, TransactionStatus::Processing) {
        tracing::warn!(tx_id, error = %e, "simulation stopped before processing");
        return;
    }

    tokio::time::sleep(config.completion_delay).await;
    match store.update_transaction_status(tx_id, TransactionStatus::Completed) {
        Ok(_) => tracing::info!(tx_id, "transaction completed"),
        Err(e) => tracing::warn!(tx_id, error = %e, "simulation stopped before completion"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTransaction;
    use std::time::Duration;

    fn setup() -> (Arc<EntityStore>, TransactionSimulator) {
        let store = Arc::new(EntityStore::new());
        let sim = TransactionSimulator::new(Arc::clone(&store), SimulatorConfig::default());
        (store, sim)
    }

    fn status(store: &EntityStore, tx_id: &str) -> TransactionStatus {
        store.get_transaction(tx_id).unwrap().status
    }

    #[tokio::test(start_paused = true)]
    async fn walks_pending_processing_completed() {
        let (store, sim) = setup();
        store
            .create_transaction(NewTransaction::pending("tx_1", "w", "o"))
            .unwrap();
        sim.schedule("tx_1");
        assert!(sim.is_scheduled("tx_1"));

        tokio::time::sleep(Duration::from_millis(1_900)).await;
        assert_eq!(status(&store, "tx_1"), TransactionStatus::Pending);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(status(&store, "tx_1"), TransactionStatus::Processing);

        tokio::time::sleep(Duration::from_millis(4_800)).await;
        assert_eq!(status(&store, "tx_1"), TransactionStatus::Processing);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(status(&store, "tx_1"), TransactionStatus::Completed);
        assert_eq!(sim.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_freezes_last_written_status() {
        let (store, sim) = setup();
        store
            .create_transaction(NewTransaction::pending("tx_1", "w", "o"))
            .unwrap();
        sim.schedule("tx_1");

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(status(&store, "tx_1"), TransactionStatus::Processing);

        assert!(sim.cancel("tx_1"));
        assert!(!sim.cancel("tx_1"));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(status(&store, "tx_1"), TransactionStatus::Processing);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_aborts_everything() {
        let (store, sim) = setup();
        for i in 0..3 {
            let id = format!("tx_{i}");
            store
                .create_transaction(NewTransaction::pending(id.as_str(), "w", "o"))
                .unwrap();
            sim.schedule(&id);
        }
        assert_eq!(sim.in_flight(), 3);

        sim.shutdown();
        assert_eq!(sim.in_flight(), 0);

        tokio::time::sleep(Duration::from_secs(30)).await;
        for i in 0..3 {
            assert_eq!(status(&store, &format!("tx_{i}")), TransactionStatus::Pending);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn missing_transaction_ends_task_quietly() {
        let (_store, sim) = setup();
        sim.schedule("tx_ghost");
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!sim.is_scheduled("tx_ghost"));
    }

    #[tokio::test(start_paused = true)]
    async fn custom_delays_are_honoured() {
        let store = Arc::new(EntityStore::new());
        let sim = TransactionSimulator::new(
            Arc::clone(&store),
            SimulatorConfig::from_millis(10, 20),
        );
        store
            .create_transaction(NewTransaction::pending("tx_fast", "w", "o"))
            .unwrap();
        sim.schedule("tx_fast");

        tokio::time::sleep(Duration::from_millis(31)).await;
        assert_eq!(status(&store, "tx_fast"), TransactionStatus::Completed);
    }
}
