//! Scheduler loop: one refresh per instrument per cycle, paced to a target
//! cycle period, until stopped.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use ticker_core::types::{Instrument, Row, Snapshot};
use ticker_store::SnapshotStore;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::refresh::RefreshEngine;
use crate::stop::StopSignal;

/// Loop pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Target time from the start of one cycle to the start of the next.
    pub cycle_period: Duration,
    /// Pause after each instrument.
    pub instrument_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cycle_period: Duration::from_secs(60),
            instrument_delay: Duration::from_secs(1),
        }
    }
}

/// Where the loop currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Fetching { symbol: String },
    Committing { symbol: String },
    /// Pause between two instruments.
    Pacing,
    /// Rest between two cycles.
    Sleeping,
    Stopping,
    Stopped,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerState::Idle => write!(f, "idle"),
            SchedulerState::Fetching { symbol } => write!(f, "fetching {}", symbol),
            SchedulerState::Committing { symbol } => write!(f, "saving {}", symbol),
            SchedulerState::Pacing => write!(f, "pacing"),
            SchedulerState::Sleeping => write!(f, "waiting for next cycle"),
            SchedulerState::Stopping => write!(f, "stopping"),
            SchedulerState::Stopped => write!(f, "stopped"),
        }
    }
}

/// State plus the number of the current (or last) cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerStatus {
    pub state: SchedulerState,
    pub cycle: u64,
}

/// Outcome of persisting a refreshed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitStatus {
    Committed,
    /// Not persisted this time; the next successful commit carries it.
    Pending { reason: String },
}

/// Copy of a refreshed row handed to the view projection.
#[derive(Debug, Clone, PartialEq)]
pub struct RowUpdate {
    pub row: Row,
    pub commit: CommitStatus,
}

/// Per-cycle counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    /// Instruments whose row was refreshed (committed or pending).
    pub updated: usize,
    /// Instruments where every provider call failed.
    pub total_failures: usize,
    /// Refreshed rows the store could not persist.
    pub commit_failures: usize,
    /// False when a stop cut the cycle short.
    pub completed: bool,
}

/// Drives the refresh engine over the watch list and commits rows to the
/// snapshot store.
pub struct Scheduler {
    engine: Arc<RefreshEngine>,
    store: SnapshotStore,
    config: SchedulerConfig,
    watchlist: Vec<Instrument>,
    rows: Snapshot,
    updates: Option<mpsc::Sender<RowUpdate>>,
    status: watch::Sender<SchedulerStatus>,
    cycle: u64,
}

impl Scheduler {
    /// Create a scheduler with an empty watch list and no seeded rows.
    pub fn new(engine: Arc<RefreshEngine>, store: SnapshotStore, config: SchedulerConfig) -> Self {
        let (status, _) = watch::channel(SchedulerStatus {
            state: SchedulerState::Idle,
            cycle: 0,
        });
        Self {
            engine,
            store,
            config,
            watchlist: Vec::new(),
            rows: Snapshot::new(),
            updates: None,
            status,
            cycle: 0,
        }
    }

    /// Instruments to refresh, in processing order.
    pub fn with_watchlist(mut self, watchlist: Vec<Instrument>) -> Self {
        self.watchlist = watchlist;
        self
    }

    /// Seed the in-memory rows, usually from the loaded snapshot.
    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.rows = snapshot;
        self
    }

    /// Send a copy of every refreshed row to `updates`. The loop never waits
    /// on the receiver; updates are dropped when the channel is full.
    pub fn with_updates(mut self, updates: mpsc::Sender<RowUpdate>) -> Self {
        self.updates = Some(updates);
        self
    }

    /// Watch the loop's state.
    pub fn status(&self) -> watch::Receiver<SchedulerStatus> {
        self.status.subscribe()
    }

    /// Read-only view of the in-memory rows.
    pub fn rows(&self) -> &Snapshot {
        &self.rows
    }

    pub fn watchlist(&self) -> &[Instrument] {
        &self.watchlist
    }

    /// Rest after a cycle: the target period minus the pacing delays already
    /// spent, never negative.
    pub fn cycle_rest(&self) -> Duration {
        let count = u32::try_from(self.watchlist.len()).unwrap_or(u32::MAX);
        self.config
            .cycle_period
            .saturating_sub(self.config.instrument_delay.saturating_mul(count))
    }

    /// Run cycles until `stop` fires. Returns the final in-memory rows.
    pub async fn run(mut self, mut stop: StopSignal) -> Snapshot {
        info!(
            instruments = self.watchlist.len(),
            period = ?self.config.cycle_period,
            delay = ?self.config.instrument_delay,
            "scheduler started"
        );

        while !stop.is_stopped() {
            let report = self.run_cycle(&mut stop).await;
            if !report.completed {
                break;
            }

            let rest = self.cycle_rest();
            debug!(cycle = report.cycle, ?rest, "cycle complete, resting");
            self.set_state(SchedulerState::Sleeping);
            if stop.sleep(rest).await {
                break;
            }
        }

        self.set_state(SchedulerState::Stopping);
        info!(cycles = self.cycle, "scheduler stopping");
        self.set_state(SchedulerState::Stopped);
        self.rows
    }

    /// One pass over the watch list in order. A stop request is honoured
    /// between instruments, never during a refresh.
    pub async fn run_cycle(&mut self, stop: &mut StopSignal) -> CycleReport {
        self.cycle += 1;
        let mut report = CycleReport {
            cycle: self.cycle,
            completed: true,
            ..CycleReport::default()
        };
        self.set_state(SchedulerState::Idle);

        let watchlist = self.watchlist.clone();
        for instrument in &watchlist {
            if stop.is_stopped() {
                report.completed = false;
                break;
            }

            self.process(instrument, &mut report).await;

            self.set_state(SchedulerState::Pacing);
            if stop.sleep(self.config.instrument_delay).await {
                report.completed = false;
                break;
            }
        }

        info!(
            cycle = report.cycle,
            updated = report.updated,
            total_failures = report.total_failures,
            commit_failures = report.commit_failures,
            completed = report.completed,
            "cycle finished"
        );
        report
    }

    async fn process(&mut self, instrument: &Instrument, report: &mut CycleReport) {
        self.set_state(SchedulerState::Fetching {
            symbol: instrument.symbol.clone(),
        });

        // Each refresh runs on its own task so a panicking provider only
        // costs this instrument.
        let engine = Arc::clone(&self.engine);
        let target = instrument.clone();
        let previous = self.rows.get(&instrument.symbol).cloned();
        let task = tokio::spawn(async move { engine.refresh(&target, previous.as_ref()).await });

        let refresh = match task.await {
            Ok(refresh) => refresh,
            Err(e) => {
                error!(instrument = %instrument, error = %e, "refresh task failed");
                report.total_failures += 1;
                return;
            }
        };

        if refresh.is_total_failure() {
            warn!(instrument = %instrument, "every provider call failed, keeping previous row");
            report.total_failures += 1;
            return;
        }

        self.commit(refresh.row, report).await;
    }

    async fn commit(&mut self, row: Row, report: &mut CycleReport) {
        self.set_state(SchedulerState::Committing {
            symbol: row.symbol().to_string(),
        });
        self.rows.upsert(row.clone());

        let commit = match self.store.upsert(&row).await {
            Ok(()) => CommitStatus::Committed,
            Err(e) => {
                if e.is_recoverable() {
                    warn!(symbol = row.symbol(), error = %e, "snapshot not updated, will retry next cycle");
                } else {
                    error!(symbol = row.symbol(), error = %e, "snapshot not updated");
                }
                report.commit_failures += 1;
                CommitStatus::Pending {
                    reason: e.to_string(),
                }
            }
        };
        report.updated += 1;

        if let Some(updates) = &self.updates {
            if let Err(e) = updates.try_send(RowUpdate { row, commit }) {
                debug!(error = %e, "row update not delivered to view");
            }
        }
    }

    fn set_state(&self, state: SchedulerState) {
        self.status.send_replace(SchedulerStatus {
            state,
            cycle: self.cycle,
        });
    }
}
