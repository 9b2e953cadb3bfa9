//! Refresh engine and scheduler loop.
//!
//! The [`RefreshEngine`] turns provider calls for one instrument into an
//! updated [`Row`](ticker_core::types::Row). The [`Scheduler`] drives it over
//! the watch list once per cycle, commits each row to the snapshot store and
//! fans row updates out to an optional view.

mod refresh;
mod scheduler;
mod stop;
mod watchlist;

#[cfg(test)]
mod testing;

pub use refresh::{FetchFailure, Field, Refresh, RefreshEngine};
pub use scheduler::{
    CommitStatus, CycleReport, RowUpdate, Scheduler, SchedulerConfig, SchedulerState,
    SchedulerStatus,
};
pub use stop::{stop_channel, StopHandle, StopSignal};
pub use watchlist::resolve_watchlist;
