//! Snapshot table persistence.
//!
//! The table is a CSV file with one header row and one row per instrument.
//! Every write replaces the whole file through a temp file and an atomic
//! rename, so a concurrent reader sees either the old or the new table.

mod csv_table;
mod store;

pub use csv_table::{header, read_table, write_table, UNKNOWN};
pub use store::SnapshotStore;
