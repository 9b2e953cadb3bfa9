//! Ordered table of rows keyed by symbol.

use serde::{Deserialize, Serialize};

use super::Row;

/// All rows, in table order, with at most one row per symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    rows: Vec<Row>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    pub fn get(&self, symbol: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.symbol() == symbol)
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| r.symbol() == symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.get(symbol).is_some()
    }

    /// Replace the row with the same symbol in place, or append it.
    /// Returns true when an existing row was replaced.
    pub fn upsert(&mut self, row: Row) -> bool {
        match self.get_mut(row.symbol()) {
            Some(existing) => {
                *existing = row;
                true
            }
            None => {
                self.rows.push(row);
                false
            }
        }
    }

    /// Symbols in table order.
    pub fn symbols(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.symbol().to_string()).collect()
    }
}

impl FromIterator<Row> for Snapshot {
    /// Collects rows with upsert semantics: a later row replaces an earlier
    /// one with the same symbol at the earlier position.
    fn from_iter<T: IntoIterator<Item = Row>>(iter: T) -> Self {
        let mut snapshot = Snapshot::new();
        for row in iter {
            snapshot.upsert(row);
        }
        snapshot
    }
}

impl IntoIterator for Snapshot {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
