//! Per-table caches with ticketed replacement.
//!
//! Every refresh takes a ticket from [`DataCache::begin`]. A response is
//! applied only if its ticket is newer than the last one applied for that
//! table, so a slow older response never overwrites a newer one. Locks are
//! never held across an await.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use super::table_rows::TableRows;
use crate::backend::Table;

struct Slot {
    rows: TableRows,
    loading: bool,
    issued: u64,
    applied: u64,
}

impl Slot {
    fn new(table: Table) -> Self {
        Self {
            rows: TableRows::empty(table),
            loading: false,
            issued: 0,
            applied: 0,
        }
    }
}

/// Snapshot of one table for hosts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableState {
    pub table: Table,
    pub loading: bool,
    pub rows: TableRows,
}

#[derive(Default)]
pub struct DataCache {
    slots: RwLock<HashMap<Table, Slot>>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_slots(&self) -> RwLockReadGuard<'_, HashMap<Table, Slot>> {
        self.slots.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_slots(&self) -> RwLockWriteGuard<'_, HashMap<Table, Slot>> {
        self.slots.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Marks `table` as loading and returns the ticket for the new fetch.
    pub fn begin(&self, table: Table) -> u64 {
        let mut slots = self.write_slots();
        let slot = slots.entry(table).or_insert_with(|| Slot::new(table));
        slot.issued += 1;
        slot.loading = true;
        slot.issued
    }

    /// Replaces the rows of `table` if `ticket` is newer than the last
    /// applied one. Returns whether the rows were replaced.
    pub fn apply(&self, table: Table, ticket: u64, rows: TableRows) -> bool {
        let mut slots = self.write_slots();
        let slot = slots.entry(table).or_insert_with(|| Slot::new(table));
        if ticket <= slot.applied {
            return false;
        }
        slot.applied = ticket;
        slot.rows = rows;
        if ticket >= slot.issued {
            slot.loading = false;
        }
        true
    }

    /// Empties `table` and invalidates any fetch still in flight.
    pub fn clear(&self, table: Table) {
        let mut slots = self.write_slots();
        let slot = slots.entry(table).or_insert_with(|| Slot::new(table));
        slot.issued += 1;
        slot.applied = slot.issued;
        slot.rows = TableRows::empty(table);
        slot.loading = false;
    }

    pub fn clear_all(&self) {
        for table in Table::ALL {
            self.clear(table);
        }
    }

    pub fn is_loading(&self, table: Table) -> bool {
        self.read_slots().get(&table).is_some_and(|s| s.loading)
    }

    pub fn state(&self, table: Table) -> TableState {
        let slots = self.read_slots();
        match slots.get(&table) {
            Some(slot) => TableState {
                table,
                loading: slot.loading,
                rows: slot.rows.clone(),
            },
            None => TableState {
                table,
                loading: false,
                rows: TableRows::empty(table),
            },
        }
    }

    /// Runs `f` against the cached rows of `table` without cloning them.
    pub fn read<R>(&self, table: Table, f: impl FnOnce(&TableRows) -> R) -> R {
        let slots = self.read_slots();
        match slots.get(&table) {
            Some(slot) => f(&slot.rows),
            None => f(&TableRows::empty(table)),
        }
    }

    pub fn len(&self, table: Table) -> usize {
        self.read(table, TableRows::len)
    }
}
