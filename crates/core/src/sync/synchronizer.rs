use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use log::{debug, error};

use super::cache::DataCache;
use super::sync_plan::{select_for, tables_for_role};
use super::table_rows::TableRows;
use crate::backend::{RecordStore, Table};
use crate::events::{ConsoleEvent, ConsoleEventSink};
use crate::session::Role;

/// Loads tables into the [`DataCache`] and keeps them in step with the store.
pub struct Synchronizer {
    store: Arc<dyn RecordStore>,
    cache: Arc<DataCache>,
    sink: Arc<dyn ConsoleEventSink>,
    session_active: AtomicBool,
}

impl Synchronizer {
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: Arc<DataCache>,
        sink: Arc<dyn ConsoleEventSink>,
    ) -> Self {
        Self {
            store,
            cache,
            sink,
            session_active: AtomicBool::new(false),
        }
    }

    pub fn cache(&self) -> &Arc<DataCache> {
        &self.cache
    }

    /// Whether refreshes may reach the store.
    pub fn set_session_active(&self, active: bool) {
        self.session_active.store(active, Ordering::SeqCst);
    }

    pub fn is_session_active(&self) -> bool {
        self.session_active.load(Ordering::SeqCst)
    }

    /// Re-fetches every row of `table`.
    ///
    /// Without a session the table is emptied and no store call is made.
    /// A failed fetch empties the table and emits an error notification.
    pub async fn refresh(&self, table: Table) {
        if !self.is_session_active() {
            self.cache.clear(table);
            self.emit_refreshed(table);
            return;
        }

        let ticket = self.cache.begin(table);
        let rows = match self.store.select(&select_for(table)).await {
            Ok(rows) => TableRows::decode(table, rows),
            Err(e) => {
                error!("Error fetching {}: {}", table.label(), e);
                self.sink.emit(ConsoleEvent::error(format!(
                    "Error fetching {}: {}",
                    table.label(),
                    e.user_message()
                )));
                TableRows::empty(table)
            }
        };

        if self.cache.apply(table, ticket, rows) {
            self.emit_refreshed(table);
        } else {
            debug!("Dropped stale {} response (ticket {})", table, ticket);
        }
    }

    /// Refreshes several tables concurrently.
    pub async fn refresh_many(&self, tables: &[Table]) {
        join_all(tables.iter().map(|&table| self.refresh(table))).await;
    }

    /// Runs the full load battery for `role`.
    pub async fn load_for_role(&self, role: Role) {
        let tables = tables_for_role(role);
        debug!("Loading {} table(s) for role {}", tables.len(), role);
        self.refresh_many(&tables).await;
    }

    /// Tells the user that live updates stopped. Cached tables stay as
    /// they are until the next explicit refresh.
    pub fn report_feed_lost(&self) {
        if !self.is_session_active() {
            return;
        }
        error!("Change feed closed; live updates stopped");
        self.sink.emit(ConsoleEvent::error(
            "Live updates disconnected. Reload the page to reconnect.",
        ));
    }

    /// Empties every table.
    pub fn clear_all(&self) {
        self.cache.clear_all();
    }

    fn emit_refreshed(&self, table: Table) {
        self.sink.emit(ConsoleEvent::TableRefreshed {
            table,
            rows: self.cache.len(table),
        });
    }
}
