//! Data synchronizer - per-role table caches kept fresh from the change feed.

mod cache;
mod resync_worker;
mod sync_plan;
mod synchronizer;
mod table_rows;

#[cfg(test)]
mod synchronizer_tests;

pub use cache::{DataCache, TableState};
pub use resync_worker::{spawn_resync_worker, ResyncHandle};
pub use sync_plan::{feed_channel, select_for, table_spec, tables_for_role, TableSpec};
pub use synchronizer::Synchronizer;
pub use table_rows::{HasId, IndexedRows, TableRows};
