//! Dashboard read models derived from the table caches.

mod dashboard_model;
mod dashboard_view;

pub use dashboard_model::{AdminStats, ChildOverview, ParentOverview};
pub use dashboard_view::{admin_stats, parent_daily_reports, parent_invoices, parent_overview};
