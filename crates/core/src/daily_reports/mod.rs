//! Daily reports module - reports, their photos and the report service.

mod daily_reports_model;
mod daily_reports_service;


pub use daily_reports_model::{DailyReport, DailyReportInput};
pub use daily_reports_service::{photo_path, DailyReportService};
