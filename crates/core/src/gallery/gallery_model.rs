use chrono::NaiveDate;
use serde::Serialize;

/// One photo attached to a daily report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub url: String,
    pub report_id: String,
    pub report_date: NaiveDate,
    /// 1 or 2.
    pub slot: u8,
    pub child_id: String,
    pub child_name: String,
    pub staff_name: String,
}
