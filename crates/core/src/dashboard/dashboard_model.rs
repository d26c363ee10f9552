use serde::Serialize;

/// Counters on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_children: usize,
    pub total_staff: usize,
    pub total_rooms: usize,
    pub open_incidents: usize,
    /// Unpaid or overdue.
    pub unpaid_invoices: usize,
    pub waitlist_count: usize,
    pub published_announcements: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildOverview {
    pub child_id: String,
    pub name: String,
    pub checked_in: bool,
    pub room_name: Option<String>,
    pub report_count: usize,
}

/// What a parent sees on their dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentOverview {
    pub display_name: String,
    pub children: Vec<ChildOverview>,
}
