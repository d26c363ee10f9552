use std::collections::HashSet;

use super::dashboard_model::{AdminStats, ChildOverview, ParentOverview};
use crate::backend::Table;
use crate::billing::Invoice;
use crate::daily_reports::DailyReport;
use crate::gallery::own_child_ids;
use crate::incidents::IncidentStatus;
use crate::session::CurrentUser;
use crate::sync::DataCache;

pub fn admin_stats(cache: &DataCache) -> AdminStats {
    AdminStats {
        total_children: cache.len(Table::Children),
        total_staff: cache.len(Table::Staff),
        total_rooms: cache.len(Table::Rooms),
        open_incidents: cache.read(Table::IncidentReports, |rows| {
            rows.incident_reports().map_or(0, |r| {
                r.iter()
                    .filter(|i| i.status == IncidentStatus::Open)
                    .count()
            })
        }),
        unpaid_invoices: cache.read(Table::Invoices, |rows| {
            rows.invoices()
                .map_or(0, |r| r.iter().filter(|i| i.status.is_outstanding()).count())
        }),
        waitlist_count: cache.len(Table::WaitlistEntries),
        published_announcements: cache.read(Table::Announcements, |rows| {
            rows.announcements()
                .map_or(0, |r| r.iter().filter(|a| a.is_published).count())
        }),
    }
}

/// The parent's children with their check-in state, room and report count.
pub fn parent_overview(cache: &DataCache, user: &CurrentUser) -> ParentOverview {
    let own = own_child_ids(cache, user);
    let report_counts = |child_id: &str| {
        cache.read(Table::DailyReports, |rows| {
            rows.daily_reports()
                .map_or(0, |r| r.iter().filter(|d| d.child_id == child_id).count())
        })
    };
    let room_name = |room_id: Option<&str>| {
        room_id.and_then(|id| {
            cache.read(Table::Rooms, |rows| {
                rows.rooms().and_then(|r| r.get(id)).map(|r| r.name.clone())
            })
        })
    };

    let children = cache.read(Table::Children, |rows| {
        rows.children()
            .map(|children| {
                children
                    .iter()
                    .filter(|c| own.contains(&c.id))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    });

    ParentOverview {
        display_name: user.display_name.clone(),
        children: children
            .into_iter()
            .map(|child| ChildOverview {
                checked_in: child.is_checked_in(),
                room_name: room_name(child.current_room_id.as_deref()),
                report_count: report_counts(&child.id),
                child_id: child.id,
                name: child.name,
            })
            .collect(),
    }
}

/// Cached daily reports about the parent's children.
pub fn parent_daily_reports(cache: &DataCache, user: &CurrentUser) -> Vec<DailyReport> {
    let own = own_child_ids(cache, user);
    cache.read(Table::DailyReports, |rows| {
        rows.daily_reports()
            .map(|r| filter_owned(r.iter(), &own, |d| &d.child_id))
            .unwrap_or_default()
    })
}

/// Cached invoices billed for the parent's children.
pub fn parent_invoices(cache: &DataCache, user: &CurrentUser) -> Vec<Invoice> {
    let own = own_child_ids(cache, user);
    cache.read(Table::Invoices, |rows| {
        rows.invoices()
            .map(|r| filter_owned(r.iter(), &own, |i| &i.child_id))
            .unwrap_or_default()
    })
}

fn filter_owned<'a, T: Clone + 'a>(
    rows: impl Iterator<Item = &'a T>,
    own: &HashSet<String>,
    child_id: impl Fn(&T) -> &String,
) -> Vec<T> {
    rows.filter(|row| own.contains(child_id(row))).cloned().collect()
}
