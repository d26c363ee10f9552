use std::collections::HashSet;

use super::gallery_model::GalleryItem;
use crate::backend::Table;
use crate::session::{CurrentUser, Role};
use crate::sync::{DataCache, TableRows};

const UNKNOWN_CHILD: &str = "Unknown Child";
const UNKNOWN_STAFF: &str = "Unknown Staff";

/// Ids of the children whose primary parent is `user`.
pub(crate) fn own_child_ids(cache: &DataCache, user: &CurrentUser) -> HashSet<String> {
    let Some(parent_id) = user.profile_id.as_deref() else {
        return HashSet::new();
    };
    cache.read(Table::Children, |rows| {
        rows.children()
            .map(|children| {
                children
                    .iter()
                    .filter(|c| c.primary_parent_id.as_deref() == Some(parent_id))
                    .map(|c| c.id.clone())
                    .collect()
            })
            .unwrap_or_default()
    })
}

/// Every photo on the cached daily reports, newest report first.
///
/// Parents only see photos of their own children.
pub fn gallery_items(cache: &DataCache, user: &CurrentUser) -> Vec<GalleryItem> {
    let visible = (user.role == Role::Parent).then(|| own_child_ids(cache, user));

    let mut reports = cache.read(Table::DailyReports, |rows| {
        rows.daily_reports()
            .map(|reports| {
                reports
                    .iter()
                    .filter(|r| visible.as_ref().map_or(true, |ids| ids.contains(&r.child_id)))
                    .filter(|r| !r.photo_urls().is_empty())
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    });
    reports.sort_by(|a, b| b.report_date.cmp(&a.report_date));

    let child_name = |id: &str| {
        cache.read(Table::Children, |rows| {
            rows.children()
                .and_then(|c| c.get(id))
                .map(|c| c.name.clone())
        })
    };
    let staff_name = |id: Option<&str>| {
        id.and_then(|id| {
            cache.read(Table::Staff, |rows: &TableRows| {
                rows.staff().and_then(|s| s.get(id)).map(|s| s.name.clone())
            })
        })
    };

    let mut items = Vec::new();
    for report in &reports {
        let child = child_name(&report.child_id).unwrap_or_else(|| UNKNOWN_CHILD.to_string());
        let staff =
            staff_name(report.staff_id.as_deref()).unwrap_or_else(|| UNKNOWN_STAFF.to_string());
        let slots = [(1u8, &report.photo_url_1), (2u8, &report.photo_url_2)];
        for (slot, url) in slots {
            if let Some(url) = url.as_deref().filter(|u| !u.is_empty()) {
                items.push(GalleryItem {
                    url: url.to_string(),
                    report_id: report.id.clone(),
                    report_date: report.report_date,
                    slot,
                    child_id: report.child_id.clone(),
                    child_name: child.clone(),
                    staff_name: staff.clone(),
                });
            }
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(role: Role, profile_id: &str) -> CurrentUser {
        CurrentUser {
            user_id: "u1".to_string(),
            email: None,
            role,
            display_name: "Someone".to_string(),
            profile_id: Some(profile_id.to_string()),
            staff_id: role.is_staff().then(|| profile_id.to_string()),
        }
    }

    fn fill(cache: &DataCache, table: Table, rows: Vec<serde_json::Value>) {
        let ticket = cache.begin(table);
        cache.apply(table, ticket, TableRows::decode(table, rows));
    }

    fn seeded_cache() -> DataCache {
        let cache = DataCache::new();
        fill(
            &cache,
            Table::Children,
            vec![
                json!({"id": "c1", "name": "Zoe", "primary_parent_id": "p1"}),
                json!({"id": "c2", "name": "Max", "primary_parent_id": "p2"}),
            ],
        );
        fill(
            &cache,
            Table::Staff,
            vec![json!({"id": "s1", "name": "Bea Park", "email": "bea@x.com", "role": "teacher"})],
        );
        fill(
            &cache,
            Table::DailyReports,
            vec![
                json!({"id": "d1", "child_id": "c1", "staff_id": "s1", "report_date": "2024-05-01",
                       "photo_url_1": "https://cdn/1.png", "photo_url_2": "https://cdn/2.png"}),
                json!({"id": "d2", "child_id": "c2", "staff_id": "s9", "report_date": "2024-05-03",
                       "photo_url_1": "https://cdn/3.png"}),
                json!({"id": "d3", "child_id": "c1", "report_date": "2024-05-04"}),
            ],
        );
        cache
    }

    #[test]
    fn staff_see_every_photo_newest_first() {
        let cache = seeded_cache();
        let items = gallery_items(&cache, &user(Role::Admin, "s1"));

        let urls: Vec<&str> = items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["https://cdn/3.png", "https://cdn/1.png", "https://cdn/2.png"]);
        assert_eq!(items[0].staff_name, "Unknown Staff");
        assert_eq!(items[1].staff_name, "Bea Park");
        assert_eq!(items[1].child_name, "Zoe");
        assert_eq!(items[2].slot, 2);
    }

    #[test]
    fn parents_see_only_their_children() {
        let cache = seeded_cache();
        let items = gallery_items(&cache, &user(Role::Parent, "p1"));

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.child_id == "c1"));
    }
}
