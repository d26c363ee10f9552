//! Fixed fetch specs per table and the table set each role loads.

use crate::backend::{OrderBy, SelectQuery, Table};
use crate::constants::CHANGE_FEED_CHANNEL_PREFIX;
use crate::session::Role;

/// Children are read with their primary parent embedded.
const CHILDREN_PROJECTION: &str =
    "*, parents!primary_parent_id(id, first_name, last_name, email)";

/// How a table is fetched on refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub table: Table,
    pub order_column: &'static str,
    pub ascending: bool,
    pub columns: &'static str,
}

pub fn table_spec(table: Table) -> TableSpec {
    let (order_column, ascending, columns) = match table {
        Table::Children => ("name", true, CHILDREN_PROJECTION),
        Table::Staff => ("name", true, "*"),
        Table::Rooms => ("name", true, "*"),
        Table::DailyReports => ("report_date", false, "*"),
        Table::IncidentReports => ("incident_datetime", false, "*"),
        Table::Medications => ("medication_name", true, "*"),
        Table::MedicationLogs => ("administered_at", false, "*"),
        Table::Announcements => ("publish_date", false, "*"),
        Table::Invoices => ("invoice_date", false, "*"),
        Table::WaitlistEntries => ("created_at", true, "*"),
        Table::Parents => ("last_name", true, "*"),
    };
    TableSpec {
        table,
        order_column,
        ascending,
        columns,
    }
}

/// The full-table select issued by a refresh.
pub fn select_for(table: Table) -> SelectQuery {
    let spec = table_spec(table);
    let order = if spec.ascending {
        OrderBy::asc(spec.order_column)
    } else {
        OrderBy::desc(spec.order_column)
    };
    SelectQuery::new(table).columns(spec.columns).order(order)
}

/// Tables loaded when `role` is established. Unresolved roles load nothing.
pub fn tables_for_role(role: Role) -> Vec<Table> {
    if !role.is_resolved() {
        return Vec::new();
    }
    let mut tables = vec![Table::Rooms, Table::Announcements, Table::Children];
    if role.is_staff() {
        tables.extend([Table::Staff, Table::DailyReports, Table::Medications]);
    }
    if role == Role::Parent {
        tables.extend([Table::DailyReports, Table::Invoices]);
    }
    if role == Role::Admin {
        tables.extend([
            Table::IncidentReports,
            Table::MedicationLogs,
            Table::Invoices,
            Table::WaitlistEntries,
            Table::Parents,
        ]);
    }
    tables
}

/// Change-feed channel name for a role's subscription.
pub fn feed_channel(role: Role) -> String {
    format!("{}-{}", CHANGE_FEED_CHANNEL_PREFIX, role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_loads_every_table_once() {
        let mut tables = tables_for_role(Role::Admin);
        let loaded = tables.len();
        tables.sort();
        tables.dedup();
        assert_eq!(loaded, tables.len());
        assert_eq!(tables, Table::ALL.to_vec());
    }

    #[test]
    fn parent_battery() {
        assert_eq!(
            tables_for_role(Role::Parent),
            vec![
                Table::Rooms,
                Table::Announcements,
                Table::Children,
                Table::DailyReports,
                Table::Invoices
            ]
        );
    }

    #[test]
    fn assistant_skips_admin_tables() {
        let tables = tables_for_role(Role::Assistant);
        assert!(tables.contains(&Table::Medications));
        assert!(!tables.contains(&Table::Invoices));
        assert!(!tables.contains(&Table::Parents));
    }

    #[test]
    fn unresolved_roles_load_nothing() {
        assert!(tables_for_role(Role::UnknownProfile).is_empty());
        assert!(tables_for_role(Role::ExceptionProfile).is_empty());
        assert!(tables_for_role(Role::Unknown).is_empty());
    }

    #[test]
    fn children_select_embeds_parent() {
        let query = select_for(Table::Children);
        assert!(query.columns.contains("parents!primary_parent_id"));
        assert_eq!(query.order, Some(OrderBy::asc("name")));
        assert_eq!(
            select_for(Table::DailyReports).order,
            Some(OrderBy::desc("report_date"))
        );
    }

    #[test]
    fn channel_names_carry_role() {
        assert_eq!(feed_channel(Role::Teacher), "console-updates-teacher");
    }
}
