//! Typed, id-indexed table contents.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::announcements::Announcement;
use crate::backend::{decode_rows_lossy, Table};
use crate::billing::Invoice;
use crate::children::Child;
use crate::daily_reports::DailyReport;
use crate::incidents::IncidentReport;
use crate::medications::{Medication, MedicationLog};
use crate::parents::Parent;
use crate::rooms::Room;
use crate::staff::StaffMember;
use crate::waitlist::WaitlistEntry;

/// Rows addressable by their store id.
pub trait HasId {
    fn id(&self) -> &str;
}

macro_rules! impl_has_id {
    ($($ty:ty),* $(,)?) => {
        $(impl HasId for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_has_id!(
    Child,
    StaffMember,
    Room,
    DailyReport,
    IncidentReport,
    Medication,
    MedicationLog,
    Announcement,
    Invoice,
    WaitlistEntry,
    Parent,
);

/// Rows in store order with an id index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IndexedRows<T> {
    rows: Vec<T>,
    #[serde(skip)]
    by_id: HashMap<String, usize>,
}

impl<T> Default for IndexedRows<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            by_id: HashMap::new(),
        }
    }
}

impl<T: HasId> IndexedRows<T> {
    pub fn new(rows: Vec<T>) -> Self {
        let by_id = rows
            .iter()
            .enumerate()
            .map(|(index, row)| (row.id().to_string(), index))
            .collect();
        Self { rows, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id).map(|&index| &self.rows[index])
    }
}

impl<T> IndexedRows<T> {
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

macro_rules! table_rows {
    ($($variant:ident : $ty:ty => $accessor:ident),* $(,)?) => {
        /// Cached contents of one table.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(untagged)]
        pub enum TableRows {
            $($variant(IndexedRows<$ty>),)*
        }

        impl TableRows {
            pub fn empty(table: Table) -> Self {
                match table {
                    $(Table::$variant => TableRows::$variant(IndexedRows::default()),)*
                }
            }

            /// Decodes raw store rows for `table`. Rows that do not decode
            /// are left out.
            pub fn decode(table: Table, rows: Vec<Value>) -> Self {
                match table {
                    $(Table::$variant => TableRows::$variant(IndexedRows::new(
                        decode_rows_lossy::<$ty>(table, rows),
                    )),)*
                }
            }

            pub fn table(&self) -> Table {
                match self {
                    $(TableRows::$variant(_) => Table::$variant,)*
                }
            }

            pub fn len(&self) -> usize {
                match self {
                    $(TableRows::$variant(rows) => rows.len(),)*
                }
            }

            $(
                pub fn $accessor(&self) -> Option<&IndexedRows<$ty>> {
                    match self {
                        TableRows::$variant(rows) => Some(rows),
                        _ => None,
                    }
                }
            )*
        }
    };
}

table_rows!(
    Children: Child => children,
    Staff: StaffMember => staff,
    Rooms: Room => rooms,
    DailyReports: DailyReport => daily_reports,
    IncidentReports: IncidentReport => incident_reports,
    Medications: Medication => medications,
    MedicationLogs: MedicationLog => medication_logs,
    Announcements: Announcement => announcements,
    Invoices: Invoice => invoices,
    WaitlistEntries: WaitlistEntry => waitlist_entries,
    Parents: Parent => parents,
);

impl TableRows {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
