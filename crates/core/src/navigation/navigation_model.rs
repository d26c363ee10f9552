use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::session::Role;

/// Page tokens. Serialized as the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Page {
    AdminDashboard,
    Children,
    AddChildPage,
    Staff,
    AddStaffPage,
    AdminParents,
    AddParentPage,
    Rooms,
    AddRoomPage,
    AdminDailyReports,
    CreateDailyReportPage,
    AdminIncidentReports,
    LogIncidentPage,
    ChildMedicationsPage,
    AdminAnnouncements,
    CreateAnnouncementPage,
    AdminBilling,
    CreateInvoicePage,
    AdminWaitlist,
    AddToWaitlistPage,
    AdminGallery,
    TeacherDashboard,
    AssistantDashboard,
    ParentDashboard,
    ParentDailyReports,
    ParentInvoices,
    UnknownRolePage,
}

impl Page {
    pub const ALL: [Page; 27] = [
        Page::AdminDashboard,
        Page::Children,
        Page::AddChildPage,
        Page::Staff,
        Page::AddStaffPage,
        Page::AdminParents,
        Page::AddParentPage,
        Page::Rooms,
        Page::AddRoomPage,
        Page::AdminDailyReports,
        Page::CreateDailyReportPage,
        Page::AdminIncidentReports,
        Page::LogIncidentPage,
        Page::ChildMedicationsPage,
        Page::AdminAnnouncements,
        Page::CreateAnnouncementPage,
        Page::AdminBilling,
        Page::CreateInvoicePage,
        Page::AdminWaitlist,
        Page::AddToWaitlistPage,
        Page::AdminGallery,
        Page::TeacherDashboard,
        Page::AssistantDashboard,
        Page::ParentDashboard,
        Page::ParentDailyReports,
        Page::ParentInvoices,
        Page::UnknownRolePage,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Page::AdminDashboard => "AdminDashboard",
            Page::Children => "Children",
            Page::AddChildPage => "AddChildPage",
            Page::Staff => "Staff",
            Page::AddStaffPage => "AddStaffPage",
            Page::AdminParents => "AdminParents",
            Page::AddParentPage => "AddParentPage",
            Page::Rooms => "Rooms",
            Page::AddRoomPage => "AddRoomPage",
            Page::AdminDailyReports => "AdminDailyReports",
            Page::CreateDailyReportPage => "CreateDailyReportPage",
            Page::AdminIncidentReports => "AdminIncidentReports",
            Page::LogIncidentPage => "LogIncidentPage",
            Page::ChildMedicationsPage => "ChildMedicationsPage",
            Page::AdminAnnouncements => "AdminAnnouncements",
            Page::CreateAnnouncementPage => "CreateAnnouncementPage",
            Page::AdminBilling => "AdminBilling",
            Page::CreateInvoicePage => "CreateInvoicePage",
            Page::AdminWaitlist => "AdminWaitlist",
            Page::AddToWaitlistPage => "AddToWaitlistPage",
            Page::AdminGallery => "AdminGallery",
            Page::TeacherDashboard => "TeacherDashboard",
            Page::AssistantDashboard => "AssistantDashboard",
            Page::ParentDashboard => "ParentDashboard",
            Page::ParentDailyReports => "ParentDailyReports",
            Page::ParentInvoices => "ParentInvoices",
            Page::UnknownRolePage => "UnknownRolePage",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|p| p.token() == s)
            .ok_or_else(|| format!("Unknown page '{}'", s))
    }
}

/// What the host should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    SignIn,
    UnknownRole,
    Portal { role: Role, page: Page },
}

/// One entry of a role's navigation menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub page: Page,
    pub label: &'static str,
}

impl NavItem {
    pub const fn new(page: Page, label: &'static str) -> Self {
        Self { page, label }
    }
}
