//! Pure mapping from (role, page token) to a view.

use super::navigation_model::{NavItem, Page, View};
use crate::session::Role;

const ADMIN_NAV: [NavItem; 11] = [
    NavItem::new(Page::AdminDashboard, "Dashboard"),
    NavItem::new(Page::Children, "Children"),
    NavItem::new(Page::Staff, "Staff"),
    NavItem::new(Page::AdminParents, "Parents"),
    NavItem::new(Page::Rooms, "Rooms"),
    NavItem::new(Page::AdminDailyReports, "Daily Reports"),
    NavItem::new(Page::AdminIncidentReports, "Incident Reports"),
    NavItem::new(Page::AdminGallery, "Gallery"),
    NavItem::new(Page::AdminAnnouncements, "Announcements"),
    NavItem::new(Page::AdminBilling, "Billing"),
    NavItem::new(Page::AdminWaitlist, "Waitlist"),
];

const TEACHER_NAV: [NavItem; 4] = [
    NavItem::new(Page::TeacherDashboard, "Dashboard"),
    NavItem::new(Page::AdminDailyReports, "Daily Reports"),
    NavItem::new(Page::AdminGallery, "Gallery"),
    NavItem::new(Page::AdminAnnouncements, "Announcements"),
];

const ASSISTANT_NAV: [NavItem; 3] = [
    NavItem::new(Page::AssistantDashboard, "Dashboard"),
    NavItem::new(Page::AdminDailyReports, "Create Report"),
    NavItem::new(Page::AdminGallery, "Gallery"),
];

const PARENT_NAV: [NavItem; 5] = [
    NavItem::new(Page::ParentDashboard, "Dashboard"),
    NavItem::new(Page::ParentDailyReports, "Daily Reports"),
    NavItem::new(Page::ParentInvoices, "Invoices"),
    NavItem::new(Page::AdminGallery, "Photo Gallery"),
    NavItem::new(Page::AdminAnnouncements, "Announcements"),
];

/// Landing page for a role. Unresolved roles land on the unknown-role page.
pub fn landing_page(role: Role) -> Page {
    match role {
        Role::Admin => Page::AdminDashboard,
        Role::Teacher => Page::TeacherDashboard,
        Role::Assistant => Page::AssistantDashboard,
        Role::Parent => Page::ParentDashboard,
        Role::Unknown | Role::UnknownProfile | Role::ExceptionProfile => Page::UnknownRolePage,
    }
}

/// Whether `page` belongs to `role`'s portal.
pub fn admits(role: Role, page: Page) -> bool {
    use Page::*;
    match role {
        Role::Admin => match page {
            AdminDashboard | Children | AddChildPage | Staff | AddStaffPage | AdminParents
            | AddParentPage | Rooms | AddRoomPage | AdminDailyReports | CreateDailyReportPage
            | AdminIncidentReports | LogIncidentPage | ChildMedicationsPage
            | AdminAnnouncements | CreateAnnouncementPage | AdminBilling | CreateInvoicePage
            | AdminWaitlist | AddToWaitlistPage | AdminGallery => true,
            TeacherDashboard | AssistantDashboard | ParentDashboard | ParentDailyReports
            | ParentInvoices | UnknownRolePage => false,
        },
        Role::Teacher => matches!(
            page,
            TeacherDashboard
                | AdminDailyReports
                | CreateDailyReportPage
                | AdminGallery
                | AdminAnnouncements
        ),
        Role::Assistant => matches!(
            page,
            AssistantDashboard | AdminDailyReports | CreateDailyReportPage | AdminGallery
        ),
        Role::Parent => matches!(
            page,
            ParentDashboard | ParentDailyReports | ParentInvoices | AdminGallery | AdminAnnouncements
        ),
        Role::Unknown | Role::UnknownProfile | Role::ExceptionProfile => false,
    }
}

/// Maps the session role and page token to a view.
///
/// `role` is `None` when there is no session. Pages outside the role's
/// portal, and an unset page, fall back to the role's dashboard.
pub fn route(role: Option<Role>, page: Option<Page>) -> View {
    let Some(role) = role else {
        return View::SignIn;
    };
    if !role.is_resolved() {
        return View::UnknownRole;
    }
    let page = page
        .filter(|p| admits(role, *p))
        .unwrap_or_else(|| landing_page(role));
    View::Portal { role, page }
}

pub fn nav_items(role: Role) -> &'static [NavItem] {
    match role {
        Role::Admin => &ADMIN_NAV,
        Role::Teacher => &TEACHER_NAV,
        Role::Assistant => &ASSISTANT_NAV,
        Role::Parent => &PARENT_NAV,
        Role::Unknown | Role::UnknownProfile | Role::ExceptionProfile => &[],
    }
}

pub fn portal_name(role: Role) -> &'static str {
    match role {
        Role::Admin => "Admin Portal",
        Role::Teacher => "Teacher Portal",
        Role::Assistant => "Assistant Portal",
        Role::Parent => "Parent Portal",
        Role::Unknown | Role::UnknownProfile | Role::ExceptionProfile => "Welcome",
    }
}
