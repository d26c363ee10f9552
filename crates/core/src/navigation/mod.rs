//! Navigation module - page tokens, views and the role-aware router.

mod navigation_model;
mod router;

pub use navigation_model::{NavItem, Page, View};
pub use router::{admits, landing_page, nav_items, portal_name, route};
