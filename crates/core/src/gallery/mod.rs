//! Photo gallery built from cached daily reports.

mod gallery_model;
mod gallery_view;

pub use gallery_model::GalleryItem;
pub(crate) use gallery_view::own_child_ids;
pub use gallery_view::gallery_items;
