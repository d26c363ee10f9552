//! Backend module - collaborator contracts, query model and the in-process
//! backends (disabled and in-memory).

mod backend_model;
mod backend_traits;
mod disabled;
mod memory;
mod repository;

pub use backend_model::{
    AuthChange, AuthEvent, AuthSession, AuthUser, Backend, ChangeEvent, ChangeKind,
    FeedSubscription, FileUpload, Filter, OrderBy, SelectQuery, Table,
};
pub use backend_traits::{BlobStore, ChangeFeed, IdentityProvider, RecordStore};
pub use disabled::DisabledBackend;
pub use memory::InMemoryBackend;
pub use repository::{decode_row, decode_rows, decode_rows_lossy, Repository};
