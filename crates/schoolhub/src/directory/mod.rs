//! School directory: records, the listing view-model, backend seams and the
//! HTTP surface built on top of them.

pub mod admin;
pub mod backend;
pub mod domain;
pub mod import;
pub mod listing;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use backend::{BackendError, DirectoryBackend, SessionDirectory};
pub use domain::{
    Board, City, Ratings, Role, SchoolDraft, SchoolFields, SchoolId, SchoolRecord,
    SchoolRecordError, SchoolType, SessionUser, UserId,
};
pub use import::{SchoolImportError, SchoolImporter};
pub use listing::{
    available_boards, derive_page, ListingPage, ListingState, Selection, SortKey, PAGE_SIZE,
};
pub use router::{directory_router, ListingQuery};
pub use service::{DirectoryError, DirectoryService, ListingOutcome};
