use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::backend::{BackendError, DirectoryBackend};
use super::domain::{Board, City, SchoolId, SchoolRecord};
use super::listing::{available_boards, derive_page, ListingPage, ListingState};

pub const LOAD_FAILED: &str = "Failed to load schools";

/// Read side of the directory: fetches rows from the backend and derives
/// listing pages from them.
pub struct DirectoryService<B> {
    backend: Arc<B>,
}

/// A listing page plus an optional notice when the fetch failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingOutcome {
    #[serde(flatten)]
    pub page: ListingPage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
}

impl<B> DirectoryService<B>
where
    B: DirectoryBackend + 'static,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Fetch schools and derive the page for `state`.
    ///
    /// A failed fetch is not an error here: the listing renders empty and
    /// carries a notice for the user.
    pub fn listing(&self, state: &ListingState) -> ListingOutcome {
        match self.backend.fetch_schools() {
            Ok(schools) => ListingOutcome {
                page: derive_page(&schools, state),
                notice: None,
            },
            Err(err) => {
                warn!(error = %err, "school fetch failed, rendering empty listing");
                ListingOutcome {
                    page: derive_page(&[], state),
                    notice: Some(LOAD_FAILED),
                }
            }
        }
    }

    pub fn school(&self, id: &SchoolId) -> Result<SchoolRecord, DirectoryError> {
        self.backend
            .fetch_schools()?
            .into_iter()
            .find(|school| &school.id == id)
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))
    }

    pub fn cities(&self) -> Result<Vec<City>, DirectoryError> {
        Ok(self.backend.fetch_cities()?)
    }

    pub fn boards(&self) -> Result<Vec<Board>, DirectoryError> {
        let schools = self.backend.fetch_schools()?;
        Ok(available_boards(&schools))
    }
}

/// Error raised by the directory read side.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("school {0} not found")]
    NotFound(SchoolId),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
