//! Repository trait definitions for the track search.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`track`]: Coarse spatial queries, identifier and free-text lookups
//! - [`metadata`]: Cruise metadata lookups
//!
//! For code that needs both capabilities, use the [`FullRepository`] bound:
//!
//! ```ignore
//! async fn describe<R: FullRepository + ?Sized>(repo: &R, id: &CruiseId) -> RepositoryResult<()> {
//!     let track = repo.find_track(id).await?;
//!     let metadata = repo.lookup_metadata(id).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod metadata;
pub mod track;

pub use error::{ErrorContext, ErrorKind, RepositoryError, RepositoryResult};
pub use metadata::CruiseMetadataRepository;
pub use track::TrackStore;

/// Composite trait bound for a complete repository implementation.
pub trait FullRepository: TrackStore + CruiseMetadataRepository {}

impl<T> FullRepository for T where T: TrackStore + CruiseMetadataRepository {}
