//! HTTP server module.
//!
//! Exposes the track search over a small REST API:
//!
//! ```text
//! GET  /health
//! GET  /v1/tracks/search?shapes=..&min_time=..&max_time=..&ids=..&q=..
//! POST /v1/tracks/search
//! GET  /v1/cruises/{cruise_id}
//! ```
//!
//! Handlers only decode requests and map errors; searching is done by
//! [`crate::services::SpatialQueryEngine`].

#[cfg(feature = "http-server")]
pub mod handlers;

#[cfg(feature = "http-server")]
pub mod router;

#[cfg(feature = "http-server")]
pub mod state;

#[cfg(feature = "http-server")]
pub mod error;

#[cfg(feature = "http-server")]
pub mod dto;

#[cfg(feature = "http-server")]
pub use router::create_router;

#[cfg(feature = "http-server")]
pub use state::AppState;
