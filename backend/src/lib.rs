//! # Cruise Tracks
//!
//! Geospatial search over oceanographic cruise tracks.
//!
//! A client sends one or more query shapes (polygons, rectangles, circles)
//! together with a year range. The backend finds every cruise whose track
//! passes through any of the shapes within that range and returns the
//! matching track ids, the cruise metadata and a decimated copy of each
//! track for plotting.
//!
//! ## Architecture
//!
//! - [`models`]: points, rings, query shapes, tracks and time windows
//! - [`algorithms`]: containment tests, circle approximation, decimation
//! - [`db`]: the track store trait, in-memory and PostGIS backends
//! - [`services`]: the two-phase spatial search and response assembly
//! - [`config`]: search defaults and their environment overrides
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! Searching is a coarse bounding-box query against the store followed by
//! an exact vertex-in-polygon refinement in memory. Shapes are searched
//! independently and their results unioned, so one failing shape only
//! produces a warning.

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod algorithms;
pub mod api;
pub mod config;

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
