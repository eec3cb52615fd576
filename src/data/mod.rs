//! Trip Dataset Module
//!
//! This module provides fetching, decoding, and subsampling of trip GPS
//! datasets for the heat layer. Datasets arrive as a JSON object mapping
//! trip identifiers to ordered record lists, each record an array of
//! `[timestamp, latitude, longitude, ...]`.
//!
//! # Overview
//!
//! - **[`Dataset`]**: Decoded trip map with deterministic iteration order
//! - **[`TripPoint`]**: One observed position with its record timestamp
//! - **[`DatasetVariant`]**: The `day`/`night` flavors served by the endpoint
//! - **[`sample`]**: Uniform random subsampling that caps rendered points
//! - **[`TimeWindow`]**: Optional record filter around a reference time
//!
//! # Usage Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use trip_heatmap_viewer::data::{Dataset, sample};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = Dataset::parse(r#"{"trip-1": [[1325376000, 37.774, -122.433]]}"#)?;
//! let (points, info) = dataset.flatten();
//! assert_eq!(info.point_count, 1);
//!
//! // Cap the rendered points with a reproducible draw
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let drawn = sample(&mut rng, &points, 100_000);
//! assert_eq!(drawn.len(), 1);
//! # Ok(())
//! # }
//! ```

mod dataset;
mod fetch;
mod sample;

// Public API exports
pub use dataset::{
    DEFAULT_WINDOW_AFTER, DEFAULT_WINDOW_BEFORE, Dataset, DatasetInfo, TimeWindow, TripPoint,
    bounding_box,
};
pub use fetch::{DEFAULT_ENDPOINT, DatasetVariant, fetch_dataset};
pub use sample::sample;

/// Error types for the data module
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Dataset decoding error: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DataError>;
