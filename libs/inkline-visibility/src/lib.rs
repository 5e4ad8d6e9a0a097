//! # Inkline Visibility
//!
//! Quantitative-invisibility (QI) computation for non-photorealistic line
//! rendering. For every candidate curve in a static frame, this crate counts
//! how many opaque surfaces lie between the curve and the camera and finds
//! the surface immediately behind it (the occludee), writing both results
//! back into the curve map.
//!
//! ## Architecture
//!
//! ```text
//! OccluderSource → CulledOccluderSource → density → Grid → sampling strategies
//! ```
//!
//! One-shot, single-threaded, offline: the grid is built once per frame and
//! is read-only during sampling. Cooperative cancellation through a
//! [`ProgressMonitor`] is the only early exit.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use inkline_visibility::{compute_visibility, NoopMonitor, VisibilityConfig};
//!
//! let config = VisibilityConfig::default();
//! let stats = compute_visibility(&scene, &mut curves, &camera, &config, &mut NoopMonitor)?;
//! ```

pub mod density;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod monitor;
pub mod occluder;
pub mod proscenium;
pub mod transform;
pub mod visibility;

pub use density::{DensityPolicy, GridDensity};
pub use error::VisibilityError;
pub use grid::Grid;
pub use monitor::{NoopMonitor, ProgressMonitor};
pub use occluder::{CulledOccluderSource, OccluderSource};
pub use proscenium::Proscenium;
pub use transform::GridTransform;
pub use visibility::{compute_visibility, VisibilityAlgorithm, VisibilityConfig, VisibilityStats};
