//! # Inkline Scene
//!
//! Boundary types for the inkline visibility pipeline. This crate defines
//! what the engine consumes and mutates; it performs no computation of its
//! own.
//!
//! ## Architecture
//!
//! ```text
//! host application (mesh + feature extraction) → inkline-scene → inkline-visibility
//! ```
//!
//! ## Contents
//!
//! - **Mesh**: `Scene`, `Shape`, `Face` — triangle faces with per-face
//!   normals, referenced through id newtypes
//! - **Curve map**: `CurveMap`, `Curve`, `Segment` — ordered chains of
//!   feature-edge segments plus the four result hooks the engine calls
//! - **Camera**: `Camera`, `Projection`, `Viewport`
//!
//! All geometry uses f64 (`glam::DVec3`/`DVec2`).

pub mod camera;
pub mod curve;
pub mod mesh;

pub use camera::{Camera, Projection, Viewport};
pub use curve::{Curve, CurveId, CurveMap, EdgeNature, Occludee, Segment, SegmentSource};
pub use mesh::{Face, FaceId, Scene, Shape, ShapeId};
