//! # Camera Description
//!
//! The camera the frame was rendered with: viewpoint, projection kind and
//! viewport rectangle. The engine derives its grid-space transform from the
//! projection kind; it never builds projection matrices itself.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Projection model of the rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    /// Parallel projection; view rays share one direction.
    Orthographic,
    /// Perspective projection; view rays converge on the viewpoint.
    Perspective,
}

impl Default for Projection {
    fn default() -> Self {
        Self::Perspective
    }
}

/// The final image rectangle, in grid-space units.
///
/// For orthographic frames this is the camera-plane extent of the image;
/// for perspective frames it is the angular extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge.
    pub min_x: f64,
    /// Bottom edge.
    pub min_y: f64,
    /// Right edge.
    pub max_x: f64,
    /// Top edge.
    pub max_y: f64,
}

impl Viewport {
    /// Creates a viewport from its edges.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Viewport width.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Viewport height.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Camera description supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Camera position in camera space. For perspective frames the host
    /// conventionally places this at the origin; the engine does not assume
    /// it.
    pub viewpoint: DVec3,
    /// Projection model.
    pub projection: Projection,
    /// Final image rectangle.
    pub viewport: Viewport,
}

impl Camera {
    /// Creates a camera description.
    pub fn new(viewpoint: DVec3, projection: Projection, viewport: Viewport) -> Self {
        Self {
            viewpoint,
            projection,
            viewport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_dimensions() {
        let vp = Viewport::new(-2.0, -1.0, 2.0, 1.0);
        assert_eq!(vp.width(), 4.0);
        assert_eq!(vp.height(), 2.0);
    }

    #[test]
    fn test_projection_default_is_perspective() {
        assert_eq!(Projection::default(), Projection::Perspective);
    }
}
