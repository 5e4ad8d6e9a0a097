//! # Grid-Space Transforms
//!
//! The two projection models share one grid implementation; all that differs
//! is how camera-space points map into grid space and how depth is measured
//! along a view ray. Both are closed variants dispatched by ordinary
//! branching.

use glam::{DVec2, DVec3};

/// Mapping from camera space into grid space.
///
/// - `Orthographic`: identity on X/Y with the depth axis negated, so depth
///   grows away from a camera looking down −Z.
/// - `Spherical`: angular coordinates around the viewpoint,
///   `(atan(x/z), atan(y/z), range)`, so diverging perspective rays become
///   parallel vertical lines in grid space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridTransform {
    /// Parallel projection.
    Orthographic,
    /// Perspective projection around `viewpoint`.
    Spherical {
        /// Center of projection.
        viewpoint: DVec3,
    },
}

impl GridTransform {
    /// Maps a camera-space point into grid space.
    pub fn apply(&self, point: DVec3) -> DVec3 {
        match self {
            GridTransform::Orthographic => DVec3::new(point.x, point.y, -point.z),
            GridTransform::Spherical { viewpoint } => {
                let q = point - *viewpoint;
                DVec3::new((q.x / q.z).atan(), (q.y / q.z).atan(), q.length())
            }
        }
    }

    /// Maps a normal with the same functor as the vertices.
    ///
    /// The grid-space normal is only used for bounding-box bookkeeping;
    /// exact ray tests always run against the camera-space polygon.
    pub fn apply_normal(&self, normal: DVec3) -> DVec3 {
        match self {
            GridTransform::Orthographic => DVec3::new(normal.x, normal.y, -normal.z),
            GridTransform::Spherical { .. } => normal,
        }
    }

    /// Grid-space depth of a camera-space point.
    #[inline]
    pub fn depth(&self, point: DVec3) -> f64 {
        self.apply(point).z
    }

    /// The XY footprint of a camera-space point in grid space.
    #[inline]
    pub fn footprint(&self, point: DVec3) -> DVec2 {
        let p = self.apply(point);
        DVec2::new(p.x, p.y)
    }
}
