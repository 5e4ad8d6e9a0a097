//! # Geometry Kernel
//!
//! The small set of primitives the engine needs: triangles with cached
//! bounding boxes and plane terms, axis-aligned 2D rectangles, and the exact
//! triangle/rectangle overlap test used for cell insertion and proscenium
//! filtering.

use glam::{DVec2, DVec3};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Determinant threshold below which a ray is treated as parallel to a
/// triangle's plane.
const RAY_EPSILON: f64 = 1.0e-12;

// =============================================================================
// RECT
// =============================================================================

/// An axis-aligned rectangle in grid space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Lower-left corner.
    pub min: DVec2,
    /// Upper-right corner.
    pub max: DVec2,
}

impl Rect {
    /// Creates a rectangle from corners.
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// The degenerate rectangle containing only `point`.
    pub fn from_point(point: DVec2) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Rectangle width.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Rectangle height.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Rectangle area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Rectangle center.
    #[inline]
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Returns true if `point` lies inside or on the boundary.
    #[inline]
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Returns true if the rectangles share any area or boundary.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Returns true if the bounding box of the segment `a`–`b` overlaps this
    /// rectangle.
    pub fn overlaps_segment_bbox(&self, a: DVec2, b: DVec2) -> bool {
        self.overlaps(&Rect {
            min: a.min(b),
            max: a.max(b),
        })
    }

    /// Grows the rectangle to contain `point`. Monotonic.
    pub fn include(&mut self, point: DVec2) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Pads the rectangle outward on every side.
    pub fn pad(&mut self, amount: f64) {
        self.min -= DVec2::splat(amount);
        self.max += DVec2::splat(amount);
    }
}

// =============================================================================
// TRIANGLE / RECT OVERLAP
// =============================================================================

/// Exact 2D triangle/rectangle overlap via separating axes.
///
/// Axes tested: the rectangle's two axes (as a bounding-box rejection) and
/// the three triangle edge normals. Touching counts as overlap.
pub fn triangle_overlaps_rect(tri: &[DVec2; 3], rect: &Rect) -> bool {
    // Rectangle axes
    let tri_min = tri[0].min(tri[1]).min(tri[2]);
    let tri_max = tri[0].max(tri[1]).max(tri[2]);
    if tri_min.x > rect.max.x || tri_max.x < rect.min.x || tri_min.y > rect.max.y || tri_max.y < rect.min.y {
        return false;
    }

    // Triangle edge normals
    let corners = [
        rect.min,
        DVec2::new(rect.max.x, rect.min.y),
        rect.max,
        DVec2::new(rect.min.x, rect.max.y),
    ];
    for i in 0..3 {
        let edge = tri[(i + 1) % 3] - tri[i];
        let axis = DVec2::new(-edge.y, edge.x);
        if axis.length_squared() == 0.0 {
            continue;
        }

        let mut tri_lo = f64::INFINITY;
        let mut tri_hi = f64::NEG_INFINITY;
        for v in tri {
            let d = axis.dot(*v);
            tri_lo = tri_lo.min(d);
            tri_hi = tri_hi.max(d);
        }

        let mut rect_lo = f64::INFINITY;
        let mut rect_hi = f64::NEG_INFINITY;
        for c in &corners {
            let d = axis.dot(*c);
            rect_lo = rect_lo.min(d);
            rect_hi = rect_hi.max(d);
        }

        if tri_lo > rect_hi || tri_hi < rect_lo {
            return false;
        }
    }

    true
}

// =============================================================================
// POLYGON
// =============================================================================

/// A triangle with a normal and a cached axis-aligned bounding box.
///
/// Lives in either camera space or grid space depending on where it was
/// built; the two uses never mix inside one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon3 {
    vertices: [DVec3; 3],
    normal: DVec3,
    min: DVec3,
    max: DVec3,
}

impl Polygon3 {
    /// Creates a polygon and caches its bounding box.
    pub fn new(vertices: [DVec3; 3], normal: DVec3) -> Self {
        let min = vertices[0].min(vertices[1]).min(vertices[2]);
        let max = vertices[0].max(vertices[1]).max(vertices[2]);
        Self {
            vertices,
            normal,
            min,
            max,
        }
    }

    /// The triangle vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3; 3] {
        &self.vertices
    }

    /// The polygon normal.
    #[inline]
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    /// Lower corner of the bounding box.
    #[inline]
    pub fn bbox_min(&self) -> DVec3 {
        self.min
    }

    /// Upper corner of the bounding box.
    #[inline]
    pub fn bbox_max(&self) -> DVec3 {
        self.max
    }

    /// The XY footprint of the bounding box.
    #[inline]
    pub fn bbox_2d(&self) -> Rect {
        Rect {
            min: DVec2::new(self.min.x, self.min.y),
            max: DVec2::new(self.max.x, self.max.y),
        }
    }

    /// The XY projections of the vertices.
    #[inline]
    pub fn vertices_2d(&self) -> [DVec2; 3] {
        [
            DVec2::new(self.vertices[0].x, self.vertices[0].y),
            DVec2::new(self.vertices[1].x, self.vertices[1].y),
            DVec2::new(self.vertices[2].x, self.vertices[2].y),
        ]
    }

    /// Signed distance of `point` from the polygon's plane, along the
    /// normal.
    #[inline]
    pub fn plane_distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point - self.vertices[0])
    }

    /// Line/triangle intersection (Möller–Trumbore without a sign
    /// restriction on `t`).
    ///
    /// Returns the parameter `t` such that `origin + t * dir` lies inside
    /// the triangle, or `None` when the line misses or runs parallel to the
    /// plane. Callers classify the hit by the sign and magnitude of `t`.
    pub fn line_intersect(&self, origin: DVec3, dir: DVec3) -> Option<f64> {
        let e1 = self.vertices[1] - self.vertices[0];
        let e2 = self.vertices[2] - self.vertices[0];
        let p = dir.cross(e2);
        let det = e1.dot(p);
        if det.abs() < RAY_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = origin - self.vertices[0];
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(e1);
        let v = dir.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        Some(e2.dot(q) * inv_det)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_rect() -> Rect {
        Rect::new(DVec2::ZERO, DVec2::ONE)
    }

    #[test]
    fn test_rect_contains() {
        let r = unit_rect();
        assert!(r.contains(DVec2::new(0.5, 0.5)));
        assert!(r.contains(DVec2::new(0.0, 1.0)));
        assert!(!r.contains(DVec2::new(1.5, 0.5)));
    }

    #[test]
    fn test_rect_include_is_monotonic() {
        let mut r = unit_rect();
        r.include(DVec2::new(2.0, -1.0));
        assert_eq!(r.min, DVec2::new(0.0, -1.0));
        assert_eq!(r.max, DVec2::new(2.0, 1.0));
        let before = r;
        r.include(DVec2::new(0.5, 0.5));
        assert_eq!(r, before);
    }

    #[test]
    fn test_rect_segment_bbox_overlap() {
        let r = unit_rect();
        assert!(r.overlaps_segment_bbox(DVec2::new(-1.0, 0.5), DVec2::new(2.0, 0.5)));
        assert!(!r.overlaps_segment_bbox(DVec2::new(2.0, 2.0), DVec2::new(3.0, 3.0)));
    }

    #[test]
    fn test_triangle_overlaps_rect_inside() {
        let tri = [
            DVec2::new(0.2, 0.2),
            DVec2::new(0.8, 0.2),
            DVec2::new(0.5, 0.8),
        ];
        assert!(triangle_overlaps_rect(&tri, &unit_rect()));
    }

    #[test]
    fn test_triangle_overlaps_rect_corner_cut() {
        // Triangle whose bbox overlaps the rect but whose area does not.
        let tri = [
            DVec2::new(1.5, -0.2),
            DVec2::new(2.5, -0.2),
            DVec2::new(-0.2, 1.5),
        ];
        // The hypotenuse passes outside the unit rect's far corner.
        let far = [
            DVec2::new(2.0, 0.8),
            DVec2::new(3.0, 0.8),
            DVec2::new(2.0, 3.0),
        ];
        assert!(triangle_overlaps_rect(&tri, &unit_rect()));
        assert!(!triangle_overlaps_rect(&far, &unit_rect()));
    }

    #[test]
    fn test_triangle_overlaps_rect_bbox_only_is_rejected() {
        // Thin diagonal triangle far past the corner: bboxes overlap, areas
        // do not.
        let tri = [
            DVec2::new(1.6, 0.0),
            DVec2::new(3.0, 0.0),
            DVec2::new(0.0, 3.0),
        ];
        assert!(!triangle_overlaps_rect(&tri, &unit_rect()));
    }

    #[test]
    fn test_polygon_bbox() {
        let poly = Polygon3::new(
            [
                DVec3::new(-1.0, 0.0, 2.0),
                DVec3::new(1.0, 0.0, 3.0),
                DVec3::new(0.0, 2.0, 4.0),
            ],
            DVec3::Z,
        );
        assert_eq!(poly.bbox_min(), DVec3::new(-1.0, 0.0, 2.0));
        assert_eq!(poly.bbox_max(), DVec3::new(1.0, 2.0, 4.0));
    }

    #[test]
    fn test_line_intersect_forward_hit() {
        let poly = Polygon3::new(
            [
                DVec3::new(-1.0, -1.0, 5.0),
                DVec3::new(1.0, -1.0, 5.0),
                DVec3::new(0.0, 1.0, 5.0),
            ],
            DVec3::new(0.0, 0.0, -1.0),
        );
        let t = poly.line_intersect(DVec3::ZERO, DVec3::Z).unwrap();
        assert!((t - 5.0).abs() < 1.0e-12);
    }

    #[test]
    fn test_line_intersect_backward_hit_has_negative_t() {
        let poly = Polygon3::new(
            [
                DVec3::new(-1.0, -1.0, -5.0),
                DVec3::new(1.0, -1.0, -5.0),
                DVec3::new(0.0, 1.0, -5.0),
            ],
            DVec3::Z,
        );
        let t = poly.line_intersect(DVec3::ZERO, DVec3::Z).unwrap();
        assert!((t + 5.0).abs() < 1.0e-12);
    }

    #[test]
    fn test_line_intersect_miss() {
        let poly = Polygon3::new(
            [
                DVec3::new(2.0, 2.0, 5.0),
                DVec3::new(3.0, 2.0, 5.0),
                DVec3::new(2.0, 3.0, 5.0),
            ],
            DVec3::new(0.0, 0.0, -1.0),
        );
        assert!(poly.line_intersect(DVec3::ZERO, DVec3::Z).is_none());
    }

    #[test]
    fn test_line_intersect_parallel() {
        let poly = Polygon3::new(
            [
                DVec3::new(0.0, -1.0, 5.0),
                DVec3::new(0.0, 1.0, 5.0),
                DVec3::new(0.0, 0.0, 7.0),
            ],
            DVec3::X,
        );
        // Line in the x=1 plane, parallel to the triangle's plane.
        assert!(poly
            .line_intersect(DVec3::new(1.0, 0.0, 0.0), DVec3::Z)
            .is_none());
    }

    #[test]
    fn test_plane_distance_sign() {
        let poly = Polygon3::new(
            [DVec3::ZERO, DVec3::X, DVec3::Y],
            DVec3::Z,
        );
        assert!(poly.plane_distance(DVec3::new(0.2, 0.2, 1.0)) > 0.0);
        assert!(poly.plane_distance(DVec3::new(0.2, 0.2, -1.0)) < 0.0);
        assert_eq!(poly.plane_distance(DVec3::new(0.5, 0.5, 0.0)), 0.0);
    }
}
