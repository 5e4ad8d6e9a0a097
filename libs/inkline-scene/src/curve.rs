//! # Curve Map
//!
//! Curves are maximal chains of feature-edge segments. The visibility engine
//! treats them as read-only geometry plus a small mutable result surface:
//! the four hooks (`set_qi`, `add_occluder`, `set_occludee`,
//! `set_no_occludee`) and the in-image bookkeeping maintained by the culling
//! pass.
//!
//! 2D positions throughout this module live in *grid space*: the projection
//! space the engine builds its grid in (camera-plane XY for orthographic,
//! angular coordinates for perspective). The host projects curve vertices
//! into that space when it builds the curve map.

use crate::mesh::{FaceId, ShapeId};
use glam::{DVec2, DVec3};

/// Unique identifier for curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurveId(pub u32);

/// Feature classification of a curve, as a set of nature bits.
///
/// The visibility pass carries the nature through unchanged; it exists for
/// the downstream stroke pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeNature(pub u16);

impl EdgeNature {
    /// No feature classification.
    pub const NO_FEATURE: EdgeNature = EdgeNature(0);
    /// Silhouette edge: surface turns away from the camera across it.
    pub const SILHOUETTE: EdgeNature = EdgeNature(1);
    /// Border edge: boundary of an open surface.
    pub const BORDER: EdgeNature = EdgeNature(1 << 1);
    /// Crease edge: dihedral angle beyond the crease threshold.
    pub const CREASE: EdgeNature = EdgeNature(1 << 2);
    /// Ridge or valley line on a smooth surface.
    pub const RIDGE_VALLEY: EdgeNature = EdgeNature(1 << 3);
    /// Boundary between materials.
    pub const MATERIAL_BOUNDARY: EdgeNature = EdgeNature(1 << 4);
    /// Edge explicitly marked by the author.
    pub const EDGE_MARK: EdgeNature = EdgeNature(1 << 5);

    /// Returns true if all bits of `other` are set in `self`.
    #[inline]
    pub fn contains(self, other: EdgeNature) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two nature sets.
    #[inline]
    pub fn union(self, other: EdgeNature) -> EdgeNature {
        EdgeNature(self.0 | other.0)
    }
}

/// The face(s) a segment was extracted from.
///
/// Smooth segments lie on exactly one face; sharp segments run along a mesh
/// edge and may reference the faces on either side (absent at borders).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentSource {
    /// Segment crossing the interior of a single face.
    Smooth {
        /// The face the segment lies on.
        face: FaceId,
    },
    /// Segment along a mesh edge.
    Sharp {
        /// Face on one side, if any.
        face_a: Option<FaceId>,
        /// Face on the other side, if any.
        face_b: Option<FaceId>,
    },
}

impl SegmentSource {
    /// Returns true if the given face is a source face of this segment.
    #[inline]
    pub fn is_adjacent(&self, face: FaceId) -> bool {
        match self {
            SegmentSource::Smooth { face: f } => *f == face,
            SegmentSource::Sharp { face_a, face_b } => {
                *face_a == Some(face) || *face_b == Some(face)
            }
        }
    }

    /// Returns true for smooth segments.
    #[inline]
    pub fn is_smooth(&self) -> bool {
        matches!(self, SegmentSource::Smooth { .. })
    }
}

/// One feature-edge segment of a curve chain.
#[derive(Debug, Clone)]
pub struct Segment {
    /// First endpoint, camera space.
    a: DVec3,
    /// Second endpoint, camera space.
    b: DVec3,
    /// First endpoint, grid space (2D).
    a2: DVec2,
    /// Second endpoint, grid space (2D).
    b2: DVec2,
    /// Face(s) this segment was extracted from.
    source: SegmentSource,
    /// Set by the culling pass: this segment contributes a sample point.
    in_image: bool,
}

impl Segment {
    /// Creates a segment from camera-space and grid-space endpoints.
    pub fn new(a: DVec3, b: DVec3, a2: DVec2, b2: DVec2, source: SegmentSource) -> Self {
        Self {
            a,
            b,
            a2,
            b2,
            source,
            in_image: false,
        }
    }

    /// Camera-space endpoints.
    #[inline]
    pub fn endpoints(&self) -> (DVec3, DVec3) {
        (self.a, self.b)
    }

    /// Grid-space endpoints.
    #[inline]
    pub fn endpoints_2d(&self) -> (DVec2, DVec2) {
        (self.a2, self.b2)
    }

    /// Camera-space midpoint: the sample point for ray tests.
    #[inline]
    pub fn center(&self) -> DVec3 {
        (self.a + self.b) * 0.5
    }

    /// Grid-space midpoint: the cell lookup key.
    #[inline]
    pub fn center_2d(&self) -> DVec2 {
        (self.a2 + self.b2) * 0.5
    }

    /// The face(s) this segment was extracted from.
    #[inline]
    pub fn source(&self) -> SegmentSource {
        self.source
    }

    /// True once the culling pass has marked this segment as a sample
    /// candidate.
    #[inline]
    pub fn is_in_image(&self) -> bool {
        self.in_image
    }

    /// Marks this segment as a sample candidate. Culling bookkeeping.
    #[inline]
    pub fn mark_in_image(&mut self) {
        self.in_image = true;
    }
}

/// The occludee result: the nearest face behind a curve along the view ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occludee {
    /// The occludee face.
    pub face: FaceId,
    /// Shape owning the occludee face.
    pub shape: ShapeId,
    /// Camera-space intersection point of the sample ray with the face.
    pub point: DVec3,
}

/// A maximal chain of feature-edge segments with one visibility result.
#[derive(Debug, Clone)]
pub struct Curve {
    nature: EdgeNature,
    segments: Vec<Segment>,
    in_image: bool,
    qi: u8,
    occluders: Vec<ShapeId>,
    occludee: Option<Occludee>,
    occludee_computed: bool,
}

impl Curve {
    /// Creates a curve from an ordered segment chain.
    pub fn new(nature: EdgeNature, segments: Vec<Segment>) -> Self {
        Self {
            nature,
            segments,
            in_image: false,
            qi: 0,
            occluders: Vec::new(),
            occludee: None,
            occludee_computed: false,
        }
    }

    /// Feature classification of this curve.
    #[inline]
    pub fn nature(&self) -> EdgeNature {
        self.nature
    }

    /// The ordered segment chain.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Mutable access to the segment chain. Culling bookkeeping only.
    #[inline]
    pub fn segments_mut(&mut self) -> &mut [Segment] {
        &mut self.segments
    }

    /// True if any segment crosses the view proscenium.
    #[inline]
    pub fn is_in_image(&self) -> bool {
        self.in_image
    }

    /// Sets the in-image flag. Culling bookkeeping.
    #[inline]
    pub fn set_in_image(&mut self, in_image: bool) {
        self.in_image = in_image;
    }

    /// True if at least one segment can be sampled.
    #[inline]
    pub fn occludable(&self) -> bool {
        self.segments.iter().any(Segment::is_in_image)
    }

    // -------------------------------------------------------------------------
    // Result hooks
    // -------------------------------------------------------------------------

    /// Hook: assigns the quantitative invisibility of this curve.
    #[inline]
    pub fn set_qi(&mut self, qi: u8) {
        self.qi = qi;
    }

    /// Hook: records a shape found occluding this curve. Deduplicated.
    pub fn add_occluder(&mut self, shape: ShapeId) {
        if !self.occluders.contains(&shape) {
            self.occluders.push(shape);
        }
    }

    /// Hook: attaches the occludee face and intersection point.
    #[inline]
    pub fn set_occludee(&mut self, occludee: Occludee) {
        self.occludee = Some(occludee);
        self.occludee_computed = true;
    }

    /// Hook: marks that the occludee search completed without a result.
    #[inline]
    pub fn set_no_occludee(&mut self) {
        self.occludee = None;
        self.occludee_computed = true;
    }

    // -------------------------------------------------------------------------
    // Result accessors
    // -------------------------------------------------------------------------

    /// Quantitative invisibility assigned to this curve.
    #[inline]
    pub fn qi(&self) -> u8 {
        self.qi
    }

    /// Shapes found occluding this curve.
    #[inline]
    pub fn occluders(&self) -> &[ShapeId] {
        &self.occluders
    }

    /// The occludee, if one was found.
    #[inline]
    pub fn occludee(&self) -> Option<&Occludee> {
        self.occludee.as_ref()
    }

    /// True once the occludee search ran for this curve.
    #[inline]
    pub fn occludee_computed(&self) -> bool {
        self.occludee_computed
    }
}

/// The ordered collection of curves the engine mutates in place.
#[derive(Debug, Clone, Default)]
pub struct CurveMap {
    curves: Vec<Curve>,
}

impl CurveMap {
    /// Creates an empty curve map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a curve and returns its id.
    pub fn add_curve(&mut self, curve: Curve) -> CurveId {
        let id = CurveId(self.curves.len() as u32);
        self.curves.push(curve);
        id
    }

    /// Returns the number of curves.
    #[inline]
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Returns true if the map holds no curves.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Total number of segments across all curves.
    pub fn segment_count(&self) -> usize {
        self.curves.iter().map(|c| c.segments().len()).sum()
    }

    /// Returns the curve with the given id.
    #[inline]
    pub fn curve(&self, id: CurveId) -> &Curve {
        &self.curves[id.0 as usize]
    }

    /// Iterates curves in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Curve> {
        self.curves.iter()
    }

    /// Iterates curves mutably in insertion order.
    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Curve> {
        self.curves.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(a: DVec3, b: DVec3) -> Segment {
        Segment::new(
            a,
            b,
            DVec2::new(a.x, a.y),
            DVec2::new(b.x, b.y),
            SegmentSource::Smooth { face: FaceId(0) },
        )
    }

    #[test]
    fn test_nature_contains() {
        let n = EdgeNature::SILHOUETTE.union(EdgeNature::BORDER);
        assert!(n.contains(EdgeNature::SILHOUETTE));
        assert!(n.contains(EdgeNature::BORDER));
        assert!(!n.contains(EdgeNature::CREASE));
    }

    #[test]
    fn test_segment_centers() {
        let s = segment(DVec3::ZERO, DVec3::new(2.0, 4.0, 6.0));
        assert_eq!(s.center(), DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(s.center_2d(), DVec2::new(1.0, 2.0));
    }

    #[test]
    fn test_source_adjacency() {
        let smooth = SegmentSource::Smooth { face: FaceId(3) };
        assert!(smooth.is_adjacent(FaceId(3)));
        assert!(!smooth.is_adjacent(FaceId(4)));

        let sharp = SegmentSource::Sharp {
            face_a: Some(FaceId(1)),
            face_b: None,
        };
        assert!(sharp.is_adjacent(FaceId(1)));
        assert!(!sharp.is_adjacent(FaceId(2)));
    }

    #[test]
    fn test_curve_hooks() {
        let mut curve = Curve::new(EdgeNature::SILHOUETTE, vec![segment(DVec3::ZERO, DVec3::X)]);
        curve.set_qi(3);
        curve.add_occluder(ShapeId(1));
        curve.add_occluder(ShapeId(1));
        curve.add_occluder(ShapeId(2));
        assert_eq!(curve.qi(), 3);
        assert_eq!(curve.occluders(), &[ShapeId(1), ShapeId(2)]);

        assert!(!curve.occludee_computed());
        curve.set_no_occludee();
        assert!(curve.occludee_computed());
        assert!(curve.occludee().is_none());
    }

    #[test]
    fn test_curve_occludable_follows_marks() {
        let mut curve = Curve::new(EdgeNature::BORDER, vec![segment(DVec3::ZERO, DVec3::X)]);
        assert!(!curve.occludable());
        curve.segments_mut()[0].mark_in_image();
        assert!(curve.occludable());
    }
}
