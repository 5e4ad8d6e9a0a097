//! # Occluder Sources
//!
//! [`OccluderSource`] walks every face of every shape as a restartable
//! cursor, handing out polygons in both camera space and grid space.
//! [`CulledOccluderSource`] wraps it with proscenium culling: a single
//! pre-scan over the curve map marks in-image curves, picks one guaranteed
//! sample segment per visible curve (growing the occluder proscenium when it
//! must), and then filters occluders against the grown proscenium.

use crate::geometry::{triangle_overlaps_rect, Polygon3, Rect};
use crate::proscenium::Proscenium;
use crate::transform::GridTransform;
use config::constants::OCCLUDER_PROSCENIUM_EPSILON;
use inkline_scene::{CurveMap, FaceId, Scene, ShapeId};

// =============================================================================
// OCCLUDER
// =============================================================================

/// One occluder: a face in both spaces plus its identity.
#[derive(Debug, Clone)]
pub struct Occluder {
    /// The face in camera space; exact ray tests run against this.
    pub camera: Polygon3,
    /// The face in grid space; placement and overlap tests run against this.
    pub grid: Polygon3,
    /// Identity of the source face.
    pub face: FaceId,
    /// Shape owning the source face.
    pub shape: ShapeId,
}

// =============================================================================
// OCCLUDER SOURCE
// =============================================================================

/// Restartable cursor over every face of every shape.
///
/// An empty scene yields an immediately-invalid, zero-occluder source; that
/// is a legal empty result, not an error.
#[derive(Debug)]
pub struct OccluderSource<'s> {
    scene: &'s Scene,
    transform: GridTransform,
    cursor: usize,
    current: Option<Occluder>,
}

impl<'s> OccluderSource<'s> {
    /// Creates a source positioned on the first face.
    pub fn new(scene: &'s Scene, transform: GridTransform) -> Self {
        let mut source = Self {
            scene,
            transform,
            cursor: 0,
            current: None,
        };
        source.begin();
        source
    }

    /// Restarts the cursor at the first face.
    pub fn begin(&mut self) {
        self.cursor = 0;
        self.load();
    }

    /// Returns true while the cursor points at a face.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.current.is_some()
    }

    /// Advances the cursor; returns the new validity.
    pub fn next(&mut self) -> bool {
        if self.current.is_some() {
            self.cursor += 1;
            self.load();
        }
        self.is_valid()
    }

    /// The occluder under the cursor.
    #[inline]
    pub fn current(&self) -> Option<&Occluder> {
        self.current.as_ref()
    }

    /// Total number of faces this source will visit.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.scene.face_count()
    }

    /// The grid transform the source was built with.
    #[inline]
    pub fn transform(&self) -> GridTransform {
        self.transform
    }

    fn load(&mut self) {
        self.current = if self.cursor < self.scene.face_count() {
            let id = FaceId(self.cursor as u32);
            let face = self.scene.face(id);
            let grid_vertices = [
                self.transform.apply(face.vertices[0]),
                self.transform.apply(face.vertices[1]),
                self.transform.apply(face.vertices[2]),
            ];
            Some(Occluder {
                camera: Polygon3::new(face.vertices, face.normal),
                grid: Polygon3::new(grid_vertices, self.transform.apply_normal(face.normal)),
                face: id,
                shape: face.shape,
            })
        } else {
            None
        };
    }

    /// Full scan over all occluders' grid-space footprints. Density-provider
    /// fallback; restarts the cursor afterwards.
    pub fn occluder_proscenium(&mut self) -> Option<Rect> {
        self.begin();
        let mut bounds: Option<Rect> = None;
        while let Some(occ) = self.current() {
            let bb = occ.grid.bbox_2d();
            match &mut bounds {
                Some(rect) => {
                    rect.include(bb.min);
                    rect.include(bb.max);
                }
                None => bounds = Some(bb),
            }
            self.next();
        }
        self.begin();
        bounds
    }

    /// Mean grid-space bounding-box area over all occluders.
    /// Density-provider fallback; restarts the cursor afterwards.
    pub fn average_occluder_area(&mut self) -> f64 {
        self.begin();
        let mut total = 0.0;
        let mut count = 0usize;
        while let Some(occ) = self.current() {
            total += occ.grid.bbox_2d().area();
            count += 1;
            self.next();
        }
        self.begin();
        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }
}

// =============================================================================
// CULLED OCCLUDER SOURCE
// =============================================================================

/// [`OccluderSource`] filtered by the occluder proscenium built from the
/// curve map.
///
/// A curve map with zero segments makes the source permanently invalid:
/// nothing would ever be sampled, so no occluder is worth indexing.
#[derive(Debug)]
pub struct CulledOccluderSource<'s> {
    inner: OccluderSource<'s>,
    proscenium: Proscenium,
    rejected: usize,
    exhausted_logged: bool,
    has_segments: bool,
}

impl<'s> CulledOccluderSource<'s> {
    /// Culls the curve map against the view proscenium and wraps a filtered
    /// occluder source.
    ///
    /// `extensive_search` enables the second marking pass that gives
    /// multi-sample strategies more candidates inside the grown proscenium.
    pub fn new(
        scene: &'s Scene,
        transform: GridTransform,
        curves: &mut CurveMap,
        view: &Proscenium,
        extensive_search: bool,
    ) -> Self {
        let (proscenium, has_segments) = cull_curves(curves, view, extensive_search);
        let mut source = Self {
            inner: OccluderSource::new(scene, transform),
            proscenium,
            rejected: 0,
            exhausted_logged: false,
            has_segments,
        };
        source.begin();
        source
    }

    /// Restarts the cursor at the first surviving occluder.
    pub fn begin(&mut self) {
        self.inner.begin();
        self.rejected = 0;
        if self.has_segments {
            self.skip_rejected();
        }
    }

    /// Returns true while the cursor points at a surviving occluder.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.has_segments && self.inner.is_valid()
    }

    /// Advances past the next run of rejected occluders; returns the new
    /// validity.
    pub fn next(&mut self) -> bool {
        if self.is_valid() {
            self.inner.next();
            self.skip_rejected();
        }
        self.is_valid()
    }

    /// The occluder under the cursor.
    #[inline]
    pub fn current(&self) -> Option<&Occluder> {
        if self.has_segments {
            self.inner.current()
        } else {
            None
        }
    }

    /// The grown, padded occluder proscenium.
    #[inline]
    pub fn occluder_proscenium(&self) -> &Proscenium {
        &self.proscenium
    }

    /// Occluders rejected by the proscenium filter so far this scan.
    #[inline]
    pub fn rejected_count(&self) -> usize {
        self.rejected
    }

    /// Total number of faces the unfiltered source would visit.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.inner.face_count()
    }

    /// The grid transform the source was built with.
    #[inline]
    pub fn transform(&self) -> GridTransform {
        self.inner.transform()
    }

    /// Counts surviving occluders. Restarts the cursor afterwards.
    pub fn count_occluders(&mut self) -> usize {
        self.begin();
        let mut count = 0;
        while self.is_valid() {
            count += 1;
            self.next();
        }
        self.begin();
        count
    }

    /// Mean grid-space bounding-box area over surviving occluders.
    /// Restarts the cursor afterwards.
    pub fn average_occluder_area(&mut self) -> f64 {
        self.begin();
        let mut total = 0.0;
        let mut count = 0usize;
        while let Some(occ) = self.current() {
            total += occ.grid.bbox_2d().area();
            count += 1;
            self.next();
        }
        self.begin();
        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }

    fn skip_rejected(&mut self) {
        loop {
            let passes = match self.inner.current() {
                Some(occ) => {
                    triangle_overlaps_rect(&occ.grid.vertices_2d(), self.proscenium.rect())
                }
                None => break,
            };
            if passes {
                return;
            }
            self.rejected += 1;
            self.inner.next();
        }
        if !self.exhausted_logged {
            log::debug!(
                "occluder proscenium rejected {} of {} polygons",
                self.rejected,
                self.inner.face_count()
            );
            self.exhausted_logged = true;
        }
    }
}

// =============================================================================
// CURVE CULLING
// =============================================================================

/// Walks every curve chain once: marks in-image curves and segments, selects
/// one guaranteed sample segment per visible curve, and grows the occluder
/// proscenium when the guarantee needs it.
///
/// Returns the padded occluder proscenium and whether any segment exists.
fn cull_curves(
    curves: &mut CurveMap,
    view: &Proscenium,
    extensive_search: bool,
) -> (Proscenium, bool) {
    let mut occluder = *view;
    let center = view.center();
    let mut any_segments = false;

    for curve in curves.iter_mut() {
        let mut in_image = false;
        let mut sample: Option<usize> = None;
        let mut closest: Option<(usize, f64)> = None;

        for (i, seg) in curve.segments_mut().iter_mut().enumerate() {
            any_segments = true;
            let (a2, b2) = seg.endpoints_2d();
            if view.crosses_segment(a2, b2) {
                seg.mark_in_image();
                in_image = true;
            }
            // One sample target per curve: the first center already inside
            // the occluder proscenium, else the center closest to its
            // middle.
            if sample.is_none() {
                let c = seg.center_2d();
                if occluder.contains(c) {
                    sample = Some(i);
                } else {
                    let d = (c - center).length_squared();
                    if closest.map_or(true, |(_, best)| d < best) {
                        closest = Some((i, d));
                    }
                }
            }
        }

        curve.set_in_image(in_image);
        if in_image {
            match sample {
                Some(i) => curve.segments_mut()[i].mark_in_image(),
                None => {
                    if let Some((i, _)) = closest {
                        let target = curve.segments_mut()[i].center_2d();
                        occluder.include(target);
                        curve.segments_mut()[i].mark_in_image();
                    }
                }
            }
        }
    }

    if extensive_search {
        for curve in curves.iter_mut() {
            if !curve.is_in_image() {
                continue;
            }
            for seg in curve.segments_mut() {
                if occluder.contains(seg.center_2d()) {
                    seg.mark_in_image();
                }
            }
        }
    }

    occluder.pad(OCCLUDER_PROSCENIUM_EPSILON);
    (occluder, any_segments)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DVec2, DVec3};
    use inkline_scene::{Curve, EdgeNature, Segment, SegmentSource, Viewport};

    fn flat_segment(ax: f64, ay: f64, bx: f64, by: f64) -> Segment {
        Segment::new(
            DVec3::new(ax, ay, 0.0),
            DVec3::new(bx, by, 0.0),
            DVec2::new(ax, ay),
            DVec2::new(bx, by),
            SegmentSource::Smooth { face: FaceId(0) },
        )
    }

    fn one_triangle_scene(z: f64) -> Scene {
        let mut scene = Scene::new();
        let shape = scene.add_shape();
        scene.add_face(
            shape,
            [
                DVec3::new(-0.5, -0.5, z),
                DVec3::new(0.5, -0.5, z),
                DVec3::new(0.0, 0.5, z),
            ],
            DVec3::Z,
        );
        scene
    }

    fn view() -> Proscenium {
        Proscenium::from_viewport(&Viewport::new(-1.0, -1.0, 1.0, 1.0))
    }

    #[test]
    fn test_source_empty_scene_is_invalid() {
        let scene = Scene::new();
        let mut source = OccluderSource::new(&scene, GridTransform::Orthographic);
        assert!(!source.is_valid());
        assert!(source.current().is_none());
        assert_eq!(source.average_occluder_area(), 0.0);
        assert!(source.occluder_proscenium().is_none());
    }

    #[test]
    fn test_source_visits_every_face_and_restarts() {
        let mut scene = one_triangle_scene(5.0);
        let shape = ShapeId(0);
        scene.add_face(
            shape,
            [DVec3::ZERO, DVec3::X, DVec3::Y],
            DVec3::Z,
        );
        let mut source = OccluderSource::new(&scene, GridTransform::Orthographic);
        let mut seen = 0;
        while source.is_valid() {
            seen += 1;
            source.next();
        }
        assert_eq!(seen, 2);
        source.begin();
        assert!(source.is_valid());
    }

    #[test]
    fn test_source_grid_polygon_negates_depth() {
        let scene = one_triangle_scene(5.0);
        let source = OccluderSource::new(&scene, GridTransform::Orthographic);
        let occ = source.current().unwrap();
        assert_eq!(occ.camera.bbox_min().z, 5.0);
        assert_eq!(occ.grid.bbox_min().z, -5.0);
    }

    #[test]
    fn test_culled_source_zero_segments_is_permanently_invalid() {
        let scene = one_triangle_scene(0.0);
        let mut curves = CurveMap::new();
        let mut source = CulledOccluderSource::new(
            &scene,
            GridTransform::Orthographic,
            &mut curves,
            &view(),
            true,
        );
        assert!(!source.is_valid());
        assert!(!source.next());
        assert_eq!(source.count_occluders(), 0);
    }

    #[test]
    fn test_cull_marks_in_image_curves() {
        let scene = one_triangle_scene(0.0);
        let mut curves = CurveMap::new();
        let inside = curves.add_curve(Curve::new(
            EdgeNature::SILHOUETTE,
            vec![flat_segment(-0.5, 0.0, 0.5, 0.0)],
        ));
        let outside = curves.add_curve(Curve::new(
            EdgeNature::SILHOUETTE,
            vec![flat_segment(5.0, 5.0, 6.0, 5.0)],
        ));
        let _ = CulledOccluderSource::new(
            &scene,
            GridTransform::Orthographic,
            &mut curves,
            &view(),
            true,
        );
        assert!(curves.curve(inside).is_in_image());
        assert!(curves.curve(inside).segments()[0].is_in_image());
        assert!(!curves.curve(outside).is_in_image());
        assert!(!curves.curve(outside).segments()[0].is_in_image());
    }

    #[test]
    fn test_cull_grows_proscenium_for_off_center_sample() {
        let scene = one_triangle_scene(0.0);
        let mut curves = CurveMap::new();
        // Crosses the view proscenium but its only center sits far right.
        let id = curves.add_curve(Curve::new(
            EdgeNature::BORDER,
            vec![flat_segment(0.5, 0.0, 10.0, 0.0)],
        ));
        let source = CulledOccluderSource::new(
            &scene,
            GridTransform::Orthographic,
            &mut curves,
            &view(),
            false,
        );
        let curve = curves.curve(id);
        assert!(curve.is_in_image());
        assert!(curve.segments()[0].is_in_image());
        let center = curve.segments()[0].center_2d();
        assert!(source.occluder_proscenium().contains(center));
        assert!(source.occluder_proscenium().encloses(&view()));
    }

    #[test]
    fn test_culled_source_rejects_out_of_proscenium_occluders() {
        let mut scene = one_triangle_scene(5.0);
        let shape = ShapeId(0);
        // Far outside any proscenium a unit-view scene can grow.
        scene.add_face(
            shape,
            [
                DVec3::new(100.0, 100.0, 5.0),
                DVec3::new(101.0, 100.0, 5.0),
                DVec3::new(100.0, 101.0, 5.0),
            ],
            DVec3::Z,
        );
        let mut curves = CurveMap::new();
        curves.add_curve(Curve::new(
            EdgeNature::SILHOUETTE,
            vec![flat_segment(-0.5, 0.0, 0.5, 0.0)],
        ));
        let mut source = CulledOccluderSource::new(
            &scene,
            GridTransform::Orthographic,
            &mut curves,
            &view(),
            true,
        );
        assert_eq!(source.count_occluders(), 1);
        source.begin();
        while source.is_valid() {
            source.next();
        }
        assert_eq!(source.rejected_count(), 1);
    }
}
