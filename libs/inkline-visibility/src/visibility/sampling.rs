//! # Per-Segment Sampling
//!
//! One conceptual ray per sampled segment, cast from the segment's 3-D
//! midpoint toward the viewpoint. A single pass over the sample's cell
//! serves both phases: candidates in front of the target are counted as
//! occluders, candidates behind it feed the occludee search.

use crate::grid::{Grid, OccludeeCandidate, OccludeeHit};
use inkline_scene::{Segment, ShapeId};

/// Result of testing one segment.
#[derive(Debug, Clone)]
pub(crate) struct SegmentSample {
    /// Number of confirmed occluders between segment and viewpoint.
    pub count: u32,
    /// Nearest surface behind the segment, if any.
    pub occludee: Option<OccludeeHit>,
    /// Shapes owning the confirmed occluders, deduplicated.
    pub occluding_shapes: Vec<ShapeId>,
}

impl SegmentSample {
    fn empty() -> Self {
        Self {
            count: 0,
            occludee: None,
            occluding_shapes: Vec::new(),
        }
    }
}

/// Casts the sample ray for `segment` and classifies every candidate in its
/// grid cell.
///
/// A candidate counts as an occluder when it is not adjacent to the
/// segment's own source face(s), its plane does not contain the ray
/// (coincidence guard), and the exact intersection lies strictly between
/// segment and viewpoint. Intersections behind the segment update the
/// occludee candidate instead.
pub(crate) fn sample_segment(grid: &Grid, segment: &Segment, epsilon: f64) -> SegmentSample {
    let mut sample = SegmentSample::empty();

    let Some(cell) = grid.find_cell(segment.center_2d()) else {
        // Absent cell: no occluders near here.
        return sample;
    };

    let mid = segment.center();
    let target_depth = grid.depth_of(mid);
    let (dir, ray_length) = grid.ray_toward_viewpoint(mid);
    let footprint = segment.center_2d();

    let mut candidate = OccludeeCandidate::new(target_depth);
    let mut resume = 0;

    // Before-target: count occluders, reporting deeper hits on the way.
    for (position, record) in grid.occluders_before(cell, target_depth) {
        resume = position + 1;
        if !record.grid_polygon().bbox_2d().contains(footprint) {
            continue;
        }
        if segment.source().is_adjacent(record.face()) {
            continue;
        }
        let camera = record.camera_polygon();
        if camera.normal().dot(dir).abs() < epsilon && camera.plane_distance(mid).abs() < epsilon {
            continue;
        }
        let Some(t) = camera.line_intersect(mid, dir) else {
            continue;
        };
        if t > epsilon && t < ray_length - epsilon {
            sample.count += 1;
            if !sample.occluding_shapes.contains(&record.shape()) {
                sample.occluding_shapes.push(record.shape());
            }
            if !grid.enable_qi() {
                break;
            }
        } else if t < -epsilon {
            let point = mid + dir * t;
            candidate.report_depth(record, point, grid.depth_of(point));
        }
    }

    // After-target: resume the scan behind the sample. Nothing past the
    // best candidate's depth can improve it.
    for record in grid.occludees_after(cell, resume, target_depth) {
        if let Some(best) = candidate.depth() {
            if record.shallowest() > best {
                break;
            }
        }
        if !record.grid_polygon().bbox_2d().contains(footprint) {
            continue;
        }
        if segment.source().is_adjacent(record.face()) {
            continue;
        }
        let camera = record.camera_polygon();
        if camera.normal().dot(dir).abs() < epsilon && camera.plane_distance(mid).abs() < epsilon {
            continue;
        }
        let Some(t) = camera.line_intersect(mid, dir) else {
            continue;
        };
        if t < -epsilon {
            let point = mid + dir * t;
            candidate.report_depth(record, point, grid.depth_of(point));
        }
    }

    sample.occludee = candidate.best();
    sample
}
