//! # Depth-Pruning Traversal
//!
//! Two phases over a cell's sorted record list. *Before-target* visits
//! records that could lie between the sample and the camera and ends at the
//! first record whose shallowest depth passes the target (sorted order makes
//! everything further irrelevant). *After-target* resumes where the first
//! phase stopped, hunting the nearest record behind the sample; the caller
//! stops it once a record's shallowest depth passes the best candidate so
//! far. Both are lazy sequences over the sorted slice; ending the sequence
//! is the only termination signal.

use super::{Cell, Grid, OccluderRecord};
use glam::DVec3;
use inkline_scene::{FaceId, ShapeId};

impl Grid {
    /// Before-target phase: records whose shallowest depth does not exceed
    /// the target depth, in depth order, with their positions in the cell
    /// list.
    pub fn occluders_before<'g>(
        &'g self,
        cell: &'g Cell,
        target_depth: f64,
    ) -> impl Iterator<Item = (usize, &'g OccluderRecord)> + 'g {
        cell.records()
            .iter()
            .enumerate()
            .map(move |(position, &index)| (position, self.record(index)))
            .take_while(move |(_, record)| record.shallowest() <= target_depth)
    }

    /// After-target phase: records from `resume` onward that reach at least
    /// the target depth.
    pub fn occludees_after<'g>(
        &'g self,
        cell: &'g Cell,
        resume: usize,
        target_depth: f64,
    ) -> impl Iterator<Item = &'g OccluderRecord> + 'g {
        let start = resume.min(cell.records().len());
        cell.records()[start..]
            .iter()
            .map(move |&index| self.record(index))
            .filter(move |record| record.deepest() >= target_depth)
    }
}

// =============================================================================
// OCCLUDEE CANDIDATE
// =============================================================================

/// The best occludee found so far for one sample ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccludeeHit {
    /// The occludee face.
    pub face: FaceId,
    /// Shape owning the occludee face.
    pub shape: ShapeId,
    /// Camera-space intersection point.
    pub point: DVec3,
    /// Grid-space depth of the intersection.
    pub depth: f64,
}

/// Accumulates the nearest surface behind a sample point.
///
/// `report_depth` is O(1): a hit replaces the candidate only when it is
/// deeper than the target and shallower than the current best.
#[derive(Debug, Clone)]
pub struct OccludeeCandidate {
    target_depth: f64,
    best: Option<OccludeeHit>,
}

impl OccludeeCandidate {
    /// Creates an empty candidate for a sample at `target_depth`.
    pub fn new(target_depth: f64) -> Self {
        Self {
            target_depth,
            best: None,
        }
    }

    /// Offers a hit on `record` at `depth`.
    pub fn report_depth(&mut self, record: &OccluderRecord, point: DVec3, depth: f64) {
        if depth <= self.target_depth {
            return;
        }
        if self.best.map_or(true, |best| depth < best.depth) {
            self.best = Some(OccludeeHit {
                face: record.face(),
                shape: record.shape(),
                point,
                depth,
            });
        }
    }

    /// Depth of the best candidate, if any. The after-target phase stops
    /// once record shallowest depths pass this bound.
    #[inline]
    pub fn depth(&self) -> Option<f64> {
        self.best.map(|best| best.depth)
    }

    /// The best candidate.
    #[inline]
    pub fn best(&self) -> Option<OccludeeHit> {
        self.best
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon3;
    use crate::occluder::Occluder;

    fn record_at(z: f64) -> OccluderRecord {
        let camera = Polygon3::new(
            [
                DVec3::new(-1.0, -1.0, z),
                DVec3::new(1.0, -1.0, z),
                DVec3::new(0.0, 1.0, z),
            ],
            DVec3::new(0.0, 0.0, -1.0),
        );
        let occluder = Occluder {
            grid: camera.clone(),
            camera,
            face: FaceId(0),
            shape: ShapeId(0),
        };
        OccluderRecord::new(&occluder)
    }

    #[test]
    fn test_candidate_ignores_shallower_hits() {
        let mut candidate = OccludeeCandidate::new(5.0);
        let record = record_at(3.0);
        candidate.report_depth(&record, DVec3::ZERO, 3.0);
        assert!(candidate.best().is_none());
    }

    #[test]
    fn test_candidate_keeps_nearest_deeper_hit() {
        let mut candidate = OccludeeCandidate::new(5.0);
        candidate.report_depth(&record_at(9.0), DVec3::ZERO, 9.0);
        candidate.report_depth(&record_at(7.0), DVec3::ZERO, 7.0);
        candidate.report_depth(&record_at(8.0), DVec3::ZERO, 8.0);
        assert_eq!(candidate.depth(), Some(7.0));
    }
}
