//! # Grid Density Providers
//!
//! Turns a proscenium plus occluder statistics into a cell layout. Four
//! closed policies share one pipeline: pick a cell area, derive a square
//! cell size, then over-provision the cell counts so coverage exceeds the
//! proscenium by a safety margin. Under-provisioning is worse than
//! over-provisioning: a short grid forces clamped lookups at the borders.

use crate::error::VisibilityError;
use crate::geometry::Rect;
use crate::transform::GridTransform;
use config::constants::{DEFAULT_CELL_TARGET, DEFAULT_SIZE_FACTOR, GRID_COVERAGE_MARGIN, MAX_GRID_CELL_COUNT};
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

// =============================================================================
// POLICY
// =============================================================================

/// Cell-area heuristic selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DensityPolicy {
    /// `prosceniumArea / cellTarget`: an explicit desired cell count.
    Arbitrary {
        /// Desired total number of cells.
        cell_target: usize,
    },
    /// `mean(occluder bbox area) × sizeFactor`, capped at
    /// [`MAX_GRID_CELL_COUNT`] total cells.
    AverageArea {
        /// Occluder-area multiplier.
        size_factor: f64,
    },
    /// `prosceniumArea / faceCount^(2/3)`: the classic uniform-bucket-grid
    /// sizing heuristic.
    Pow23,
    /// The denser of `AverageArea` and `Pow23`.
    Heuristic {
        /// Occluder-area multiplier for the average-area side.
        size_factor: f64,
    },
}

impl Default for DensityPolicy {
    fn default() -> Self {
        Self::Heuristic {
            size_factor: DEFAULT_SIZE_FACTOR,
        }
    }
}

impl DensityPolicy {
    /// Default arbitrary policy with the standard cell target.
    pub fn arbitrary() -> Self {
        Self::Arbitrary {
            cell_target: DEFAULT_CELL_TARGET,
        }
    }

    /// Checks the numeric tuning before any scanning happens.
    pub fn validate(&self) -> Result<(), VisibilityError> {
        match *self {
            DensityPolicy::Arbitrary { cell_target } => {
                if cell_target == 0 {
                    return Err(VisibilityError::InvalidCellTarget);
                }
            }
            DensityPolicy::AverageArea { size_factor }
            | DensityPolicy::Heuristic { size_factor } => {
                if !size_factor.is_finite() || size_factor <= 0.0 {
                    return Err(VisibilityError::invalid_size_factor(size_factor));
                }
            }
            DensityPolicy::Pow23 => {}
        }
        Ok(())
    }
}

// =============================================================================
// DENSITY
// =============================================================================

/// The computed cell layout: square cells covering the proscenium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridDensity {
    /// Edge length of the (square) cells.
    pub cell_size: f64,
    /// Number of cells along X.
    pub cells_x: usize,
    /// Number of cells along Y.
    pub cells_y: usize,
    /// Lower-left corner of cell (0, 0).
    pub origin: DVec2,
}

impl GridDensity {
    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells_x * self.cells_y
    }
}

/// Computes the cell layout for a proscenium.
///
/// `face_count` and `average_area` are the occluder statistics the policies
/// need; callers obtain them from the occluder source (a full scan when no
/// cheaper figure exists). Always produces a valid ≥1×1 grid.
pub fn compute_density(
    policy: &DensityPolicy,
    proscenium: &Rect,
    face_count: usize,
    average_area: f64,
) -> GridDensity {
    let width = proscenium.width();
    let height = proscenium.height();
    let area = width * height;

    let raw = match *policy {
        DensityPolicy::Arbitrary { cell_target } => area / cell_target as f64,
        DensityPolicy::AverageArea { size_factor } => {
            capped_cell_area(average_area * size_factor, area)
        }
        DensityPolicy::Pow23 => area / (face_count as f64).powf(2.0 / 3.0),
        DensityPolicy::Heuristic { size_factor } => {
            let averaged = capped_cell_area(average_area * size_factor, area);
            let pow23 = area / (face_count as f64).powf(2.0 / 3.0);
            if averaged.is_finite() && (!pow23.is_finite() || averaged < pow23) {
                averaged
            } else {
                pow23
            }
        }
    };

    // Empty scenes and degenerate prosceniums fall back to one cell over
    // the whole region.
    let cell_area = if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        area.max(1.0)
    };
    let cell_size = cell_area.sqrt();

    let cells_x = covered_cells(width, cell_size);
    let cells_y = covered_cells(height, cell_size);

    let center = proscenium.center();
    let origin = DVec2::new(
        center.x - cells_x as f64 * cell_size * 0.5,
        center.y - cells_y as f64 * cell_size * 0.5,
    );

    GridDensity {
        cell_size,
        cells_x,
        cells_y,
        origin,
    }
}

/// Derives a proscenium from a camera-space bounding box by transforming its
/// corners into grid space.
pub fn proscenium_from_bbox(transform: GridTransform, min: DVec3, max: DVec3) -> Rect {
    let corners = [
        DVec3::new(min.x, min.y, min.z),
        DVec3::new(max.x, min.y, min.z),
        DVec3::new(min.x, max.y, min.z),
        DVec3::new(max.x, max.y, min.z),
        DVec3::new(min.x, min.y, max.z),
        DVec3::new(max.x, min.y, max.z),
        DVec3::new(min.x, max.y, max.z),
        DVec3::new(max.x, max.y, max.z),
    ];
    let mut rect = Rect::from_point(transform.footprint(corners[0]));
    for corner in &corners[1..] {
        rect.include(transform.footprint(*corner));
    }
    rect
}

/// Enlarges the cell area until the total cell count fits under the cap.
fn capped_cell_area(cell_area: f64, proscenium_area: f64) -> f64 {
    if !(cell_area > 0.0) || proscenium_area <= 0.0 {
        return cell_area;
    }
    if proscenium_area / cell_area > MAX_GRID_CELL_COUNT as f64 {
        proscenium_area / MAX_GRID_CELL_COUNT as f64
    } else {
        cell_area
    }
}

/// Cell count along one dimension, grown until coverage exceeds the
/// dimension by the safety margin.
fn covered_cells(dimension: f64, cell_size: f64) -> usize {
    let mut cells = (dimension / cell_size).ceil().max(1.0);
    let target = dimension * (1.0 + GRID_COVERAGE_MARGIN);
    if cells * cell_size < target {
        cells = (target / cell_size).ceil().max(1.0);
    }
    cells as usize
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn proscenium(width: f64, height: f64) -> Rect {
        Rect::new(DVec2::ZERO, DVec2::new(width, height))
    }

    fn assert_covers(density: &GridDensity, width: f64, height: f64) {
        assert!(density.cells_x as f64 * density.cell_size >= width);
        assert!(density.cells_y as f64 * density.cell_size >= height);
    }

    #[test]
    fn test_arbitrary_hits_requested_count() {
        let p = proscenium(100.0, 100.0);
        let d = compute_density(&DensityPolicy::Arbitrary { cell_target: 100 }, &p, 0, 0.0);
        assert_covers(&d, 100.0, 100.0);
        // 10x10 requested, grown by the coverage margin.
        assert!(d.cell_count() >= 100);
        assert!(d.cell_count() <= 200);
    }

    #[test]
    fn test_average_area_coverage_example() {
        // The documented example: W=1000, H=500, 100 faces of mean bbox
        // area 50, sizeFactor=1.0.
        let p = proscenium(1000.0, 500.0);
        let d = compute_density(
            &DensityPolicy::AverageArea { size_factor: 1.0 },
            &p,
            100,
            50.0,
        );
        assert!((d.cell_size - 50.0_f64.sqrt()).abs() < 1.0e-9);
        assert_covers(&d, 1000.0, 500.0);
    }

    #[test]
    fn test_average_area_caps_total_cells() {
        let p = proscenium(1000.0, 500.0);
        let d = compute_density(
            &DensityPolicy::AverageArea { size_factor: 1.0 },
            &p,
            100,
            1.0e-6,
        );
        // Without the cap this would be 5e11 cells.
        let uncapped = (1000.0 * 500.0 / 1.0e-6) as usize;
        assert!(d.cell_count() < uncapped);
        assert!(d.cell_count() <= MAX_GRID_CELL_COUNT * 2);
        assert_covers(&d, 1000.0, 500.0);
    }

    #[test]
    fn test_pow23_formula() {
        let p = proscenium(100.0, 100.0);
        let d = compute_density(&DensityPolicy::Pow23, &p, 1000, 0.0);
        let expected_area = 10000.0 / 1000.0_f64.powf(2.0 / 3.0);
        assert!((d.cell_size - expected_area.sqrt()).abs() < 1.0e-9);
        assert_covers(&d, 100.0, 100.0);
    }

    #[test]
    fn test_heuristic_picks_denser() {
        let p = proscenium(100.0, 100.0);
        let avg = compute_density(
            &DensityPolicy::AverageArea { size_factor: 1.0 },
            &p,
            1000,
            4.0,
        );
        let pow = compute_density(&DensityPolicy::Pow23, &p, 1000, 4.0);
        let heuristic = compute_density(
            &DensityPolicy::Heuristic { size_factor: 1.0 },
            &p,
            1000,
            4.0,
        );
        assert!(heuristic.cell_size <= avg.cell_size);
        assert!(heuristic.cell_size <= pow.cell_size);
    }

    #[test]
    fn test_empty_scene_yields_single_cell_grid() {
        let p = proscenium(10.0, 10.0);
        for policy in [
            DensityPolicy::Pow23,
            DensityPolicy::AverageArea { size_factor: 1.0 },
            DensityPolicy::Heuristic { size_factor: 1.0 },
        ] {
            let d = compute_density(&policy, &p, 0, 0.0);
            assert!(d.cells_x >= 1);
            assert!(d.cells_y >= 1);
            assert!(d.cell_size > 0.0);
        }
    }

    #[test]
    fn test_degenerate_proscenium_still_valid() {
        let p = Rect::new(DVec2::ZERO, DVec2::ZERO);
        let d = compute_density(&DensityPolicy::arbitrary(), &p, 10, 1.0);
        assert_eq!(d.cells_x, 1);
        assert_eq!(d.cells_y, 1);
        assert!(d.cell_size > 0.0);
    }

    #[test]
    fn test_origin_is_centered() {
        let p = proscenium(100.0, 60.0);
        let d = compute_density(&DensityPolicy::arbitrary(), &p, 0, 0.0);
        let extent = DVec2::new(
            d.cells_x as f64 * d.cell_size,
            d.cells_y as f64 * d.cell_size,
        );
        let center = d.origin + extent * 0.5;
        assert!((center - p.center()).length() < 1.0e-9);
    }

    #[test]
    fn test_policy_validation() {
        assert!(DensityPolicy::Arbitrary { cell_target: 0 }.validate().is_err());
        assert!(DensityPolicy::AverageArea { size_factor: 0.0 }.validate().is_err());
        assert!(DensityPolicy::Heuristic { size_factor: f64::NAN }.validate().is_err());
        assert!(DensityPolicy::default().validate().is_ok());
        assert!(DensityPolicy::Pow23.validate().is_ok());
    }

    #[test]
    fn test_proscenium_from_bbox_orthographic() {
        let rect = proscenium_from_bbox(
            GridTransform::Orthographic,
            DVec3::new(-1.0, -2.0, 0.0),
            DVec3::new(3.0, 4.0, 10.0),
        );
        assert_eq!(rect.min, DVec2::new(-1.0, -2.0));
        assert_eq!(rect.max, DVec2::new(3.0, 4.0));
    }
}
