//! # Visibility Computation
//!
//! The orchestrator: culls curves, sizes and builds the grid, then runs the
//! configured sampling strategy over every curve, writing QI and occludee
//! results back through the curve-map hooks.
//!
//! ## Strategies
//!
//! - `Cumulative` / `Detailed` — sample every in-image segment until the
//!   histogram holds a majority of the occludable population
//! - `Fast` — every other in-image segment, same early exit
//! - `VeryFast` — one sample per curve
//! - `ExhaustiveCumulative` / `ExhaustiveDetailed` — every in-image
//!   segment, no early exit, for content that depends on exhaustive
//!   sampling output
//!
//! Cumulative strategies assign the smallest QI whose cumulative sample
//! count crosses the majority threshold; the others assign the mode. The
//! two policies are intentionally distinct: the cumulative rule exists to
//! fix chains where the mode under-counted occlusion, and unifying them
//! would silently change rendering output for existing content.

mod sampling;

use crate::density::{compute_density, DensityPolicy};
use crate::error::VisibilityError;
use crate::grid::{Grid, OccludeeHit};
use crate::monitor::ProgressMonitor;
use crate::occluder::CulledOccluderSource;
use crate::proscenium::Proscenium;
use crate::transform::GridTransform;
use config::constants::{QI_MAX, RAY_COINCIDENCE_EPSILON};
use inkline_scene::{Camera, Curve, CurveMap, Occludee, Projection, Scene, Segment, ShapeId};
use self::sampling::sample_segment;
use serde::{Deserialize, Serialize};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Sampling strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisibilityAlgorithm {
    /// Majority-bounded sampling, cumulative QI policy.
    Cumulative,
    /// Majority-bounded sampling, mode QI policy.
    Detailed,
    /// Every other segment, mode QI policy.
    Fast,
    /// One sample per curve.
    VeryFast,
    /// Every in-image segment, no early exit, cumulative QI policy.
    ExhaustiveCumulative,
    /// Every in-image segment, no early exit, mode QI policy.
    ExhaustiveDetailed,
}

impl Default for VisibilityAlgorithm {
    fn default() -> Self {
        Self::Cumulative
    }
}

/// How a strategy turns its QI histogram into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QiPolicy {
    /// Smallest QI at which the cumulative count crosses the majority.
    CumulativeMajority,
    /// Most frequent QI; smallest wins ties.
    Mode,
}

impl VisibilityAlgorithm {
    /// Stride through the in-image segments.
    fn sample_step(self) -> usize {
        match self {
            Self::Fast => 2,
            _ => 1,
        }
    }

    /// True for the legacy strategies that never stop early.
    fn is_exhaustive(self) -> bool {
        matches!(self, Self::ExhaustiveCumulative | Self::ExhaustiveDetailed)
    }

    fn qi_policy(self) -> QiPolicy {
        match self {
            Self::Cumulative | Self::ExhaustiveCumulative => QiPolicy::CumulativeMajority,
            _ => QiPolicy::Mode,
        }
    }

    /// Multi-sample strategies benefit from the second culling pass that
    /// marks extra candidates inside the grown proscenium.
    fn extensive_search(self) -> bool {
        !matches!(self, Self::VeryFast)
    }
}

/// Host-facing configuration, validated before any work starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityConfig {
    /// Sampling strategy.
    pub algorithm: VisibilityAlgorithm,
    /// Grid cell sizing policy.
    pub density: DensityPolicy,
    /// Ray/plane coincidence epsilon.
    pub coincidence_epsilon: f64,
    /// False stops counting at the first occluder, for styles that only
    /// need a visible/hidden boolean.
    pub enable_qi: bool,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            algorithm: VisibilityAlgorithm::default(),
            density: DensityPolicy::default(),
            coincidence_epsilon: RAY_COINCIDENCE_EPSILON,
            enable_qi: true,
        }
    }
}

impl VisibilityConfig {
    /// Checks the numeric tuning.
    pub fn validate(&self) -> Result<(), VisibilityError> {
        self.density.validate()?;
        if !self.coincidence_epsilon.is_finite() || self.coincidence_epsilon <= 0.0 {
            return Err(VisibilityError::invalid_epsilon(self.coincidence_epsilon));
        }
        Ok(())
    }
}

// =============================================================================
// STATS
// =============================================================================

/// Counters describing one visibility pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityStats {
    /// Curves in the map.
    pub curves_total: usize,
    /// Curves processed before completion or cancellation.
    pub curves_processed: usize,
    /// True when the monitor aborted the pass.
    pub cancelled: bool,
    /// Occluders rejected by the proscenium filter.
    pub rejected_occluders: usize,
    /// Occluders indexed into at least one cell.
    pub indexed_occluders: usize,
    /// Occluders touching no allocated cell.
    pub dropped_occluders: usize,
    /// Cells allocated by curve samples.
    pub allocated_cells: usize,
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Runs the full visibility pass, mutating the curve map in place.
///
/// The monitor is polled once per curve; a cancelled pass returns normally
/// with `stats.cancelled` set and every unprocessed curve left in its prior
/// state.
pub fn compute_visibility(
    scene: &Scene,
    curves: &mut CurveMap,
    camera: &Camera,
    config: &VisibilityConfig,
    monitor: &mut dyn ProgressMonitor,
) -> Result<VisibilityStats, VisibilityError> {
    config.validate()?;

    let transform = match camera.projection {
        Projection::Orthographic => GridTransform::Orthographic,
        Projection::Perspective => GridTransform::Spherical {
            viewpoint: camera.viewpoint,
        },
    };
    let view = Proscenium::from_viewport(&camera.viewport);
    let mut source = CulledOccluderSource::new(
        scene,
        transform,
        curves,
        &view,
        config.algorithm.extensive_search(),
    );

    let average_area = match config.density {
        DensityPolicy::AverageArea { .. } | DensityPolicy::Heuristic { .. } => {
            source.average_occluder_area()
        }
        _ => 0.0,
    };
    let density = compute_density(
        &config.density,
        source.occluder_proscenium().rect(),
        source.face_count(),
        average_area,
    );

    let grid = Grid::build(&mut source, &density, curves, camera.viewpoint, config.enable_qi);

    let total = curves.len();
    let mut processed = 0;
    let mut cancelled = false;
    for curve in curves.iter_mut() {
        monitor.report(processed, total);
        if monitor.is_cancelled() {
            cancelled = true;
            break;
        }
        process_curve(&grid, curve, config);
        processed += 1;
    }

    Ok(VisibilityStats {
        curves_total: total,
        curves_processed: processed,
        cancelled,
        rejected_occluders: source.rejected_count(),
        indexed_occluders: grid.indexed_occluder_count(),
        dropped_occluders: grid.dropped_occluder_count(),
        allocated_cells: grid.allocated_cell_count(),
    })
}

// =============================================================================
// PER-CURVE STRATEGIES
// =============================================================================

fn process_curve(grid: &Grid, curve: &mut Curve, config: &VisibilityConfig) {
    if !curve.is_in_image() {
        // Culled away from the view proscenium: maximally invisible, no
        // ray testing.
        curve.set_qi(QI_MAX);
        curve.set_no_occludee();
        return;
    }
    match config.algorithm {
        VisibilityAlgorithm::VeryFast => {
            process_very_fast(grid, curve, config.coincidence_epsilon);
        }
        _ => process_sampled(grid, curve, config),
    }
}

/// One sample at the chain head (first in-image segment).
fn process_very_fast(grid: &Grid, curve: &mut Curve, epsilon: f64) {
    let Some(head) = curve.segments().iter().position(Segment::is_in_image) else {
        assign_defensive(curve);
        return;
    };
    let sample = sample_segment(grid, &curve.segments()[head], epsilon);

    for shape in &sample.occluding_shapes {
        curve.add_occluder(*shape);
    }
    curve.set_qi(clamp_qi(sample.count));
    match sample.occludee {
        Some(hit) => curve.set_occludee(to_occludee(hit)),
        None => curve.set_no_occludee(),
    }
}

/// Majority-bounded (or exhaustive) multi-sample strategies.
fn process_sampled(grid: &Grid, curve: &mut Curve, config: &VisibilityConfig) {
    let sampled: Vec<usize> = curve
        .segments()
        .iter()
        .enumerate()
        .filter(|(_, seg)| seg.is_in_image())
        .map(|(i, _)| i)
        .step_by(config.algorithm.sample_step())
        .collect();
    if sampled.is_empty() {
        assign_defensive(curve);
        return;
    }
    let majority = sampled.len() / 2 + 1;

    let mut histogram = [0usize; 256];
    let mut samples_taken = 0usize;
    let mut votes: Vec<(ShapeId, usize, OccludeeHit)> = Vec::new();
    let mut found_occludees = 0usize;

    for &index in &sampled {
        let sample = sample_segment(grid, &curve.segments()[index], config.coincidence_epsilon);
        for shape in &sample.occluding_shapes {
            curve.add_occluder(*shape);
        }
        histogram[clamp_qi(sample.count) as usize] += 1;
        samples_taken += 1;
        if let Some(hit) = sample.occludee {
            found_occludees += 1;
            match votes.iter_mut().find(|(shape, _, _)| *shape == hit.shape) {
                Some((_, count, _)) => *count += 1,
                None => votes.push((hit.shape, 1, hit)),
            }
        }
        if !config.algorithm.is_exhaustive() && samples_taken >= majority {
            break;
        }
    }

    let qi = match config.algorithm.qi_policy() {
        QiPolicy::CumulativeMajority => {
            let mut cumulative = 0usize;
            let mut result = 0usize;
            for (value, &count) in histogram.iter().enumerate() {
                cumulative += count;
                if cumulative >= majority {
                    result = value;
                    break;
                }
            }
            result as u8
        }
        QiPolicy::Mode => {
            let mut best = 0usize;
            let mut best_count = 0usize;
            for (value, &count) in histogram.iter().enumerate() {
                if count > best_count {
                    best = value;
                    best_count = count;
                }
            }
            best as u8
        }
    };
    curve.set_qi(qi);

    // The occludee goes to the shape owning a majority of the discovered
    // occludees.
    let winner = votes
        .iter()
        .fold(None, |best: Option<&(ShapeId, usize, OccludeeHit)>, entry| {
            match best {
                Some(current) if current.1 >= entry.1 => Some(current),
                _ => Some(entry),
            }
        });
    match winner {
        Some(&(_, count, hit)) if count * 2 > found_occludees => {
            curve.set_occludee(to_occludee(hit));
        }
        _ => curve.set_no_occludee(),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn to_occludee(hit: OccludeeHit) -> Occludee {
    Occludee {
        face: hit.face,
        shape: hit.shape,
        point: hit.point,
    }
}

fn clamp_qi(count: u32) -> u8 {
    if count > QI_MAX as u32 {
        log::warn!("quantitative invisibility {count} clamped to {QI_MAX}");
        QI_MAX
    } else {
        count as u8
    }
}

/// An in-image curve that produced no samples. Culling guarantees one per
/// visible curve, so this is a defect signal, never an error.
fn assign_defensive(curve: &mut Curve) {
    log::warn!("in-image curve yielded no sample segments; assigning fully visible");
    curve.set_qi(0);
    curve.set_no_occludee();
}

// =============================================================================
// TESTS
// =============================================================================
