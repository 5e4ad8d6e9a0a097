//! Centralized configuration values shared across the inkline pipeline.
//!
//! Each public item in this module documents its purpose and provides a
//! minimal usage example so that downstream crates can remain declarative
//! and avoid scattering literals.

/// Numerical tolerance used by the geometry kernels.
///
/// # Examples
/// ```
/// use config::constants::EPSILON;
/// assert!(EPSILON < 1.0e-5);
/// ```
pub const EPSILON: f64 = 1.0e-6;

/// Default epsilon for the ray/plane coincidence guard.
///
/// An occluder whose plane contains the sample ray within this tolerance is
/// treated as "not an occluder", never as a fault. Hosts may override this
/// per run through the visibility configuration.
///
/// # Examples
/// ```
/// use config::constants::RAY_COINCIDENCE_EPSILON;
/// assert!(RAY_COINCIDENCE_EPSILON > 0.0);
/// ```
pub const RAY_COINCIDENCE_EPSILON: f64 = 1.0e-6;

/// Fraction of each viewport dimension added around the final image when
/// deriving the view proscenium.
///
/// # Examples
/// ```
/// use config::constants::VIEW_PROSCENIUM_MARGIN;
/// assert!(VIEW_PROSCENIUM_MARGIN >= 0.0 && VIEW_PROSCENIUM_MARGIN < 1.0);
/// ```
pub const VIEW_PROSCENIUM_MARGIN: f64 = 0.05;

/// Fixed padding applied to the occluder proscenium after culling has grown
/// it to cover every sample target.
///
/// # Examples
/// ```
/// use config::constants::OCCLUDER_PROSCENIUM_EPSILON;
/// assert!(OCCLUDER_PROSCENIUM_EPSILON > 0.0);
/// ```
pub const OCCLUDER_PROSCENIUM_EPSILON: f64 = 1.0e-6;

/// Fraction by which grid coverage must exceed the proscenium in each
/// dimension. Under-provisioned grids force clamped lookups at the borders,
/// so every density policy over-provisions by this margin.
///
/// # Examples
/// ```
/// use config::constants::GRID_COVERAGE_MARGIN;
/// assert!((GRID_COVERAGE_MARGIN - 0.1).abs() < 1.0e-12);
/// ```
pub const GRID_COVERAGE_MARGIN: f64 = 0.1;

/// Upper bound on the total number of grid cells a density policy may
/// request. The average-area policy enlarges its cell size until the cell
/// count falls under this cap.
///
/// # Examples
/// ```
/// use config::constants::MAX_GRID_CELL_COUNT;
/// assert!(MAX_GRID_CELL_COUNT >= 1024);
/// ```
pub const MAX_GRID_CELL_COUNT: usize = 1_048_576;

/// Default desired cell count for the arbitrary density policy.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_CELL_TARGET;
/// assert!(DEFAULT_CELL_TARGET > 0);
/// ```
pub const DEFAULT_CELL_TARGET: usize = 4096;

/// Default occluder-area multiplier for the average-area density policy.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_SIZE_FACTOR;
/// assert_eq!(DEFAULT_SIZE_FACTOR, 1.0);
/// ```
pub const DEFAULT_SIZE_FACTOR: f64 = 1.0;

/// Saturation value for quantitative invisibility.
///
/// Curves culled away from the view proscenium are assigned this value
/// directly; ray-tested curves clamp here with a warning when more
/// occluders are found.
///
/// # Examples
/// ```
/// use config::constants::QI_MAX;
/// assert_eq!(QI_MAX, u8::MAX);
/// ```
pub const QI_MAX: u8 = 255;
