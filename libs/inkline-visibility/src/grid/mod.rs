//! # Sparse Uniform Grid
//!
//! Occluders are indexed by the grid-space cell footprints of their bounding
//! boxes, but only cells that curve samples will actually query are ever
//! allocated: `assign_cells` walks the in-image segments first, and
//! `distribute_polygons` drops any occluder that touches no allocated cell.
//! Records live in a single owning arena; cells hold non-owning indices, so
//! an occluder spanning many cells is built exactly once.
//!
//! Construction is a strict pipeline: `assign_cells` →
//! `distribute_polygons` → `reorganize_cells`. The grid is read-only
//! afterwards.

mod traversal;

pub use self::traversal::{OccludeeCandidate, OccludeeHit};

use crate::geometry::{triangle_overlaps_rect, Polygon3, Rect};
use crate::occluder::{CulledOccluderSource, Occluder};
use crate::transform::GridTransform;
use crate::density::GridDensity;
use glam::{DVec2, DVec3};
use inkline_scene::{CurveMap, FaceId, ShapeId};

// =============================================================================
// OCCLUDER RECORD
// =============================================================================

/// One indexed occluder, shared by every cell its polygon overlaps.
#[derive(Debug, Clone)]
pub struct OccluderRecord {
    grid: Polygon3,
    camera: Polygon3,
    shallowest: f64,
    deepest: f64,
    face: FaceId,
    shape: ShapeId,
}

impl OccluderRecord {
    fn new(occluder: &Occluder) -> Self {
        Self {
            shallowest: occluder.grid.bbox_min().z,
            deepest: occluder.grid.bbox_max().z,
            grid: occluder.grid.clone(),
            camera: occluder.camera.clone(),
            face: occluder.face,
            shape: occluder.shape,
        }
    }

    /// The polygon in grid space.
    #[inline]
    pub fn grid_polygon(&self) -> &Polygon3 {
        &self.grid
    }

    /// The polygon in camera space; exact ray tests run against this.
    #[inline]
    pub fn camera_polygon(&self) -> &Polygon3 {
        &self.camera
    }

    /// Smallest grid-space depth of the polygon.
    #[inline]
    pub fn shallowest(&self) -> f64 {
        self.shallowest
    }

    /// Largest grid-space depth of the polygon.
    #[inline]
    pub fn deepest(&self) -> f64 {
        self.deepest
    }

    /// Identity of the source face.
    #[inline]
    pub fn face(&self) -> FaceId {
        self.face
    }

    /// Shape owning the source face.
    #[inline]
    pub fn shape(&self) -> ShapeId {
        self.shape
    }
}

// =============================================================================
// CELL
// =============================================================================

/// One allocated grid cell: its boundary and its occluders, sorted
/// ascending by shallowest depth after construction.
#[derive(Debug, Clone)]
pub struct Cell {
    rect: Rect,
    records: Vec<u32>,
}

impl Cell {
    /// The cell boundary rectangle.
    #[inline]
    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    /// Indices into the grid's record arena, sorted by shallowest depth.
    #[inline]
    pub fn records(&self) -> &[u32] {
        &self.records
    }
}

// =============================================================================
// GRID
// =============================================================================

/// The sparse uniform grid over the occluder proscenium.
#[derive(Debug)]
pub struct Grid {
    transform: GridTransform,
    viewpoint: DVec3,
    enable_qi: bool,
    cell_size: f64,
    cells_x: usize,
    cells_y: usize,
    origin: DVec2,
    /// Flat cell table; `None` means "no occluders near here".
    table: Vec<Option<u32>>,
    /// Cell arena.
    cells: Vec<Cell>,
    /// Occluder record arena, owned here and shared by index.
    records: Vec<OccluderRecord>,
    kept: usize,
    dropped: usize,
}

impl Grid {
    /// Runs the construction pipeline over a culled source.
    pub fn build(
        source: &mut CulledOccluderSource<'_>,
        density: &GridDensity,
        curves: &CurveMap,
        viewpoint: DVec3,
        enable_qi: bool,
    ) -> Self {
        let mut grid = Self {
            transform: source.transform(),
            viewpoint,
            enable_qi,
            cell_size: density.cell_size,
            cells_x: density.cells_x,
            cells_y: density.cells_y,
            origin: density.origin,
            table: vec![None; density.cells_x * density.cells_y],
            cells: Vec::new(),
            records: Vec::new(),
            kept: 0,
            dropped: 0,
        };
        grid.assign_cells(curves);
        grid.distribute_polygons(source);
        grid.reorganize_cells();
        grid
    }

    /// The grid-space transform.
    #[inline]
    pub fn transform(&self) -> GridTransform {
        self.transform
    }

    /// The camera viewpoint.
    #[inline]
    pub fn viewpoint(&self) -> DVec3 {
        self.viewpoint
    }

    /// False when the host only needs a visible/hidden boolean; counting
    /// then stops at the first confirmed occluder.
    #[inline]
    pub fn enable_qi(&self) -> bool {
        self.enable_qi
    }

    /// Cell edge length.
    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Grid dimensions in cells.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cells_x, self.cells_y)
    }

    /// Number of allocated (non-absent) cells.
    #[inline]
    pub fn allocated_cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of occluders indexed into at least one cell.
    #[inline]
    pub fn indexed_occluder_count(&self) -> usize {
        self.kept
    }

    /// Number of occluders dropped for touching no allocated cell.
    #[inline]
    pub fn dropped_occluder_count(&self) -> usize {
        self.dropped
    }

    /// The record arena.
    #[inline]
    pub fn records(&self) -> &[OccluderRecord] {
        &self.records
    }

    /// One record by arena index.
    #[inline]
    pub fn record(&self, index: u32) -> &OccluderRecord {
        &self.records[index as usize]
    }

    /// Clamped cell coordinates of a grid-space point. Never out of range,
    /// however far outside the proscenium the point lies.
    pub fn cell_coordinates(&self, point: DVec2) -> (usize, usize) {
        fn clamp_axis(offset: f64, cells: usize) -> usize {
            if !(offset > 0.0) {
                0
            } else if offset >= cells as f64 {
                cells - 1
            } else {
                offset as usize
            }
        }
        let fx = ((point.x - self.origin.x) / self.cell_size).floor();
        let fy = ((point.y - self.origin.y) / self.cell_size).floor();
        (clamp_axis(fx, self.cells_x), clamp_axis(fy, self.cells_y))
    }

    /// The cell a grid-space point falls in, or `None` when that region was
    /// never allocated ("no occluders here").
    pub fn find_cell(&self, point: DVec2) -> Option<&Cell> {
        let (x, y) = self.cell_coordinates(point);
        self.table[y * self.cells_x + x].map(|i| &self.cells[i as usize])
    }

    /// Grid-space depth of a camera-space point.
    #[inline]
    pub fn depth_of(&self, point: DVec3) -> f64 {
        self.transform.depth(point)
    }

    /// Direction and length of the conceptual ray from `point` toward the
    /// viewpoint. Orthographic rays run parallel toward the camera plane.
    pub fn ray_toward_viewpoint(&self, point: DVec3) -> (DVec3, f64) {
        match self.transform {
            GridTransform::Orthographic => (DVec3::Z, self.viewpoint.z - point.z),
            GridTransform::Spherical { .. } => {
                let to = self.viewpoint - point;
                let length = to.length();
                if length > 0.0 {
                    (to / length, length)
                } else {
                    (DVec3::Z, 0.0)
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Construction pipeline
    // -------------------------------------------------------------------------

    /// Allocates exactly the cells that in-image curve segments will query.
    fn assign_cells(&mut self, curves: &CurveMap) {
        for curve in curves.iter() {
            for seg in curve.segments() {
                if seg.is_in_image() {
                    let (x, y) = self.cell_coordinates(seg.center_2d());
                    self.ensure_cell(x, y);
                }
            }
        }
    }

    /// Indexes every surviving occluder into the allocated cells its
    /// polygon overlaps. The record is built lazily, at most once.
    fn distribute_polygons(&mut self, source: &mut CulledOccluderSource<'_>) {
        source.begin();
        while let Some(occluder) = source.current().cloned() {
            self.insert_occluder(&occluder);
            source.next();
        }
        log::debug!(
            "grid indexed {} occluders into {} cells, dropped {} touching none",
            self.kept,
            self.cells.len(),
            self.dropped
        );
    }

    fn insert_occluder(&mut self, occluder: &Occluder) {
        let bb = occluder.grid.bbox_2d();
        let (min_x, min_y) = self.cell_coordinates(bb.min);
        let (max_x, max_y) = self.cell_coordinates(bb.max);
        let tri = occluder.grid.vertices_2d();

        let mut record: Option<u32> = None;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let Some(cell_index) = self.table[y * self.cells_x + x] else {
                    continue;
                };
                let cell = &self.cells[cell_index as usize];
                if !triangle_overlaps_rect(&tri, &cell.rect) {
                    continue;
                }
                let index = match record {
                    Some(index) => index,
                    None => {
                        let index = self.records.len() as u32;
                        self.records.push(OccluderRecord::new(occluder));
                        record = Some(index);
                        index
                    }
                };
                self.cells[cell_index as usize].records.push(index);
            }
        }

        if record.is_some() {
            self.kept += 1;
        } else {
            self.dropped += 1;
        }
    }

    /// Sorts every cell's records ascending by shallowest depth. Stable,
    /// idempotent.
    fn reorganize_cells(&mut self) {
        let records = &self.records;
        for cell in &mut self.cells {
            cell.records.sort_by(|&a, &b| {
                records[a as usize]
                    .shallowest
                    .total_cmp(&records[b as usize].shallowest)
            });
        }
    }

    fn ensure_cell(&mut self, x: usize, y: usize) {
        let slot = y * self.cells_x + x;
        if self.table[slot].is_none() {
            let min = DVec2::new(
                self.origin.x + x as f64 * self.cell_size,
                self.origin.y + y as f64 * self.cell_size,
            );
            let rect = Rect::new(min, min + DVec2::splat(self.cell_size));
            let index = self.cells.len() as u32;
            self.cells.push(Cell {
                rect,
                records: Vec::new(),
            });
            self.table[slot] = Some(index);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
