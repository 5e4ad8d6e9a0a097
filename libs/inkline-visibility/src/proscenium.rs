//! # Proscenium Rectangles
//!
//! A proscenium is an axis-aligned grid-space rectangle bounding a region of
//! interest. The *view* proscenium (image plus margin) is fixed for the
//! whole pass; the *occluder* proscenium starts equal to it and only ever
//! grows, so that every visible curve keeps at least one in-bounds sample
//! point.

use crate::geometry::Rect;
use config::constants::VIEW_PROSCENIUM_MARGIN;
use glam::DVec2;
use inkline_scene::Viewport;

/// An axis-aligned region of interest in grid space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proscenium {
    rect: Rect,
}

impl Proscenium {
    /// Builds the view proscenium: the viewport grown by the standard
    /// margin on each side.
    pub fn from_viewport(viewport: &Viewport) -> Self {
        let margin_x = viewport.width() * VIEW_PROSCENIUM_MARGIN;
        let margin_y = viewport.height() * VIEW_PROSCENIUM_MARGIN;
        Self {
            rect: Rect::new(
                DVec2::new(viewport.min_x - margin_x, viewport.min_y - margin_y),
                DVec2::new(viewport.max_x + margin_x, viewport.max_y + margin_y),
            ),
        }
    }

    /// Wraps an explicit rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        Self { rect }
    }

    /// The underlying rectangle.
    #[inline]
    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    /// Proscenium center.
    #[inline]
    pub fn center(&self) -> DVec2 {
        self.rect.center()
    }

    /// Returns true if `point` lies inside or on the boundary.
    #[inline]
    pub fn contains(&self, point: DVec2) -> bool {
        self.rect.contains(point)
    }

    /// Returns true if the segment `a`–`b` crosses this proscenium
    /// (bounding-box test).
    #[inline]
    pub fn crosses_segment(&self, a: DVec2, b: DVec2) -> bool {
        self.rect.overlaps_segment_bbox(a, b)
    }

    /// Grows the proscenium to contain `point`. Monotonic.
    #[inline]
    pub fn include(&mut self, point: DVec2) {
        self.rect.include(point);
    }

    /// Pads the proscenium outward on every side.
    #[inline]
    pub fn pad(&mut self, amount: f64) {
        self.rect.pad(amount);
    }

    /// Returns true if `other` lies entirely inside this proscenium.
    pub fn encloses(&self, other: &Proscenium) -> bool {
        self.rect.min.x <= other.rect.min.x
            && self.rect.min.y <= other.rect.min.y
            && self.rect.max.x >= other.rect.max.x
            && self.rect.max.y >= other.rect.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(-1.0, -1.0, 1.0, 1.0)
    }

    #[test]
    fn test_view_proscenium_adds_margin() {
        let p = Proscenium::from_viewport(&viewport());
        assert!(p.rect().min.x < -1.0);
        assert!(p.rect().max.y > 1.0);
        assert_eq!(p.center(), DVec2::ZERO);
    }

    #[test]
    fn test_grown_proscenium_encloses_view() {
        let view = Proscenium::from_viewport(&viewport());
        let mut occluder = view;
        occluder.include(DVec2::new(5.0, 0.0));
        occluder.include(DVec2::new(0.0, -7.0));
        assert!(occluder.encloses(&view));
        assert!(!view.encloses(&occluder));
    }

    #[test]
    fn test_pad_expands_every_side() {
        let mut p = Proscenium::from_rect(Rect::new(DVec2::ZERO, DVec2::ONE));
        p.pad(0.5);
        assert_eq!(p.rect().min, DVec2::splat(-0.5));
        assert_eq!(p.rect().max, DVec2::splat(1.5));
    }
}
