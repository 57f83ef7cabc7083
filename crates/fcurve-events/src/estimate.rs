//! Force-event estimates
//!
//! A detected event is a pair of points bracketing a discontinuity in the
//! force signal: where the event starts (pre-jump level) and where it ends
//! (post-jump level). The event force is the ordinate gap between them and
//! is kept consistent whenever either endpoint is replaced.

use fcurve_core::Point2D;

/// One detected force event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceEventEstimate {
    start: Point2D,
    end: Point2D,
    force: f64,
}

impl ForceEventEstimate {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Self {
            start,
            end,
            force: (end.y - start.y).abs(),
        }
    }

    /// Pre-event point.
    pub fn start(&self) -> Point2D {
        self.start
    }

    /// Post-event point.
    pub fn end(&self) -> Point2D {
        self.end
    }

    /// Magnitude of the force discontinuity.
    pub fn force(&self) -> f64 {
        self.force
    }

    /// Replace the start point, recomputing the force.
    pub fn with_start(self, start: Point2D) -> Self {
        Self::new(start, self.end)
    }

    /// Replace the end point, recomputing the force.
    pub fn with_end(self, end: Point2D) -> Self {
        Self::new(self.start, end)
    }
}
