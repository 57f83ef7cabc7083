//! Force-event detection for force curves
//!
//! Two independent detectors over a withdraw (or approach) branch:
//!
//! - [`UnspecificAdhesionEstimator`]: finds the dominant adhesion event by
//!   robustly separating the recovered baseline from the adhesion well
//! - [`JumpInformationCriterion`]: finds force discontinuities by comparing
//!   one-sided local linear smooths and selecting the event count with a
//!   penalized information criterion
//!
//! Both return [`ForceEventEstimate`] lists and treat empty or degenerate
//! branches as "no events", never as errors.

pub mod adhesion;
pub mod estimate;
pub mod jic;
pub mod smooth;

pub use adhesion::UnspecificAdhesionEstimator;
pub use estimate::ForceEventEstimate;
pub use jic::JumpInformationCriterion;
pub use smooth::LocalLinearSmoother;
