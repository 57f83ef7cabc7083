//! Contact-point estimation for force curves
//!
//! Everything needed to decide where a cantilever first touches the
//! sample:
//!
//! - [`search`]: 1-D minimum search strategies over integer-sampled
//!   objectives (golden section, focused grid, exhaustive)
//! - [`guide`]: the mechanics-model capability bounding and scoring trial
//!   contact indices
//! - [`baseline`]: the robust precontact baseline fit and its noise scale
//! - [`estimators`]: the estimator strategies, from manual point picks to
//!   the baseline-informed robust flexible search
//!
//! Branches are analyzed in canonical orientation: x ascending, in-contact
//! region at low x, free baseline extending toward high x.

pub mod baseline;
pub mod estimators;
pub mod guide;
pub mod search;

pub use baseline::BaselineFit;
pub use estimators::{
    ClassicalFlexibleEstimator, ContactEstimator, ManualContactEstimator,
    NearestAbscissaEstimator, NearestOrdinateEstimator, RobustFlexibleEstimator,
};
pub use guide::{ContactEstimationGuide, SegmentedModelGuide, SequentialSearchAssistant};
pub use search::{ExhaustiveSearch, FocusedGridSearch, GoldenSectionSearch, MinimumSearchStrategy};
