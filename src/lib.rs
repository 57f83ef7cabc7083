//! AFM force-curve analysis
//!
//! An engine for processing atomic force microscope force curves: splitting
//! raw recordings into approach and withdraw branches, locating the
//! tip-sample contact point with classical or robust split searches,
//! converting the in-contact region to force versus indentation, and
//! detecting adhesion and jump events on the withdraw branch.
//!
//! The workspace is layered:
//!
//! - [`fcurve_core`]: channel data model, ordering, branch partitioning,
//!   processing settings, errors
//! - [`fcurve_regression`]: the closed family of regression objectives,
//!   from ordinary least squares to supported trimmed fits
//! - [`fcurve_contact`]: minimum search, the mechanics-guide capability,
//!   baseline fits, and the contact estimators
//! - [`fcurve_events`]: adhesion estimation and JIC jump detection
//!
//! [`analyze`] runs the whole pipeline for one curve.
//!
//! ## Example
//!
//! ```rust
//! use force_curve::{
//!     analyze, BaseUnit, Channel1DData, ProcessingSettings, Quantity, SegmentedModelGuide,
//!     SiPrefix, Unit,
//! };
//!
//! // A toy approach recording: the tip sweeps from high x down into
//! // contact, deflection rising once past the contact point at x = 30
//! let xs: Vec<f64> = (0..60).rev().map(|i| i as f64).collect();
//! let ys: Vec<f64> = xs
//!     .iter()
//!     .map(|&x| if x < 30.0 { 3.0 * (30.0 - x) } else { 0.0 })
//!     .collect();
//! let channel = Channel1DData::new(
//!     xs,
//!     ys,
//!     Quantity::new("distance", Unit::new(SiPrefix::Micro, BaseUnit::Meter)),
//!     Quantity::new("deflection", Unit::new(SiPrefix::Nano, BaseUnit::Meter)),
//! )
//! .unwrap();
//!
//! let settings = ProcessingSettings::builder(0.1, 1.0).build().unwrap();
//! let guide = SegmentedModelGuide::piecewise_linear();
//! let analysis = analyze(&channel, &settings, &guide).unwrap();
//! assert!((analysis.contact_point().x - 30.0).abs() <= 2.0);
//! ```

pub mod analysis;

pub use analysis::{analyze, ForceCurveAnalysis};

pub use fcurve_core::{
    classify, correct_orientation, orientation, partition_channel, partition_points,
    turning_index, BaseUnit, BranchKind, Channel1DData, ContactChoice, CurveOrientation, Error,
    IndexRange, PartitionedCurve, Point2D, ProcessingSettings, ProcessingSettingsBuilder,
    Quantity, RegressionChoice, Result, SiPrefix, SmootherChoice, SortedArrayOrder, Unit,
};

pub use fcurve_regression::{
    FitModel, FittedFunction, HighCoverageTrimmed, LeastAbsoluteDeviations, LeastSquares,
    RegressionFit, RegressionStrategy, SupportedPostcontactFit, TrimmedObjective,
    TrimmedRegression,
};

pub use fcurve_contact::{
    BaselineFit, ClassicalFlexibleEstimator, ContactEstimationGuide, ContactEstimator,
    ExhaustiveSearch, FocusedGridSearch, GoldenSectionSearch, ManualContactEstimator,
    MinimumSearchStrategy, NearestAbscissaEstimator, NearestOrdinateEstimator,
    RobustFlexibleEstimator, SegmentedModelGuide, SequentialSearchAssistant,
};

pub use fcurve_events::{
    ForceEventEstimate, JumpInformationCriterion, LocalLinearSmoother,
    UnspecificAdhesionEstimator,
};
