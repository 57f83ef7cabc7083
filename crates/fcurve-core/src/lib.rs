//! Core data model for AFM force-curve analysis
//!
//! This crate holds everything the numerical layers share: the immutable
//! channel representation, abscissa ordering utilities, inclusive index
//! ranges, approach/withdraw branch partitioning, the processing
//! configuration, and the unified error type.
//!
//! # Design
//!
//! All values are immutable once constructed; transformations return new
//! instances. Functions that sort in place take `&mut` buffers and say so,
//! functions that take `&` never mutate. Closed variant sets are plain Rust
//! enums dispatched by exhaustive `match`, so a missing case is a compile
//! error rather than a runtime surprise.

pub mod branch;
pub mod channel;
pub mod error;
pub mod order;
pub mod quantity;
pub mod range;
pub mod settings;

pub use branch::{
    classify, correct_orientation, orientation, partition_channel, partition_points,
    turning_index, BranchKind, CurveOrientation, PartitionedCurve,
};
pub use channel::{Channel1DData, Point2D};
pub use error::{Error, Result};
pub use order::{
    initial_order, is_sorted, overall_order, sort_points_if_needed, sort_points_in_place,
    sorted_points, SortedArrayOrder,
};
pub use quantity::{BaseUnit, Quantity, SiPrefix, Unit};
pub use range::IndexRange;
pub use settings::{
    ContactChoice, ProcessingSettings, ProcessingSettingsBuilder, RegressionChoice,
    SmootherChoice,
};
