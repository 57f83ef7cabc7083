//! The single-curve processing pipeline
//!
//! [`analyze`] glues the workspace layers together for one recording:
//! partition the raw channel into approach and withdraw, orient the fitted
//! branch canonically (x ascending, contact at low x), apply the configured
//! trimming and smoothing, estimate the contact point, convert the
//! in-contact region to force versus indentation, and run both event
//! detectors on the withdraw branch. Everything is a pure function of
//! (channel, settings, guide); identical inputs and seeds give identical
//! output.

use fcurve_contact::{
    ClassicalFlexibleEstimator, ContactEstimationGuide, ContactEstimator, GoldenSectionSearch,
    ManualContactEstimator, RobustFlexibleEstimator,
};
use fcurve_core::{
    correct_orientation, partition_channel, BaseUnit, BranchKind, Channel1DData, ContactChoice,
    Error, PartitionedCurve, Point2D, ProcessingSettings, Quantity, RegressionChoice, Result,
    SmootherChoice, SortedArrayOrder, Unit,
};
use fcurve_events::{
    ForceEventEstimate, JumpInformationCriterion, LocalLinearSmoother, UnspecificAdhesionEstimator,
};
use fcurve_regression::TrimmedObjective;
use tracing::debug;

/// Smoothing window of the jump detector when no smoother is configured.
const DEFAULT_JUMP_WINDOW: usize = 10;

/// Everything produced by one curve-processing invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceCurveAnalysis {
    partitioned: PartitionedCurve,
    fitted_branch: Channel1DData,
    contact_point: Point2D,
    force_indentation: Channel1DData,
    adhesion_events: Vec<ForceEventEstimate>,
    jump_events: Vec<ForceEventEstimate>,
}

impl ForceCurveAnalysis {
    /// The approach/withdraw split of the raw recording.
    pub fn partitioned(&self) -> &PartitionedCurve {
        &self.partitioned
    }

    /// The branch the contact fit ran on, in canonical orientation with
    /// trimming and smoothing applied.
    pub fn fitted_branch(&self) -> &Channel1DData {
        &self.fitted_branch
    }

    pub fn contact_point(&self) -> Point2D {
        self.contact_point
    }

    /// Force versus indentation over the in-contact region, indentation
    /// ascending.
    pub fn force_indentation(&self) -> &Channel1DData {
        &self.force_indentation
    }

    pub fn adhesion_events(&self) -> &[ForceEventEstimate] {
        &self.adhesion_events
    }

    pub fn jump_events(&self) -> &[ForceEventEstimate] {
        &self.jump_events
    }
}

/// Process one raw recording.
pub fn analyze(
    channel: &Channel1DData,
    settings: &ProcessingSettings,
    guide: &dyn ContactEstimationGuide,
) -> Result<ForceCurveAnalysis> {
    if channel.is_empty() {
        return Err(Error::empty_input());
    }
    let partitioned = partition_channel(channel);
    let raw_branch = match settings.fitted_branch() {
        BranchKind::Approach => &partitioned.approach,
        BranchKind::Withdraw => &partitioned.withdraw,
    };
    let fitted_branch = prepare_branch(raw_branch, settings)?;
    if fitted_branch.is_empty() {
        return Err(Error::empty_input());
    }

    let contact_point = estimate_contact(&fitted_branch, settings, guide)?;
    debug!(x = contact_point.x, y = contact_point.y, "contact point");

    let force_indentation = force_indentation(&fitted_branch, contact_point, settings)?;

    let withdraw = prepare_branch(&partitioned.withdraw, settings)?;
    let (adhesion_events, jump_events) = if withdraw.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        let adhesion = UnspecificAdhesionEstimator::new()
            .with_starts(settings.robust_starts())
            .with_seed(settings.seed());
        let window = match settings.smoother() {
            SmootherChoice::LocalLinear { window } => window,
            SmootherChoice::None => DEFAULT_JUMP_WINDOW,
        };
        let jic = JumpInformationCriterion::new(window);
        (adhesion.events(&withdraw, None)?, jic.events(&withdraw, None)?)
    };

    Ok(ForceCurveAnalysis {
        partitioned,
        fitted_branch,
        contact_point,
        force_indentation,
        adhesion_events,
        jump_events,
    })
}

/// Canonical orientation plus the configured trimming and smoothing.
fn prepare_branch(branch: &Channel1DData, settings: &ProcessingSettings) -> Result<Channel1DData> {
    let oriented = correct_orientation(branch);
    let (left, right) = settings.trim_fractions();
    let trimmed = oriented.trimmed(left, right);
    match settings.smoother() {
        SmootherChoice::None => Ok(trimmed),
        SmootherChoice::LocalLinear { window } => {
            let smoother = LocalLinearSmoother::new(window);
            let smoothed = smoother.centered_values(trimmed.xs(), trimmed.ys());
            let xq = trimmed.x_quantity().clone();
            let yq = trimmed.y_quantity().clone();
            match trimmed.order() {
                Some(order) => Channel1DData::with_known_order(
                    trimmed.xs().to_vec(),
                    smoothed,
                    xq,
                    yq,
                    order,
                ),
                None => Channel1DData::new(trimmed.xs().to_vec(), smoothed, xq, yq),
            }
        }
    }
}

fn estimate_contact(
    branch: &Channel1DData,
    settings: &ProcessingSettings,
    guide: &dyn ContactEstimationGuide,
) -> Result<Point2D> {
    let spring_constant = settings.spring_constant();
    match settings.contact() {
        ContactChoice::Manual(point) => {
            ManualContactEstimator::new(point).contact_point(branch, guide, spring_constant)
        }
        ContactChoice::Classical => ClassicalFlexibleEstimator::new(GoldenSectionSearch::new())
            .contact_point(branch, guide, spring_constant),
        ContactChoice::Robust => {
            let objective = match settings.regression() {
                RegressionChoice::LeastAbsoluteDeviations | RegressionChoice::TrimmedAbsolute => {
                    TrimmedObjective::Absolute
                }
                RegressionChoice::LeastSquares | RegressionChoice::TrimmedSquares => {
                    TrimmedObjective::Squares
                }
            };
            RobustFlexibleEstimator::new(GoldenSectionSearch::new())
                .with_objective(objective)
                .with_starts(settings.robust_starts())
                .with_seed(settings.seed())
                .contact_point(branch, guide, spring_constant)
        }
    }
}

/// Force versus indentation over the in-contact region.
///
/// With the branch in canonical orientation the in-contact region is
/// `x <= contact.x`. Indentation is the piezo travel past contact minus the
/// cantilever deflection; force is the deflection times the spring
/// constant, with the photodiode sensitivity converting the recorded signal
/// to metres of deflection.
fn force_indentation(
    branch: &Channel1DData,
    contact: Point2D,
    settings: &ProcessingSettings,
) -> Result<Channel1DData> {
    let sensitivity = settings.sensitivity();
    let spring_constant = settings.spring_constant();
    let in_contact = branch.restricted_to_domain(f64::NEG_INFINITY, contact.x);

    // Indentation mixes both axes, so the channel is rebuilt pointwise
    let mut points: Vec<Point2D> = in_contact
        .points()
        .map(|p| {
            let deflection = sensitivity * (p.y - contact.y);
            Point2D::new((contact.x - p.x) - deflection, spring_constant * deflection)
        })
        .collect();
    points.sort_by(|a, b| a.x.total_cmp(&b.x));

    Channel1DData::with_known_order(
        points.iter().map(|p| p.x).collect(),
        points.iter().map(|p| p.y).collect(),
        Quantity::new("indentation", *branch.x_quantity().unit()),
        Quantity::new("force", Unit::base(BaseUnit::Newton)),
        SortedArrayOrder::Ascending,
    )
}
