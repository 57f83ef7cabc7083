//! Approach/withdraw branch partitioning
//!
//! A raw force-curve recording holds an approach-then-withdraw sweep (or a
//! single branch) whose abscissa reverses direction at the turning point.
//! This module finds that turning point in a noise-tolerant way, splits the
//! recording into two internally consistent branches, and labels each one
//! APPROACH or WITHDRAW from the sign relationship between its endpoint
//! deltas.
//!
//! The splitting kernel works on parallel `f64` slices and is shared by the
//! point-pair and channel representations; it is implemented exactly once.

use crate::channel::{Channel1DData, Point2D};
use crate::error::Result;
use crate::order::{self, SortedArrayOrder};
use crate::quantity::Quantity;
use tracing::debug;

/// Which half of the force-curve cycle a branch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    /// Tip moving toward the sample
    Approach,
    /// Tip moving away from the sample
    Withdraw,
}

/// Contact-side geometry of a branch: where along the abscissa the contact
/// region sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveOrientation {
    /// Contact (high force) at low x
    Left,
    /// Contact (high force) at high x
    Right,
}

/// A combined recording split into its two branches.
///
/// A branch absent from the recording is an empty channel, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionedCurve {
    pub approach: Channel1DData,
    pub withdraw: Channel1DData,
}

/// Index of the last point of the first monotone run, tolerant of isolated
/// single-point violations.
///
/// A point is ignored as noise when skipping it restores monotonicity with
/// its successor. `None` when the whole array is one monotone run (or too
/// short to decide).
pub fn turning_index(xs: &[f64]) -> Option<usize> {
    let initial = order::initial_order(xs)?;
    let consistent = |prev: f64, next: f64| match initial {
        SortedArrayOrder::Ascending => next >= prev,
        SortedArrayOrder::Descending => next <= prev,
    };

    let n = xs.len();
    let mut prev = xs[0];
    let mut i = 1;
    while i < n {
        if consistent(prev, xs[i]) {
            prev = xs[i];
            i += 1;
            continue;
        }
        // Isolated violation: skipping point i keeps the trend going
        if i + 1 < n && consistent(prev, xs[i + 1]) {
            i += 1;
            continue;
        }
        return Some(i - 1);
    }
    None
}

/// Contact-side geometry from the endpoint deltas.
///
/// `None` when either delta vanishes (flat or single-point data).
pub fn orientation(xs: &[f64], ys: &[f64]) -> Option<CurveOrientation> {
    if xs.len() < 2 {
        return None;
    }
    let dx = xs[xs.len() - 1] - xs[0];
    let dy = ys[ys.len() - 1] - ys[0];
    if dx == 0.0 || dy == 0.0 {
        return None;
    }
    // Force rising while x falls (or falling while x rises) puts the
    // contact region at low x.
    if dx * dy < 0.0 {
        Some(CurveOrientation::Left)
    } else {
        Some(CurveOrientation::Right)
    }
}

/// APPROACH/WITHDRAW label for a single monotone branch.
///
/// The recording direction (sign of the endpoint x delta) combined with the
/// contact side decides the label: moving toward the contact side is an
/// approach. Undecidable geometry defaults to APPROACH.
pub fn classify(xs: &[f64], ys: &[f64]) -> BranchKind {
    let Some(orient) = orientation(xs, ys) else {
        return BranchKind::Approach;
    };
    let descending = xs[xs.len() - 1] < xs[0];
    match (orient, descending) {
        (CurveOrientation::Left, true) | (CurveOrientation::Right, false) => BranchKind::Approach,
        (CurveOrientation::Left, false) | (CurveOrientation::Right, true) => BranchKind::Withdraw,
    }
}

/// Split a raw recording into approach and withdraw branches.
///
/// The shared slice-level kernel. Returns `(approach, withdraw)` as index
/// ranges `[start, end)` into the input; one of them is empty when the
/// recording holds a single branch, both when the input is empty.
fn partition_indices(xs: &[f64], ys: &[f64]) -> ((usize, usize), (usize, usize)) {
    let n = xs.len();
    if n == 0 {
        return ((0, 0), (0, 0));
    }
    let Some(turn) = turning_index(xs) else {
        // One monotone run; label decides which slot it fills.
        return match classify(xs, ys) {
            BranchKind::Approach => ((0, n), (n, n)),
            BranchKind::Withdraw => ((n, n), (0, n)),
        };
    };

    let first = (0, turn + 1);
    let second = (turn + 1, n);
    let first_kind = classify(&xs[first.0..first.1], &ys[first.0..first.1]);
    let second_kind = classify(&xs[second.0..second.1], &ys[second.0..second.1]);

    match (first_kind, second_kind) {
        (BranchKind::Approach, BranchKind::Withdraw) => (first, second),
        (BranchKind::Withdraw, BranchKind::Approach) => (second, first),
        // Noise made both labels agree; fall back to recording order.
        (BranchKind::Approach, BranchKind::Approach) => (first, second),
        (BranchKind::Withdraw, BranchKind::Withdraw) => (second, first),
    }
}

/// Partition a channel into its approach and withdraw branches.
pub fn partition_channel(channel: &Channel1DData) -> PartitionedCurve {
    let (a, w) = partition_indices(channel.xs(), channel.ys());
    debug!(
        approach = a.1 - a.0,
        withdraw = w.1 - w.0,
        "recording partitioned"
    );
    PartitionedCurve {
        approach: channel.sliced(a.0, a.1),
        withdraw: channel.sliced(w.0, w.1),
    }
}

/// Point-pair adapter over the same kernel.
pub fn partition_points(
    points: &[Point2D],
    x_quantity: Quantity,
    y_quantity: Quantity,
) -> Result<PartitionedCurve> {
    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
    let channel = Channel1DData::new(xs, ys, x_quantity, y_quantity)?;
    Ok(partition_channel(&channel))
}

/// Reverse a branch so its abscissa ascends, when the overall order says it
/// descends.
///
/// Reversal (not sorting) preserves the recording's noise structure.
/// Idempotent: an already ascending branch comes back bit-identical.
pub fn correct_orientation(channel: &Channel1DData) -> Channel1DData {
    match order::overall_order(channel.xs()) {
        Some(SortedArrayOrder::Descending) => {
            let xs: Vec<f64> = channel.xs().iter().rev().copied().collect();
            let ys: Vec<f64> = channel.ys().iter().rev().copied().collect();
            Channel1DData::from_parts(
                xs,
                ys,
                channel.x_quantity().clone(),
                channel.y_quantity().clone(),
                channel.order().map(|o| o.reversed()),
            )
        }
        _ => channel.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::{BaseUnit, SiPrefix, Unit};

    fn channel(xs: Vec<f64>, ys: Vec<f64>) -> Channel1DData {
        Channel1DData::new(
            xs,
            ys,
            Quantity::new("distance", Unit::new(SiPrefix::Micro, BaseUnit::Meter)),
            Quantity::new("deflection", Unit::new(SiPrefix::Nano, BaseUnit::Meter)),
        )
        .unwrap()
    }

    #[test]
    fn test_turning_index_clean_v() {
        let xs = [5.0, 4.0, 3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(turning_index(&xs), Some(4));
    }

    #[test]
    fn test_turning_index_monotone_is_none() {
        assert_eq!(turning_index(&[1.0, 2.0, 3.0]), None);
        assert_eq!(turning_index(&[3.0, 2.0, 1.0]), None);
        assert_eq!(turning_index(&[2.0, 2.0]), None);
    }

    #[test]
    fn test_turning_index_tolerates_isolated_violation() {
        // Point at index 2 spikes upward but the descent resumes at index 3
        let xs = [5.0, 4.0, 4.5, 3.0, 2.0, 1.0, 2.0, 3.0];
        assert_eq!(turning_index(&xs), Some(5));
    }

    #[test]
    fn test_turning_index_two_point_reversal_detected() {
        // Two consecutive violations are a genuine reversal, not noise
        let xs = [5.0, 4.0, 3.0, 3.5, 4.0, 5.0];
        assert_eq!(turning_index(&xs), Some(2));
    }

    #[test]
    fn test_orientation() {
        // Force falls as x rises: contact at low x
        assert_eq!(
            orientation(&[1.0, 2.0, 3.0], &[9.0, 4.0, 0.0]),
            Some(CurveOrientation::Left)
        );
        assert_eq!(
            orientation(&[1.0, 2.0, 3.0], &[0.0, 4.0, 9.0]),
            Some(CurveOrientation::Right)
        );
        assert_eq!(orientation(&[1.0, 2.0], &[3.0, 3.0]), None);
        assert_eq!(orientation(&[1.0], &[1.0]), None);
    }

    #[test]
    fn test_classify_single_branches() {
        // Left geometry, x descending toward contact: approach
        assert_eq!(
            classify(&[3.0, 2.0, 1.0], &[0.0, 1.0, 5.0]),
            BranchKind::Approach
        );
        // Left geometry, x ascending away from contact: withdraw
        assert_eq!(
            classify(&[1.0, 2.0, 3.0], &[5.0, 1.0, 0.0]),
            BranchKind::Withdraw
        );
        // Right geometry, ascending toward contact: approach
        assert_eq!(
            classify(&[1.0, 2.0, 3.0], &[0.0, 1.0, 5.0]),
            BranchKind::Approach
        );
    }

    #[test]
    fn test_partition_v_curve_round_trip() {
        let xs = vec![5.0, 4.0, 3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = vec![0.0, 0.1, 0.4, 1.5, 4.0, 1.4, 0.5, 0.2, 0.0];
        let ch = channel(xs.clone(), ys.clone());
        let parts = partition_channel(&ch);

        assert!(!parts.approach.is_empty());
        assert!(!parts.withdraw.is_empty());
        assert_eq!(parts.approach.len() + parts.withdraw.len(), ch.len());

        // Concatenation reproduces the original point multiset
        let mut recombined: Vec<(u64, u64)> = parts
            .approach
            .points()
            .chain(parts.withdraw.points())
            .map(|p| (p.x.to_bits(), p.y.to_bits()))
            .collect();
        let mut original: Vec<(u64, u64)> = ch
            .points()
            .map(|p| (p.x.to_bits(), p.y.to_bits()))
            .collect();
        recombined.sort_unstable();
        original.sort_unstable();
        assert_eq!(recombined, original);

        // The descending-x sweep toward high force is the approach
        assert_eq!(parts.approach.xs(), &[5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(parts.withdraw.xs(), &[2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_partition_single_withdraw_branch() {
        // Left geometry, ascending away from contact
        let ch = channel(vec![1.0, 2.0, 3.0, 4.0], vec![6.0, 2.0, 0.5, 0.1]);
        let parts = partition_channel(&ch);
        assert!(parts.approach.is_empty());
        assert_eq!(parts.withdraw.len(), 4);
    }

    #[test]
    fn test_partition_empty_input() {
        let ch = channel(vec![], vec![]);
        let parts = partition_channel(&ch);
        assert!(parts.approach.is_empty());
        assert!(parts.withdraw.is_empty());
    }

    #[test]
    fn test_partition_points_matches_channel_kernel() {
        let xs = vec![3.0, 2.0, 1.0, 2.0, 3.0];
        let ys = vec![0.1, 1.0, 4.0, 1.1, 0.2];
        let points: Vec<Point2D> = xs
            .iter()
            .zip(&ys)
            .map(|(&x, &y)| Point2D::new(x, y))
            .collect();
        let from_points = partition_points(
            &points,
            Quantity::new("distance", Unit::new(SiPrefix::Micro, BaseUnit::Meter)),
            Quantity::new("deflection", Unit::new(SiPrefix::Nano, BaseUnit::Meter)),
        )
        .unwrap();
        let from_channel = partition_channel(&channel(xs, ys));
        assert_eq!(from_points, from_channel);
    }

    #[test]
    fn test_correct_orientation_idempotent() {
        let descending = channel(vec![3.0, 2.0, 1.0], vec![0.5, 1.0, 4.0]);
        let corrected = correct_orientation(&descending);
        assert_eq!(corrected.xs(), &[1.0, 2.0, 3.0]);
        assert_eq!(corrected.ys(), &[4.0, 1.0, 0.5]);

        let again = correct_orientation(&corrected);
        assert_eq!(again, corrected);
    }
}
