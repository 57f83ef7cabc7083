//! One-dimensional channel data
//!
//! [`Channel1DData`] is the immutable `(x, y)` collection every algorithm in
//! this workspace consumes: abscissa and ordinate arrays of equal length,
//! each tagged with a physical [`Quantity`], plus an explicit order tag.
//! `order == None` means unknown; consumers must either check the tag or
//! sort explicitly, never assume sortedness. Every transformation returns a
//! new instance.

use crate::error::{Error, Result};
use crate::order::{self, SortedArrayOrder};
use crate::quantity::Quantity;

/// A single curve point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An ordered or unordered collection of `(x, y)` pairs with axis quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel1DData {
    xs: Vec<f64>,
    ys: Vec<f64>,
    x_quantity: Quantity,
    y_quantity: Quantity,
    order: Option<SortedArrayOrder>,
}

impl Channel1DData {
    /// Create a channel with an unknown order tag.
    pub fn new(
        xs: Vec<f64>,
        ys: Vec<f64>,
        x_quantity: Quantity,
        y_quantity: Quantity,
    ) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(Error::length_mismatch(xs.len(), ys.len()));
        }
        Ok(Self {
            xs,
            ys,
            x_quantity,
            y_quantity,
            order: None,
        })
    }

    /// Create a channel whose order the producer already guarantees.
    ///
    /// The tag is trusted, not re-verified; producers that lie here break
    /// every downstream consumer.
    pub fn with_known_order(
        xs: Vec<f64>,
        ys: Vec<f64>,
        x_quantity: Quantity,
        y_quantity: Quantity,
        order: SortedArrayOrder,
    ) -> Result<Self> {
        let mut channel = Self::new(xs, ys, x_quantity, y_quantity)?;
        channel.order = Some(order);
        Ok(channel)
    }

    /// Crate-internal constructor for transformations that preserve the
    /// length invariant by construction.
    pub(crate) fn from_parts(
        xs: Vec<f64>,
        ys: Vec<f64>,
        x_quantity: Quantity,
        y_quantity: Quantity,
        order: Option<SortedArrayOrder>,
    ) -> Self {
        debug_assert_eq!(xs.len(), ys.len());
        Self {
            xs,
            ys,
            x_quantity,
            y_quantity,
            order,
        }
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn x_quantity(&self) -> &Quantity {
        &self.x_quantity
    }

    pub fn y_quantity(&self) -> &Quantity {
        &self.y_quantity
    }

    /// The order tag; `None` means unknown, not unordered.
    pub fn order(&self) -> Option<SortedArrayOrder> {
        self.order
    }

    pub fn point(&self, index: usize) -> Point2D {
        Point2D::new(self.xs[index], self.ys[index])
    }

    pub fn points(&self) -> impl Iterator<Item = Point2D> + '_ {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| Point2D::new(x, y))
    }

    /// Index of the point whose abscissa is closest to `x`.
    pub fn index_of_nearest_x(&self, x: f64) -> Option<usize> {
        nearest_index(&self.xs, x)
    }

    /// Index of the point whose ordinate is closest to `y`.
    pub fn index_of_nearest_y(&self, y: f64) -> Option<usize> {
        nearest_index(&self.ys, y)
    }

    /// Index of the minimum ordinate within `[from, to)`.
    pub fn index_of_min_y_in(&self, from: usize, to: usize) -> Option<usize> {
        let to = to.min(self.len());
        if from >= to {
            return None;
        }
        let mut best = from;
        for i in from + 1..to {
            if self.ys[i] < self.ys[best] {
                best = i;
            }
        }
        Some(best)
    }

    /// A copy sorted by abscissa into the given order.
    pub fn sorted_by_x(&self, order: SortedArrayOrder) -> Channel1DData {
        if self.order == Some(order) {
            return self.clone();
        }
        let (xs, ys) = order::sorted_points(&self.xs, &self.ys, order);
        Channel1DData {
            xs,
            ys,
            x_quantity: self.x_quantity.clone(),
            y_quantity: self.y_quantity.clone(),
            order: Some(order),
        }
    }

    /// A copy restricted to the index interval `[from, to)`.
    pub fn sliced(&self, from: usize, to: usize) -> Channel1DData {
        let to = to.min(self.len());
        let from = from.min(to);
        Channel1DData {
            xs: self.xs[from..to].to_vec(),
            ys: self.ys[from..to].to_vec(),
            x_quantity: self.x_quantity.clone(),
            y_quantity: self.y_quantity.clone(),
            order: self.order,
        }
    }

    /// A copy with the given fractions of points dropped from each end.
    pub fn trimmed(&self, left_fraction: f64, right_fraction: f64) -> Channel1DData {
        let n = self.len();
        let left = (left_fraction.clamp(0.0, 1.0) * n as f64).ceil() as usize;
        let right = (right_fraction.clamp(0.0, 1.0) * n as f64).ceil() as usize;
        if left + right >= n {
            return self.sliced(0, 0);
        }
        self.sliced(left, n - right)
    }

    /// A copy keeping only points with `xmin <= x <= xmax`.
    ///
    /// Does not require any order; relative point order is preserved.
    pub fn restricted_to_domain(&self, xmin: f64, xmax: f64) -> Channel1DData {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for (&x, &y) in self.xs.iter().zip(self.ys.iter()) {
            if x >= xmin && x <= xmax {
                xs.push(x);
                ys.push(y);
            }
        }
        Channel1DData {
            xs,
            ys,
            x_quantity: self.x_quantity.clone(),
            y_quantity: self.y_quantity.clone(),
            order: self.order,
        }
    }

    /// A copy with both axes transformed pointwise and retagged.
    ///
    /// Order is preserved only when the x map is monotone increasing; the
    /// caller states that via `monotone_x`.
    pub fn mapped(
        &self,
        x_map: impl Fn(f64) -> f64,
        y_map: impl Fn(f64) -> f64,
        x_quantity: Quantity,
        y_quantity: Quantity,
        monotone_x: bool,
    ) -> Channel1DData {
        Channel1DData {
            xs: self.xs.iter().map(|&x| x_map(x)).collect(),
            ys: self.ys.iter().map(|&y| y_map(y)).collect(),
            x_quantity,
            y_quantity,
            order: if monotone_x { self.order } else { None },
        }
    }
}

fn nearest_index(values: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        let distance = (v - target).abs();
        if distance.is_nan() {
            continue;
        }
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((i, distance)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::{BaseUnit, SiPrefix, Unit};

    fn quantities() -> (Quantity, Quantity) {
        (
            Quantity::new("distance", Unit::new(SiPrefix::Micro, BaseUnit::Meter)),
            Quantity::new("deflection", Unit::new(SiPrefix::Nano, BaseUnit::Meter)),
        )
    }

    fn channel(xs: Vec<f64>, ys: Vec<f64>) -> Channel1DData {
        let (xq, yq) = quantities();
        Channel1DData::new(xs, ys, xq, yq).unwrap()
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let (xq, yq) = quantities();
        assert!(Channel1DData::new(vec![1.0], vec![], xq, yq).is_err());
    }

    #[test]
    fn test_order_tag_defaults_to_unknown() {
        let ch = channel(vec![1.0, 2.0], vec![3.0, 4.0]);
        assert_eq!(ch.order(), None);
    }

    #[test]
    fn test_sorted_by_x_sets_tag_and_keeps_original() {
        let ch = channel(vec![3.0, 1.0, 2.0], vec![30.0, 10.0, 20.0]);
        let sorted = ch.sorted_by_x(SortedArrayOrder::Ascending);
        assert_eq!(sorted.xs(), &[1.0, 2.0, 3.0]);
        assert_eq!(sorted.ys(), &[10.0, 20.0, 30.0]);
        assert_eq!(sorted.order(), Some(SortedArrayOrder::Ascending));
        // Original untouched
        assert_eq!(ch.xs(), &[3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_sorted_by_x_is_identity_when_tagged() {
        let (xq, yq) = quantities();
        let ch = Channel1DData::with_known_order(
            vec![1.0, 2.0, 3.0],
            vec![5.0, 6.0, 7.0],
            xq,
            yq,
            SortedArrayOrder::Ascending,
        )
        .unwrap();
        let sorted = ch.sorted_by_x(SortedArrayOrder::Ascending);
        assert_eq!(sorted, ch);
    }

    #[test]
    fn test_nearest_indices() {
        let ch = channel(vec![0.0, 1.0, 4.0], vec![-2.0, 3.0, 0.5]);
        assert_eq!(ch.index_of_nearest_x(1.4), Some(1));
        assert_eq!(ch.index_of_nearest_y(0.0), Some(2));
        assert_eq!(channel(vec![], vec![]).index_of_nearest_x(1.0), None);
    }

    #[test]
    fn test_index_of_min_y_in() {
        let ch = channel(vec![0.0, 1.0, 2.0, 3.0], vec![5.0, -1.0, 2.0, -0.5]);
        assert_eq!(ch.index_of_min_y_in(0, 4), Some(1));
        assert_eq!(ch.index_of_min_y_in(2, 4), Some(3));
        assert_eq!(ch.index_of_min_y_in(3, 3), None);
    }

    #[test]
    fn test_trimmed() {
        let ch = channel(
            (0..10).map(|i| i as f64).collect(),
            (0..10).map(|i| i as f64 * 2.0).collect(),
        );
        let trimmed = ch.trimmed(0.1, 0.2);
        assert_eq!(trimmed.xs(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);

        // Trimming everything yields an empty channel, not a panic
        assert!(ch.trimmed(0.6, 0.6).is_empty());
    }

    #[test]
    fn test_restricted_to_domain() {
        let ch = channel(vec![5.0, 1.0, 3.0, 9.0], vec![1.0, 2.0, 3.0, 4.0]);
        let restricted = ch.restricted_to_domain(2.0, 6.0);
        assert_eq!(restricted.xs(), &[5.0, 3.0]);
        assert_eq!(restricted.ys(), &[1.0, 3.0]);
    }

    #[test]
    fn test_mapped_drops_order_for_non_monotone_map() {
        let (xq, yq) = quantities();
        let ch = Channel1DData::with_known_order(
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            xq.clone(),
            yq.clone(),
            SortedArrayOrder::Ascending,
        )
        .unwrap();
        let flipped = ch.mapped(|x| -x, |y| y, xq.clone(), yq.clone(), false);
        assert_eq!(flipped.order(), None);
        let scaled = ch.mapped(|x| 2.0 * x, |y| y, xq, yq, true);
        assert_eq!(scaled.order(), Some(SortedArrayOrder::Ascending));
    }
}
