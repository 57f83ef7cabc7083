//! Abscissa ordering utilities
//!
//! A recorded curve may arrive with its abscissa ascending, descending, or in
//! no usable order at all. [`SortedArrayOrder`] is the two-valued tag, and the
//! free functions here detect order and (re)establish it. Two different
//! notions of order exist on noisy data:
//!
//! * **initial** order: decided by the first two distinct values,
//! * **overall** order: decided by the endpoints,
//!
//! and they can disagree. Callers that need a strict global order must
//! reconcile both or re-sort.
//!
//! Mutation contract: functions taking `&mut` sort the caller's buffers in
//! place; functions taking `&` never touch the input and return new vectors.

/// Direction of a sorted abscissa array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortedArrayOrder {
    Ascending,
    Descending,
}

impl SortedArrayOrder {
    /// The opposite order.
    pub fn reversed(&self) -> SortedArrayOrder {
        match self {
            SortedArrayOrder::Ascending => SortedArrayOrder::Descending,
            SortedArrayOrder::Descending => SortedArrayOrder::Ascending,
        }
    }
}

/// Local order at the start of the array: the first two distinct values.
///
/// `None` when the array holds fewer than two distinct values.
pub fn initial_order(values: &[f64]) -> Option<SortedArrayOrder> {
    let first = *values.first()?;
    for &v in &values[1..] {
        if v > first {
            return Some(SortedArrayOrder::Ascending);
        }
        if v < first {
            return Some(SortedArrayOrder::Descending);
        }
    }
    None
}

/// Global order suggested by the endpoints.
///
/// `None` when the array is shorter than two or the endpoints are equal.
pub fn overall_order(values: &[f64]) -> Option<SortedArrayOrder> {
    if values.len() < 2 {
        return None;
    }
    let first = values[0];
    let last = values[values.len() - 1];
    if last > first {
        Some(SortedArrayOrder::Ascending)
    } else if last < first {
        Some(SortedArrayOrder::Descending)
    } else {
        None
    }
}

/// Whether the array is already sorted in the given order (ties allowed).
pub fn is_sorted(values: &[f64], order: SortedArrayOrder) -> bool {
    values.windows(2).all(|w| match order {
        SortedArrayOrder::Ascending => w[0] <= w[1],
        SortedArrayOrder::Descending => w[0] >= w[1],
    })
}

/// Sort paired abscissa/ordinate buffers in place by abscissa.
///
/// Owned-buffer contract: mutates the caller's data. NaN abscissa values sort
/// to the end regardless of order.
pub fn sort_points_in_place(xs: &mut [f64], ys: &mut [f64], order: SortedArrayOrder) {
    debug_assert_eq!(xs.len(), ys.len());
    let mut indices: Vec<usize> = (0..xs.len()).collect();
    indices.sort_by(|&a, &b| {
        let cmp = xs[a].partial_cmp(&xs[b]).unwrap_or(std::cmp::Ordering::Equal);
        match order {
            SortedArrayOrder::Ascending => cmp,
            SortedArrayOrder::Descending => cmp.reverse(),
        }
    });
    apply_permutation(xs, &indices);
    apply_permutation(ys, &indices);
}

/// Sort in place only when the array is not already in the requested order.
///
/// Returns whether a sort was performed.
pub fn sort_points_if_needed(xs: &mut [f64], ys: &mut [f64], order: SortedArrayOrder) -> bool {
    if is_sorted(xs, order) {
        return false;
    }
    sort_points_in_place(xs, ys, order);
    true
}

/// Borrowed-view contract: returns sorted copies, the input is untouched.
pub fn sorted_points(xs: &[f64], ys: &[f64], order: SortedArrayOrder) -> (Vec<f64>, Vec<f64>) {
    let mut xs = xs.to_vec();
    let mut ys = ys.to_vec();
    sort_points_in_place(&mut xs, &mut ys, order);
    (xs, ys)
}

fn apply_permutation(values: &mut [f64], indices: &[usize]) {
    let reordered: Vec<f64> = indices.iter().map(|&i| values[i]).collect();
    values.copy_from_slice(&reordered);
}
