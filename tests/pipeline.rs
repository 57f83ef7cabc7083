//! End-to-end pipeline tests over synthetic recordings.

use approx::assert_relative_eq;
use force_curve::{
    analyze, correct_orientation, BaseUnit, Channel1DData, ClassicalFlexibleEstimator,
    ContactChoice, ContactEstimator, ExhaustiveSearch, FocusedGridSearch, GoldenSectionSearch,
    Point2D, ProcessingSettings, Quantity, RobustFlexibleEstimator, SegmentedModelGuide,
    SiPrefix, SortedArrayOrder, Unit,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

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

/// Approach (x descending into contact) followed by withdraw (x ascending,
/// with an adhesion well before lift-off).
fn synthetic_recording(contact_x: f64, well_depth: f64, seed: u64) -> Channel1DData {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let n = 100usize;
    let mut xs = Vec::with_capacity(2 * n);
    let mut ys = Vec::with_capacity(2 * n);

    for i in (0..n).rev() {
        let x = i as f64;
        // Deflection grows slower than the piezo travel, as for a soft sample
        let clean = if x < contact_x { 0.8 * (contact_x - x) } else { 0.0 };
        xs.push(x);
        ys.push(clean + 0.03 * rng.gen_range(-1.0..1.0));
    }
    for i in 0..n {
        let x = i as f64;
        let clean = if x < contact_x {
            0.8 * (contact_x - x)
        } else if x < contact_x + 15.0 {
            -well_depth
        } else {
            0.0
        };
        xs.push(x);
        ys.push(clean + 0.03 * rng.gen_range(-1.0..1.0));
    }
    channel(xs, ys)
}

#[test]
fn test_analyze_locates_contact_and_builds_force_indentation() {
    let recording = synthetic_recording(40.0, 3.0, 17);
    let settings = ProcessingSettings::builder(1.0, 1.0).build().unwrap();
    let guide = SegmentedModelGuide::piecewise_linear();

    let analysis = analyze(&recording, &settings, &guide).unwrap();

    assert!(!analysis.partitioned().approach.is_empty());
    assert!(!analysis.partitioned().withdraw.is_empty());
    assert!(
        (analysis.contact_point().x - 40.0).abs() <= 3.0,
        "contact at {}",
        analysis.contact_point().x
    );

    let fi = analysis.force_indentation();
    assert!(!fi.is_empty());
    assert_eq!(fi.order(), Some(SortedArrayOrder::Ascending));
    // Deepest indentation carries the largest force
    let last = fi.len() - 1;
    assert!(fi.ys()[last] > fi.ys()[0]);
}

#[test]
fn test_analyze_detects_adhesion_on_withdraw() {
    let recording = synthetic_recording(40.0, 3.0, 23);
    let settings = ProcessingSettings::builder(1.0, 1.0)
        .robust_starts(100)
        .build()
        .unwrap();
    let guide = SegmentedModelGuide::piecewise_linear();

    let analysis = analyze(&recording, &settings, &guide).unwrap();
    let adhesion = analysis.adhesion_events();
    assert_eq!(adhesion.len(), 1);
    assert_relative_eq!(adhesion[0].force(), 3.0, epsilon = 1.0);
}

#[test]
fn test_analyze_is_deterministic() {
    let recording = synthetic_recording(40.0, 3.0, 29);
    let settings = ProcessingSettings::builder(1.0, 1.0)
        .contact(ContactChoice::Robust)
        .robust_starts(40)
        .seed(11)
        .build()
        .unwrap();
    let guide = SegmentedModelGuide::piecewise_linear();

    let first = analyze(&recording, &settings, &guide).unwrap();
    let second = analyze(&recording, &settings, &guide).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_manual_contact_passes_through() {
    let recording = synthetic_recording(40.0, 3.0, 31);
    let manual = Point2D::new(12.0, 56.0);
    let settings = ProcessingSettings::builder(1.0, 1.0)
        .contact(ContactChoice::Manual(manual))
        .build()
        .unwrap();
    let guide = SegmentedModelGuide::piecewise_linear();

    let analysis = analyze(&recording, &settings, &guide).unwrap();
    assert_eq!(analysis.contact_point(), manual);
}

#[test]
fn test_search_strategies_agree_on_sharp_bend() {
    let bend = 45usize;
    let mut rng = ChaCha8Rng::seed_from_u64(37);
    let xs: Vec<f64> = (0..110).map(|i| i as f64).collect();
    let ys: Vec<f64> = xs
        .iter()
        .map(|&x| {
            let clean = if (x as usize) < bend { 3.0 * (bend as f64 - x) } else { 0.0 };
            clean + 0.02 * rng.gen_range(-1.0..1.0)
        })
        .collect();
    let branch = channel(xs, ys);
    let guide = SegmentedModelGuide::piecewise_linear();

    let exhaustive = ClassicalFlexibleEstimator::new(ExhaustiveSearch)
        .contact_point(&branch, &guide, 1.0)
        .unwrap();
    let golden = ClassicalFlexibleEstimator::new(GoldenSectionSearch::new())
        .contact_point(&branch, &guide, 1.0)
        .unwrap();
    let grid = ClassicalFlexibleEstimator::new(FocusedGridSearch::default())
        .contact_point(&branch, &guide, 1.0)
        .unwrap();

    assert!((exhaustive.x - bend as f64).abs() <= 2.0);
    assert!((golden.x - exhaustive.x).abs() <= 1.0);
    assert!((grid.x - exhaustive.x).abs() <= 1.0);

    let robust = RobustFlexibleEstimator::new(GoldenSectionSearch::new())
        .with_starts(20)
        .with_seed(3)
        .contact_point(&branch, &guide, 1.0)
        .unwrap();
    assert!((robust.x - bend as f64).abs() <= 4.0);
}

#[test]
fn test_orientation_correction_is_idempotent() {
    let branch = channel(
        vec![5.0, 4.0, 3.0, 2.0, 1.0],
        vec![0.0, 1.0, 2.0, 3.0, 4.0],
    );
    let once = correct_orientation(&branch);
    let twice = correct_orientation(&once);
    assert_eq!(once, twice);
    assert_eq!(once.xs(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn test_empty_recording_is_an_error() {
    let recording = channel(vec![], vec![]);
    let settings = ProcessingSettings::builder(1.0, 1.0).build().unwrap();
    let guide = SegmentedModelGuide::piecewise_linear();
    assert!(analyze(&recording, &settings, &guide).is_err());
}
