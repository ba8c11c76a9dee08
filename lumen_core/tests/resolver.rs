use lumen_core::error::ConfigError;
use lumen_core::{Bucket, BucketResolver, CrossingPolicy};
use rstest::rstest;

fn bucket(min_lux: f64, max_lux: f64, brightness: f64) -> Bucket {
    Bucket {
        min_lux,
        max_lux,
        brightness,
    }
}

// Overlapping table from the reference scenario: [0,10], [5,200], [50,650]
fn overlapping_table() -> Vec<Bucket> {
    vec![
        bucket(0.0, 10.0, 0.1),
        bucket(5.0, 200.0, 0.25),
        bucket(50.0, 650.0, 0.5),
    ]
}

#[test]
fn empty_table_fails_fast() {
    let err = BucketResolver::new(Vec::new()).expect_err("empty table must be rejected");
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::EmptyBuckets)
    ));
}

#[rstest]
#[case(20.0, 10.0, 0.5, "min_lux must be <= max_lux")]
#[case(0.0, 10.0, 1.5, "brightness must be within [0, 1]")]
#[case(-1.0, 10.0, 0.5, "min_lux must be >= 0")]
fn invalid_bucket_rejected(
    #[case] min_lux: f64,
    #[case] max_lux: f64,
    #[case] brightness: f64,
    #[case] reason: &str,
) {
    let err = BucketResolver::new(vec![bucket(min_lux, max_lux, brightness)])
        .expect_err("invalid bucket must be rejected");
    assert!(format!("{err}").contains(reason));
}

#[rstest]
#[case(2.0, 0)]
#[case(30.0, 1)] // past bucket 0's max, strictly inside bucket 1
#[case(400.0, 2)]
fn exact_match_without_hysteresis(#[case] lux: f64, #[case] expect: usize) {
    let mut r = BucketResolver::new(overlapping_table()).unwrap();
    assert_eq!(r.resolve(lux, false), expect);
}

#[test]
fn hysteresis_prefers_current_bucket_in_overlap() {
    let mut r = BucketResolver::new(overlapping_table()).unwrap();
    assert_eq!(r.resolve(400.0, true), 2);
    // 100 lies inside both bucket 1 and bucket 2; the active bucket wins.
    assert_eq!(r.resolve(100.0, true), 2);
    assert_eq!(r.current_index(), Some(2));
}

#[test]
fn without_hysteresis_first_containing_bucket_wins() {
    let mut r = BucketResolver::new(overlapping_table()).unwrap();
    assert_eq!(r.resolve(400.0, true), 2);
    // Stateless resolution ignores the sticky index entirely.
    assert_eq!(r.resolve(100.0, false), 1);
}

#[test]
fn nearest_bucket_fills_configuration_gaps() {
    let mut r = BucketResolver::new(vec![bucket(0.0, 10.0, 0.1), bucket(50.0, 100.0, 0.5)]).unwrap();
    // distance to bucket 0 is 15, to bucket 1 is 25
    assert_eq!(r.resolve(25.0, false), 0);
    // distance to bucket 0 is 39, to bucket 1 is 1
    assert_eq!(r.resolve(49.0, false), 1);
}

#[test]
fn gap_ties_resolve_to_lower_index() {
    let mut r = BucketResolver::new(vec![bucket(0.0, 10.0, 0.1), bucket(30.0, 100.0, 0.5)]).unwrap();
    // 20 is 10 away from both boundaries; first encountered wins.
    assert_eq!(r.resolve(20.0, false), 0);
}

#[test]
fn below_first_bucket_always_resolves_to_bucket_zero() {
    let mut r = BucketResolver::new(vec![bucket(100.0, 200.0, 0.1), bucket(210.0, 500.0, 0.5)]).unwrap();
    // 99 is much closer to bucket 0 anyway, but even a value nearer to
    // bucket 1's boundary must not be pulled upward from below the table.
    assert_eq!(r.resolve(99.0, false), 0);
    assert_eq!(r.resolve(0.0, false), 0);
}

#[test]
fn crossing_is_conservative_on_unknown_values() {
    let mut r = BucketResolver::new(overlapping_table()).unwrap();
    assert!(r.crossed_boundary(None, Some(100.0)));
    assert!(r.crossed_boundary(Some(100.0), None));
    r.resolve(100.0, true);
    assert!(r.crossed_boundary(None, Some(100.0)));
}

#[test]
fn crossing_against_active_bucket() {
    let mut r = BucketResolver::new(overlapping_table()).unwrap();
    r.resolve(400.0, true); // bucket 2: [50, 650]
    assert!(!r.crossed_boundary(Some(400.0), Some(100.0)));
    assert!(r.crossed_boundary(Some(400.0), Some(700.0)));
    assert!(r.crossed_boundary(Some(400.0), Some(10.0)));
}

#[test]
fn conservative_policy_reports_crossed_without_active_bucket() {
    let r = BucketResolver::with_policy(overlapping_table(), CrossingPolicy::Conservative).unwrap();
    assert!(r.crossed_boundary(Some(100.0), Some(101.0)));
}

#[test]
fn fresh_resolve_policy_tests_against_previous_value_bucket() {
    let r = BucketResolver::with_policy(overlapping_table(), CrossingPolicy::FreshResolve).unwrap();
    // prev 7 resolves statelessly to bucket 0 ([0,10]); 9 stays inside it.
    assert!(!r.crossed_boundary(Some(7.0), Some(9.0)));
    assert!(r.crossed_boundary(Some(7.0), Some(60.0)));
}
