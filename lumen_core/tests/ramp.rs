use lumen_core::{BrightnessRamp, RampCfg};
use proptest::prelude::*;
use rstest::rstest;

fn cfg(step_size: f64, min_steps: u32, max_steps: u32) -> RampCfg {
    RampCfg {
        step_size,
        min_steps,
        max_steps,
    }
}

#[test]
fn equal_current_and_target_yields_single_element() {
    let values: Vec<f64> = BrightnessRamp::new(Some(0.5), 0.5, &RampCfg::default()).collect();
    assert_eq!(values, vec![0.5]);
}

#[test]
fn unknown_current_jumps_straight_to_target() {
    let values: Vec<f64> = BrightnessRamp::new(None, 0.8, &RampCfg::default()).collect();
    assert_eq!(values, vec![0.8]);
}

#[rstest]
#[case(0.5, 0.75)] // one step
#[case(0.5, 1.0)] // two steps, still within min_steps
fn short_transitions_skip_interpolation(#[case] current: f64, #[case] target: f64) {
    let values: Vec<f64> = BrightnessRamp::new(Some(current), target, &cfg(0.25, 2, 30)).collect();
    assert_eq!(values, vec![target]);
}

#[test]
fn long_transition_is_capped_at_max_steps() {
    let ramp = BrightnessRamp::new(Some(0.0), 1.0, &cfg(0.02, 1, 30));
    let values: Vec<f64> = ramp.collect();
    assert_eq!(values.len(), 30);
    assert_eq!(*values.last().unwrap(), 1.0);
}

#[test]
fn ascending_ramp_is_monotonic_and_never_overshoots() {
    let values: Vec<f64> = BrightnessRamp::new(Some(0.15), 0.5, &cfg(0.02, 1, 100)).collect();
    assert!(values.len() > 2);
    for pair in values.windows(2) {
        assert!(pair[1] > pair[0]);
    }
    assert!(values.iter().all(|v| *v <= 0.5));
    assert_eq!(*values.last().unwrap(), 0.5);
}

#[test]
fn descending_ramp_is_monotonic_and_never_overshoots() {
    let values: Vec<f64> = BrightnessRamp::new(Some(1.0), 0.375, &cfg(0.125, 1, 100)).collect();
    assert_eq!(values.len(), 5);
    for pair in values.windows(2) {
        assert!(pair[1] < pair[0]);
    }
    assert!(values.iter().all(|v| *v >= 0.375));
    assert_eq!(*values.last().unwrap(), 0.375);
}

#[test]
fn reports_exact_size() {
    let mut ramp = BrightnessRamp::new(Some(0.0), 0.5, &cfg(0.0625, 1, 100));
    assert_eq!(ramp.len(), 8);
    ramp.next();
    assert_eq!(ramp.len(), 7);
    let rest: Vec<f64> = ramp.collect();
    assert_eq!(rest.len(), 7);
}

proptest! {
    // For any finite pair the sequence is finite, bounded by max_steps, and
    // its last element equals the target exactly (not within tolerance).
    #[test]
    fn terminates_exactly_on_target(
        current in 0.0f64..=1.0,
        target in 0.0f64..=1.0,
        step in 0.001f64..=0.2,
        max_steps in 1u32..=60,
    ) {
        let ramp = BrightnessRamp::new(Some(current), target, &cfg(step, 1, max_steps));
        let values: Vec<f64> = ramp.collect();
        prop_assert!(!values.is_empty());
        prop_assert!(values.len() <= max_steps.max(1) as usize);
        prop_assert_eq!(*values.last().unwrap(), target);
    }
}
