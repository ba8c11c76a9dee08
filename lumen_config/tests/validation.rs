use lumen_config::{Config, load_path, load_toml};
use rstest::rstest;
use std::io::Write;

const GOOD: &str = r#"
[[buckets]]
min_lux = 0.0
max_lux = 20.0
brightness = 0.15

[[buckets]]
min_lux = 5.0
max_lux = 200.0
brightness = 0.25

[[buckets]]
min_lux = 50.0
max_lux = 650.0
brightness = 0.5

[bias]
gamma = 2.2
min_ratio = 0.2
max_ratio = 2.0

[stabilizer]
throttle_ms = 500
watchdog_min_ms = 5000
watchdog_backoff_step_ms = 5000
watchdog_max_ms = 60000
sensor_read_timeout_ms = 150
sample_rate_hz = 10

[ramp]
step_size = 0.02
min_steps = 1
max_steps = 30
"#;

#[test]
fn accepts_a_complete_config() {
    let cfg = load_toml(GOOD).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.buckets.len(), 3);
}

#[test]
fn defaults_cover_every_optional_section() {
    let toml = r#"
[[buckets]]
min_lux = 0.0
max_lux = 500.0
brightness = 0.5
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("defaults should validate");
    assert_eq!(cfg.bias.gamma, 2.2);
    assert_eq!(cfg.ramp.max_steps, 30);
    assert_eq!(cfg.stabilizer.throttle_ms, 500);
}

#[test]
fn rejects_empty_bucket_table() {
    let cfg = load_toml("buckets = []\n").expect("parse TOML");
    let err = cfg.validate().expect_err("should reject empty table");
    assert!(format!("{err}").contains("bucket table must not be empty"));
}

#[rstest]
#[case(
    "[[buckets]]\nmin_lux = 30.0\nmax_lux = 10.0\nbrightness = 0.5\n",
    "min_lux must be <= max_lux"
)]
#[case(
    "[[buckets]]\nmin_lux = 0.0\nmax_lux = 10.0\nbrightness = 1.5\n",
    "brightness must be within [0, 1]"
)]
#[case(
    "[[buckets]]\nmin_lux = -5.0\nmax_lux = 10.0\nbrightness = 0.5\n",
    "min_lux must be >= 0"
)]
fn rejects_invalid_buckets(#[case] toml: &str, #[case] reason: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject invalid bucket");
    assert!(format!("{err}").contains(reason), "got: {err}");
}

#[rstest]
#[case("gamma = 0.0", "gamma must be > 0")]
#[case("min_ratio = 0.0", "min_ratio must be > 0")]
#[case("max_ratio = 0.1", "max_ratio must be >= min_ratio")]
fn rejects_invalid_bias(#[case] line: &str, #[case] reason: &str) {
    let toml = format!(
        "[[buckets]]\nmin_lux = 0.0\nmax_lux = 10.0\nbrightness = 0.5\n\n[bias]\n{line}\n"
    );
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject invalid bias");
    assert!(format!("{err}").contains(reason), "got: {err}");
}

#[rstest]
#[case("throttle_ms = 0", "throttle_ms must be >= 1")]
#[case("sample_rate_hz = 0", "sample_rate_hz must be > 0")]
#[case(
    "watchdog_min_ms = 10000\nwatchdog_max_ms = 1000",
    "watchdog_max_ms must be >= watchdog_min_ms"
)]
fn rejects_invalid_stabilizer(#[case] lines: &str, #[case] reason: &str) {
    let toml = format!(
        "[[buckets]]\nmin_lux = 0.0\nmax_lux = 10.0\nbrightness = 0.5\n\n[stabilizer]\n{lines}\n"
    );
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject invalid stabilizer");
    assert!(format!("{err}").contains(reason), "got: {err}");
}

#[rstest]
#[case("step_size = 0.0", "step_size must be > 0")]
#[case("max_steps = 0", "max_steps must be >= 1")]
#[case("min_steps = 10\nmax_steps = 5", "min_steps must be <= max_steps")]
fn rejects_invalid_ramp(#[case] lines: &str, #[case] reason: &str) {
    let toml = format!(
        "[[buckets]]\nmin_lux = 0.0\nmax_lux = 10.0\nbrightness = 0.5\n\n[ramp]\n{lines}\n"
    );
    let cfg = load_toml(&toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject invalid ramp");
    assert!(format!("{err}").contains(reason), "got: {err}");
}

#[test]
fn converts_into_core_types() {
    let cfg: Config = load_toml(GOOD).expect("parse TOML");
    let buckets = cfg.core_buckets();
    assert_eq!(buckets.len(), 3);
    assert_eq!(buckets[0].brightness, 0.15);

    let bias: lumen_core::BiasCfg = (&cfg.bias).into();
    assert_eq!(bias.max_ratio, 2.0);
    let stab: lumen_core::StabilizerCfg = (&cfg.stabilizer).into();
    assert_eq!(stab.throttle_ms, 500);
    let ramp: lumen_core::RampCfg = (&cfg.ramp).into();
    assert_eq!(ramp.min_steps, 1);
}

#[test]
fn loads_from_a_file() {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    f.write_all(GOOD.as_bytes()).expect("write config");
    let cfg = load_path(f.path()).expect("load config file");
    cfg.validate().expect("valid config should pass");
}
