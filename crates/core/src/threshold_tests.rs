// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    ceiling_below_cap = { Threshold::Ceiling { percent: 83.0 }, 25.0, false },
    ceiling_at_cap = { Threshold::Ceiling { percent: 83.0 }, 83.0, false },
    ceiling_above_cap = { Threshold::Ceiling { percent: 83.0 }, 95.0, true },
    floor_below = { Threshold::Floor { percent: 30.0 }, 29.9, false },
    floor_at = { Threshold::Floor { percent: 30.0 }, 30.0, true },
    floor_above = { Threshold::Floor { percent: 30.0 }, 80.0, true },
    off_never_skips = { Threshold::Off, 100.0, false },
)]
fn skip_decision(threshold: Threshold, percent: f64, expected: bool) {
    assert_eq!(threshold.should_skip(percent), expected);
}

#[parameterized(
    zero = { 0.0 },
    negative = { -5.0 },
    above_hundred = { 100.5 },
    nan = { f64::NAN },
)]
fn rejects_out_of_range(percent: f64) {
    assert!(Threshold::Ceiling { percent }.validate().is_err());
    assert!(Threshold::Floor { percent }.validate().is_err());
}

#[test]
fn deserializes_tagged_modes() {
    #[derive(Deserialize)]
    struct Wrapper {
        threshold: Threshold,
    }

    let w: Wrapper = parse_json(r#"{"threshold": {"mode": "ceiling", "percent": 83.0}}"#);
    assert_eq!(w.threshold, Threshold::Ceiling { percent: 83.0 });
    let w: Wrapper = parse_json(r#"{"threshold": {"mode": "off"}}"#);
    assert_eq!(w.threshold, Threshold::Off);
}

fn parse_json<T: serde::de::DeserializeOwned>(json: &str) -> T {
    serde_json::from_str(json).unwrap()
}
