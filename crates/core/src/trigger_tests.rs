// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    first = { Trigger::First, 2, true, "first_reset" },
    second = { Trigger::Second, 1, false, "second_reset" },
)]
fn trigger_rules(trigger: Trigger, min_resets: u32, threshold: bool, operation: &str) {
    assert_eq!(trigger.min_reset_times(), min_resets);
    assert_eq!(trigger.applies_threshold(), threshold);
    assert_eq!(trigger.lock_operation(), operation);
}

#[test]
fn parses_case_insensitively() {
    assert_eq!("First".parse::<Trigger>(), Ok(Trigger::First));
    assert_eq!(" second ".parse::<Trigger>(), Ok(Trigger::Second));
    assert!("third".parse::<Trigger>().is_err());
}

#[test]
fn display_round_trips_through_from_str() {
    for trigger in Trigger::ALL {
        assert_eq!(trigger.to_string().parse::<Trigger>(), Ok(trigger));
    }
}
