// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    yes = { "yes\n", true },
    shouted = { "YES\n", true },
    padded = { "  yes  \n", true },
    short = { "y\n", false },
    no = { "no\n", false },
    empty = { "", false },
)]
fn confirm_accepts_only_yes(answer: &str, expected: bool) {
    let mut shown = Vec::new();

    let accepted = confirm("go? ", answer.as_bytes(), &mut shown).unwrap();

    assert_eq!(accepted, expected);
    assert_eq!(String::from_utf8(shown).unwrap(), "go? ");
}
