// ABOUTME: Fixed-decimal rounding helper for stored scores and gram targets
// ABOUTME: Rounds half to even on the scaled binary value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Athletix Contributors

/// Round `value` to `decimals` places, ties to even
///
/// 3.125 rounds to 3.12 and 9.375 to 9.38.
#[must_use]
pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
