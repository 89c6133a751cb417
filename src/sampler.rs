//! Random historical month sampling.
//!
//! The search surface for 1985-2000 content is sparse and high-variance;
//! rather than walk the calendar, each attempt draws a fresh uniform
//! (year, month) pair. Year and month are drawn independently, so months
//! are not weighted by year length. Day-level granularity is never used
//! downstream.

use rand::Rng;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Draw a uniform (year, month) pair within the inclusive year range.
pub fn sample_month<R: Rng>(rng: &mut R, start_year: i32, end_year: i32) -> (i32, u32) {
    let year = rng.random_range(start_year..=end_year);
    let month = rng.random_range(1..=12u32);
    (year, month)
}

/// Human-readable month-year label, e.g. `"May 1990"`.
///
/// Used verbatim in the search query, the synthesis prompt, and the
/// document header, so the three always agree on the attempt's era.
pub fn month_label(year: i32, month: u32) -> String {
    format!("{} {}", MONTH_NAMES[(month - 1) as usize], year)
}
