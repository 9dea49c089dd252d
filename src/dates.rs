//! Capture timestamp helpers
//!
//! Capture file names end in a `YYYYMMDDhhmmss` timestamp. Keeping every date
//! at that fixed width lets plain string comparison stand in for
//! chronological comparison.

use chrono::{DateTime, TimeZone};

/// `strftime` pattern of the timestamp embedded in capture names
pub const DATE_FORMAT: &str = "%Y%m%d%H%M%S";

/// Number of characters produced by [`DATE_FORMAT`]
pub const DATE_WIDTH: usize = 14;

/// Normalize a date string to [`DATE_WIDTH`] characters
///
/// Longer input is truncated, shorter input is right-padded with `'0'`.
/// An empty string stays empty.
///
/// # Examples
/// ```
/// use camcapture_server::dates::fit_date_string;
/// assert_eq!(fit_date_string("2024"), "20240000000000");
/// assert_eq!(fit_date_string("2024010112345678"), "20240101123456");
/// ```
pub fn fit_date_string(date: &str) -> String {
    if date.is_empty() {
        return String::new();
    }

    let mut fitted: String = date.chars().take(DATE_WIDTH).collect();
    let missing = DATE_WIDTH.saturating_sub(fitted.chars().count());
    fitted.extend(std::iter::repeat('0').take(missing));
    fitted
}

/// Render a point in time as a capture timestamp
pub fn format_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    time.format(DATE_FORMAT).to_string()
}
