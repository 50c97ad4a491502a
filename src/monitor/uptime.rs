//! Human-readable uptime.

use std::time::Duration;

/// Format an uptime using its two most significant units.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use proping::monitor::format_uptime;
///
/// assert_eq!(format_uptime(Duration::from_secs(42)), "42 seconds");
/// assert_eq!(format_uptime(Duration::from_secs(3_725)), "1 hours, 2 minutes");
/// ```
pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    match total {
        0..60 => format!("{total} seconds"),
        60..3_600 => format!("{} minutes, {} seconds", total / 60, total % 60),
        3_600..86_400 => format!("{} hours, {} minutes", total / 3_600, (total % 3_600) / 60),
        _ => format!("{} days, {} hours", total / 86_400, (total % 86_400) / 3_600),
    }
}
