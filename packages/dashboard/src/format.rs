//! Compact number formatting for chart labels and tables.

/// Formats `value` with a `k`/`M` suffix above one thousand.
///
/// ```
/// use crime_dashboard::format::format_number;
///
/// assert_eq!(format_number(1_260.0), "1.3k");
/// assert_eq!(format_number(2_000_000.0), "2.0M");
/// assert_eq!(format_number(950.0), "950");
/// ```
#[must_use]
pub fn format_number(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        value.to_string()
    }
}

/// Formats a period-over-period change with a direction arrow.
#[must_use]
pub fn format_change(change: f64) -> String {
    if change > 0.0 {
        format!("↑ {}", format_number(change))
    } else if change < 0.0 {
        format!("↓ {}", format_number(change.abs()))
    } else {
        "– 0".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes() {
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1_000.0), "1.0k");
        assert_eq!(format_number(15_300.0), "15.3k");
        assert_eq!(format_number(999_999.0), "1000.0k");
        assert_eq!(format_number(1_000_000.0), "1.0M");
        assert_eq!(format_number(12.5), "12.5");
    }

    #[test]
    fn changes() {
        assert_eq!(format_change(2_500.0), "↑ 2.5k");
        assert_eq!(format_change(-40.0), "↓ 40");
        assert_eq!(format_change(-1_200_000.0), "↓ 1.2M");
        assert_eq!(format_change(0.0), "– 0");
    }
}
