//! Playtime display formatting

/// Format a playtime balance as `M:SS`. The minutes field grows without
/// bound; there is no hour rollover.
pub fn format_playtime(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_seconds_to_two_digits() {
        assert_eq!(format_playtime(65), "1:05");
        assert_eq!(format_playtime(0), "0:00");
        assert_eq!(format_playtime(59), "0:59");
        assert_eq!(format_playtime(600), "10:00");
    }

    #[test]
    fn minutes_never_roll_over_into_hours() {
        assert_eq!(format_playtime(3661), "61:01");
        assert_eq!(format_playtime(5 * 900), "75:00");
    }
}
