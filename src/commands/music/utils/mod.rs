use std::time::Duration;

pub mod access;
pub mod cooldown;
pub mod embedded_messages;
pub mod music_manager;
pub mod pager;
pub mod queue_manager;
pub mod queue_service;
pub mod reaction_controls;
pub mod track_metadata;

/// Format a duration into a human-readable string (e.g., "3:45" or "1:23:45")
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(0, "0:00" ; "zero")]
    #[test_case(225, "3:45" ; "minutes")]
    #[test_case(5025, "1:23:45" ; "hours")]
    fn test_format_duration(seconds: u64, expected: &str) {
        assert_eq!(format_duration(Duration::from_secs(seconds)), expected);
    }
}
