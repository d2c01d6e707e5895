//! Display helpers shared by the UI and the log mirror.

use chrono::{DateTime, Local, Utc};
use serde_json::Value;

/// `HH:MM:SS.mmm` in local time.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S%.3f").to_string()
}

/// Compact uptime: `2h 5m`, `3m 12s` or `42s`.
pub fn format_uptime(elapsed: chrono::Duration) -> String {
    let seconds = elapsed.num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}

pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Split a comma-separated event list, trimming whitespace and dropping
/// empty entries.
pub fn parse_event_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn uptime_buckets() {
        assert_eq!(format_uptime(chrono::Duration::seconds(42)), "42s");
        assert_eq!(format_uptime(chrono::Duration::seconds(192)), "3m 12s");
        assert_eq!(format_uptime(chrono::Duration::seconds(7500)), "2h 5m");
        assert_eq!(format_uptime(chrono::Duration::seconds(-5)), "0s");
    }

    #[test]
    fn event_list_is_trimmed() {
        assert_eq!(
            parse_event_list(" .MessageSent ,  OrderShipped,, "),
            vec![".MessageSent".to_string(), "OrderShipped".to_string()]
        );
        assert!(parse_event_list("   ").is_empty());
    }

    #[test]
    fn json_is_pretty_printed() {
        assert_eq!(format_json(&json!({ "a": 1 })), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn timestamp_has_millisecond_precision() {
        let ts = Utc::now();
        let formatted = format_timestamp(&ts);
        assert_eq!(formatted.len(), "00:00:00.000".len());
        assert_eq!(&formatted[8..9], ".");
    }
}
