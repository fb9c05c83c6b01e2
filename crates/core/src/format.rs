//! Human-unit formatting for raw numeric and timestamp fields.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Render a nanosecond duration in the closest human unit.
pub fn format_duration_ns(ns: u64) -> String {
    if ns < 1_000 {
        format!("{} ns", ns)
    } else if ns < 1_000_000 {
        format!("{:.1} µs", ns as f64 / 1_000.0)
    } else if ns < 1_000_000_000 {
        format!("{:.1} ms", ns as f64 / 1_000_000.0)
    } else {
        format!("{:.2} s", ns as f64 / 1_000_000_000.0)
    }
}

/// Parse a processing-time field that may arrive as a JSON number or a
/// stringified integer (JSONB `->>` extraction yields text), or be absent.
pub fn parse_ns(raw: &Value) -> Option<u64> {
    match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Render an optional nanosecond duration; absent values show a dash.
pub fn format_duration_opt(raw: &Value) -> String {
    parse_ns(raw)
        .map(format_duration_ns)
        .unwrap_or_else(|| "—".to_string())
}

/// Relative "time ago" rendering for an ISO 8601 timestamp.
///
/// Unparsable or future timestamps render the raw input — a bad field must
/// not fail the page.
pub fn time_ago(iso: &str) -> String {
    time_ago_at(iso, Utc::now())
}

pub fn time_ago_at(iso: &str, now: DateTime<Utc>) -> String {
    let Ok(then) = iso.parse::<DateTime<Utc>>() else {
        return iso.to_string();
    };
    let secs = (now - then).num_seconds();
    if secs < 0 {
        return iso.to_string();
    }
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3_600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3_600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duration_buckets() {
        assert_eq!(format_duration_ns(999), "999 ns");
        assert_eq!(format_duration_ns(1_500), "1.5 µs");
        assert_eq!(format_duration_ns(2_500_000), "2.5 ms");
        assert_eq!(format_duration_ns(1_250_000_000), "1.25 s");
    }

    #[test]
    fn parse_ns_handles_both_wire_shapes() {
        assert_eq!(parse_ns(&json!(1234567)), Some(1_234_567));
        assert_eq!(parse_ns(&json!("1234567")), Some(1_234_567));
        assert_eq!(parse_ns(&json!(null)), None);
        assert_eq!(parse_ns(&json!("not-a-number")), None);
    }

    #[test]
    fn absent_duration_renders_dash() {
        assert_eq!(format_duration_opt(&json!(null)), "—");
        assert_eq!(format_duration_opt(&json!("2000000")), "2.0 ms");
    }

    #[test]
    fn time_ago_units() {
        let now = "2025-01-02T00:00:00Z".parse().unwrap();
        assert_eq!(time_ago_at("2025-01-01T23:59:30Z", now), "30s ago");
        assert_eq!(time_ago_at("2025-01-01T23:15:00Z", now), "45m ago");
        assert_eq!(time_ago_at("2025-01-01T12:00:00Z", now), "12h ago");
        assert_eq!(time_ago_at("2024-12-30T00:00:00Z", now), "3d ago");
    }

    #[test]
    fn bad_or_future_timestamps_render_raw() {
        let now = "2025-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(time_ago_at("garbage", now), "garbage");
        assert_eq!(
            time_ago_at("2025-06-01T00:00:00Z", now),
            "2025-06-01T00:00:00Z"
        );
    }
}
