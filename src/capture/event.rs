//! Captured sub-operation events and their identifiers.

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Separator between nested group names in a [`TraceGroup`].
pub const GROUP_SEPARATOR: char = '>';

/// Correlation identifier scoping one call's trace.
///
/// `0` is reserved and means "no active session".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SessionId(pub u64);

impl SessionId {
    /// The "no active session" sentinel.
    pub const NONE: SessionId = SessionId(0);

    /// Returns true unless this is the [`SessionId::NONE`] sentinel.
    pub fn is_active(self) -> bool {
        self != Self::NONE
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hierarchical label for nested sub-operations, e.g. `tx>batch`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceGroup(String);

impl TraceGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns a child group nested under this one.
    pub fn nest(&self, name: &str) -> Self {
        let mut path = self.0.clone();
        if !path.is_empty() {
            path.push(GROUP_SEPARATOR);
        }
        path.push_str(name);
        Self(path)
    }

    /// The group path with leading and trailing separators trimmed.
    pub fn as_str(&self) -> &str {
        self.0.trim_matches(GROUP_SEPARATOR)
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl fmt::Display for TraceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TraceGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One captured sub-operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Formatted operation text (e.g. the SQL statement).
    #[serde(rename = "Query")]
    pub text: String,

    #[serde(rename = "Group")]
    pub group: TraceGroup,

    #[serde(rename = "Duration", serialize_with = "serialize_duration")]
    pub duration: Duration,
}

impl Event {
    pub fn new(text: impl Into<String>, group: TraceGroup, duration: Duration) -> Self {
        Self {
            text: text.into(),
            group,
            duration,
        }
    }
}

fn serialize_duration<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_duration(*d))
}

/// Formats a duration rounded to milliseconds, e.g. `12ms`, `1.5s`, `2m3.04s`.
pub fn format_duration(d: Duration) -> String {
    // round half up to whole milliseconds
    let ms = (d.as_nanos() + 500_000) / 1_000_000;
    if ms == 0 {
        return "0s".to_string();
    }
    if ms < 1_000 {
        return format!("{}ms", ms);
    }

    let secs = ms / 1_000;
    let frac = ms % 1_000;
    let (hours, minutes, seconds) = (secs / 3_600, (secs % 3_600) / 60, secs % 60);

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    out.push_str(&seconds.to_string());
    if frac > 0 {
        let digits = format!("{:03}", frac);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out.push('s');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_sentinel() {
        assert!(!SessionId::NONE.is_active());
        assert!(SessionId(1).is_active());
        assert_eq!(SessionId::default(), SessionId::NONE);
    }

    #[test]
    fn test_trace_group_nesting() {
        let group = TraceGroup::default().nest("tx").nest("batch");
        assert_eq!(group.as_str(), "tx>batch");

        let padded = TraceGroup::new(">tx>");
        assert_eq!(padded.as_str(), "tx");
        assert!(TraceGroup::new(">>").is_empty());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_micros(400)), "0s");
        assert_eq!(format_duration(Duration::from_micros(1_600)), "2ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_millis(1_500)), "1.5s");
        assert_eq!(format_duration(Duration::from_millis(123_040)), "2m3.04s");
        assert_eq!(format_duration(Duration::from_secs(3_600)), "1h0m0s");
    }

    #[test]
    fn test_event_json_shape() {
        let event = Event::new(
            "SELECT 1",
            TraceGroup::new("tx>"),
            Duration::from_millis(12),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Query": "SELECT 1", "Group": "tx", "Duration": "12ms"})
        );
    }
}
