//! Timing side-channel attached to RPC responses.

use serde::Serialize;

use crate::capture::event::Event;

/// `DurationLocal` value that disables local-duration reporting.
pub const DURATION_LOCAL_SUPPRESSED: i64 = -1;

/// Diagnostic timings written into a response's `extensions` field.
///
/// Durations are whole milliseconds. The block is optional and
/// non-normative: a response without it means tracing was disabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimingExtensions {
    /// Time spent in this service, excluding remote and diff durations.
    #[serde(rename = "DurationLocal", skip_serializing_if = "Option::is_none")]
    pub duration_local: Option<i64>,

    /// Time reported by a delegated remote call.
    #[serde(rename = "DurationRemote", skip_serializing_if = "Option::is_none")]
    pub duration_remote: Option<i64>,

    /// Externally reported time to exclude from the local figure.
    #[serde(rename = "DurationDiff", skip_serializing_if = "Option::is_none")]
    pub duration_diff: Option<i64>,

    /// Captured events, only when full query text may be exposed.
    #[serde(rename = "SQL", skip_serializing_if = "Option::is_none")]
    pub sql: Option<Vec<Event>>,

    /// Sum of captured event durations.
    #[serde(rename = "DurationSQL", skip_serializing_if = "Option::is_none")]
    pub duration_sql: Option<i64>,
}

impl TimingExtensions {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Disables `DurationLocal` reporting for this response.
    pub fn suppress_local(&mut self) {
        self.duration_local = Some(DURATION_LOCAL_SUPPRESSED);
    }

    pub fn is_local_suppressed(&self) -> bool {
        self.duration_local == Some(DURATION_LOCAL_SUPPRESSED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::event::TraceGroup;
    use std::time::Duration;

    #[test]
    fn test_empty_serializes_to_empty_object() {
        let ext = TimingExtensions::default();
        assert!(ext.is_empty());
        assert_eq!(serde_json::to_string(&ext).unwrap(), "{}");
    }

    #[test]
    fn test_field_names() {
        let ext = TimingExtensions {
            duration_local: Some(5),
            duration_remote: Some(40),
            duration_diff: None,
            sql: Some(vec![Event::new(
                "SELECT 1",
                TraceGroup::default(),
                Duration::from_millis(3),
            )]),
            duration_sql: Some(3),
        };
        let json = serde_json::to_string(&ext).unwrap();
        assert_eq!(
            json,
            r#"{"DurationLocal":5,"DurationRemote":40,"SQL":[{"Query":"SELECT 1","Group":"","Duration":"3ms"}],"DurationSQL":3}"#
        );
    }

    #[test]
    fn test_suppress_local() {
        let mut ext = TimingExtensions::default();
        assert!(!ext.is_local_suppressed());
        ext.suppress_local();
        assert!(ext.is_local_suppressed());
        assert!(!ext.is_empty());
    }
}
