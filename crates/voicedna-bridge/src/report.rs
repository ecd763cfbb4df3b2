//! Parsing of the JSON status line the engine prints on success.

use serde::{Deserialize, Serialize};

/// The engine's one-line JSON report, e.g.
/// `{"status":"ok","mode":"birth","child_id":"…","out":"…"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineReport {
    pub status: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub child_id: Option<String>,
    #[serde(default)]
    pub out: Option<String>,
    /// Every other field, as reported.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EngineReport {
    /// Returns the last line of `text` that parses as a report.
    ///
    /// Engines may log before the report, so earlier lines are ignored.
    pub fn parse(text: &str) -> Option<Self> {
        text.lines()
            .rev()
            .map(str::trim)
            .filter(|line| line.starts_with('{'))
            .find_map(|line| serde_json::from_str(line).ok())
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_birth_report() {
        let text = "loading parents\n{\"status\": \"ok\", \"mode\": \"birth\", \"child_id\": \"vdna-7f3a\", \"out\": \"kid.voicedna.enc\", \"randomness\": 10.0}\n";
        let report = EngineReport::parse(text).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.mode.as_deref(), Some("birth"));
        assert_eq!(report.child_id.as_deref(), Some("vdna-7f3a"));
        assert_eq!(report.out.as_deref(), Some("kid.voicedna.enc"));
        assert_eq!(report.extra["randomness"], serde_json::json!(10.0));
    }

    #[test]
    fn test_parse_plain_text_is_none() {
        assert_eq!(EngineReport::parse("synced"), None);
        assert_eq!(EngineReport::parse(""), None);
        assert_eq!(EngineReport::parse("{ broken"), None);
    }

    #[test]
    fn test_parse_prefers_last_report() {
        let text = "{\"status\":\"warming\"}\n{\"status\":\"ok\",\"mode\":\"process\"}";
        let report = EngineReport::parse(text).unwrap();
        assert_eq!(report.mode.as_deref(), Some("process"));
    }
}
