//! Run records as read from the collected corpus.
//!
//! A run keeps its full JSON object so grouping attributes can be looked up by
//! dotted path (`demographics.language`, `meta.site`, ...). The response log
//! and the composite ability are extracted once at load time.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use serde_json::Value;

/// Scoring state of a single response event.
///
/// JSON `true`/`false` map to `Correct`/`Incorrect`. Anything else, including
/// `null` or a missing field, is `Unscored` and never counts as incorrect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    Correct,
    Incorrect,
    #[default]
    Unscored,
}

impl Outcome {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Bool(true) => Outcome::Correct,
            Value::Bool(false) => Outcome::Incorrect,
            _ => Outcome::Unscored,
        }
    }

    pub fn is_correct(self) -> bool {
        matches!(self, Outcome::Correct)
    }

    /// `1` for correct, `0` for incorrect, `None` when unscored.
    pub fn as_binary(self) -> Option<u8> {
        match self {
            Outcome::Correct => Some(1),
            Outcome::Incorrect => Some(0),
            Outcome::Unscored => None,
        }
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Outcome::from_json(&value))
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Correct => serializer.serialize_bool(true),
            Outcome::Incorrect => serializer.serialize_bool(false),
            Outcome::Unscored => serializer.serialize_none(),
        }
    }
}

/// One logged item response.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEvent {
    pub item_id: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub correct: Outcome,
}

impl ResponseEvent {
    pub fn in_domain(&self, domain: &str) -> bool {
        self.domain.as_deref() == Some(domain)
    }
}

/// One completed assessment attempt.
#[derive(Debug, Clone)]
pub struct Run {
    pub log: Vec<ResponseEvent>,
    pub composite_theta: Option<f64>,
    raw: Value,
}

impl Run {
    /// Build a run from a parsed JSON document.
    ///
    /// Returns `None` for non-object documents. Log entries that do not parse
    /// (e.g. missing or non-string `itemId`) are dropped individually.
    pub fn from_value(raw: Value) -> Option<Self> {
        if !raw.is_object() {
            return None;
        }

        let log = raw
            .get("log")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| serde_json::from_value::<ResponseEvent>(entry.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        let composite_theta = lookup_path(&raw, "summary.composite.theta").and_then(Value::as_f64);

        Some(Self {
            log,
            composite_theta,
            raw,
        })
    }

    /// Dotted-path attribute lookup (`a.b.c`). `null` counts as missing.
    pub fn attribute(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.raw, path).filter(|v| !v.is_null())
    }

    /// Attribute rendered as a group label.
    ///
    /// Strings are used verbatim; other scalars use their JSON text.
    pub fn label(&self, path: &str) -> Option<String> {
        self.attribute(path).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Number of correct events in `domain`.
    pub fn domain_score(&self, domain: &str) -> u32 {
        self.log
            .iter()
            .filter(|e| e.in_domain(domain) && e.correct.is_correct())
            .count() as u32
    }
}

fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |cur, part| cur.as_object().and_then(|map| map.get(part)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_is_tri_state() {
        let run = Run::from_value(json!({
            "log": [
                {"itemId": "q1", "domain": "math", "correct": true},
                {"itemId": "q2", "domain": "math", "correct": false},
                {"itemId": "q3", "domain": "math", "correct": null},
                {"itemId": "q4", "domain": "math"},
                {"itemId": "q5", "domain": "math", "correct": 1}
            ]
        }))
        .unwrap();

        let outcomes: Vec<Outcome> = run.log.iter().map(|e| e.correct).collect();
        assert_eq!(
            outcomes,
            vec![
                Outcome::Correct,
                Outcome::Incorrect,
                Outcome::Unscored,
                Outcome::Unscored,
                Outcome::Unscored
            ]
        );
        assert_eq!(run.domain_score("math"), 1);
    }

    #[test]
    fn malformed_log_entries_are_dropped() {
        let run = Run::from_value(json!({
            "log": [
                {"itemId": 7, "domain": "math", "correct": true},
                "not an event",
                {"domain": "math", "correct": true},
                {"itemId": "ok", "domain": "math", "correct": true}
            ]
        }))
        .unwrap();
        assert_eq!(run.log.len(), 1);
        assert_eq!(run.log[0].item_id, "ok");
    }

    #[test]
    fn dotted_path_lookup() {
        let run = Run::from_value(json!({
            "demographics": {"language": "en", "ageBandId": null, "cohort": 3},
            "flag": true,
            "summary": {"composite": {"theta": 0.25}}
        }))
        .unwrap();

        assert_eq!(run.label("demographics.language").as_deref(), Some("en"));
        assert_eq!(run.label("demographics.cohort").as_deref(), Some("3"));
        assert_eq!(run.label("flag").as_deref(), Some("true"));
        assert!(run.label("demographics.ageBandId").is_none());
        assert!(run.label("demographics.language.extra").is_none());
        assert!(run.label("missing").is_none());
        assert_eq!(run.composite_theta, Some(0.25));
    }

    #[test]
    fn non_object_documents_are_rejected() {
        assert!(Run::from_value(json!([1, 2, 3])).is_none());
        assert!(Run::from_value(json!("run")).is_none());
    }
}
