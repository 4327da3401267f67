//! Response Interpreter.
//!
//! Provider replies are untrusted text that is usually, but not always, the
//! JSON object the prompt asked for. Parsing degrades through four steps:
//! the largest brace-delimited substring as JSON, the same substring after
//! repair, a `"narration":` string salvaged by hand, and finally the raw
//! text itself.

use serde_json::Value;
use tracing::debug;

/// Narration used when a reply yields no usable text at all.
pub const FALLBACK_NARRATION: &str =
    "The world holds its breath for a moment, then your journey continues.";

/// The structured reply the prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredReply {
    /// Narration text; never empty.
    pub narration: String,
    /// Suggested next actions.
    pub suggested_actions: Option<Vec<String>>,
    /// Name of an enemy that starts a fight.
    pub enemy: Option<String>,
}

/// How much of the reply could be understood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A valid structured reply.
    Structured(StructuredReply),
    /// Only the narration string could be salvaged.
    HeuristicText(String),
    /// Nothing structured; the trimmed raw text.
    RawText(String),
}

impl ParseOutcome {
    /// The narration text of any outcome.
    #[must_use]
    pub fn narration(&self) -> &str {
        match self {
            Self::Structured(reply) => &reply.narration,
            Self::HeuristicText(text) | Self::RawText(text) => text,
        }
    }

    /// Suggested actions, only present in structured replies.
    #[must_use]
    pub fn suggested_actions(&self) -> Option<&[String]> {
        match self {
            Self::Structured(reply) => reply.suggested_actions.as_deref(),
            _ => None,
        }
    }

    /// Combat-start signal, only present in structured replies.
    #[must_use]
    pub fn combat_start(&self) -> Option<&str> {
        match self {
            Self::Structured(reply) => reply.enemy.as_deref(),
            _ => None,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Structured(_) => "structured",
            Self::HeuristicText(_) => "heuristic",
            Self::RawText(_) => "raw",
        }
    }
}

/// The substring from the first `{` to the last `}`.
fn largest_braced(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Replaces line breaks with spaces and drops trailing commas before a
/// closing brace or bracket. String contents keep their commas.
fn repair(candidate: &str) -> String {
    let flat: Vec<char> = candidate
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let mut repaired = String::with_capacity(flat.len());
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in flat.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *c == '\\' {
                escaped = true;
            } else if *c == '"' {
                in_string = false;
            }
        } else if *c == '"' {
            in_string = true;
        } else if *c == ',' {
            let next = flat[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        repaired.push(*c);
    }
    repaired
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim(),
        Value::Object(map) => map.get("name")?.as_str()?.trim(),
        _ => return None,
    };
    (!text.is_empty()).then(|| text.to_owned())
}

fn structured(value: &Value) -> Option<StructuredReply> {
    let object = value.as_object()?;
    let narration = object.get("narration")?.as_str()?.trim();
    if narration.is_empty() {
        return None;
    }
    let suggested_actions = object
        .get("suggested_actions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .filter(|actions| !actions.is_empty());
    let enemy = non_blank(object.get("enemy")).or_else(|| non_blank(object.get("combat_start")));
    Some(StructuredReply {
        narration: narration.to_owned(),
        suggested_actions,
        enemy,
    })
}

fn parse_structured(candidate: &str) -> Option<StructuredReply> {
    serde_json::from_str::<Value>(candidate)
        .ok()
        .as_ref()
        .and_then(structured)
}

/// Reads the JSON string value that follows `"narration":`.
fn salvage_narration(text: &str) -> Option<String> {
    let key = text.find("\"narration\"")?;
    let rest = text[key + "\"narration\"".len()..].trim_start();
    let rest = rest.strip_prefix(':')?.trim_start();
    let mut chars = rest.strip_prefix('"')?.chars();

    let mut value = String::new();
    while let Some(c) = chars.next() {
        match c {
            '"' => break,
            '\\' => match chars.next()? {
                'n' => value.push('\n'),
                't' => value.push('\t'),
                'r' => {}
                'u' => {
                    let hex: String = chars.by_ref().take(4).collect();
                    let decoded = u32::from_str_radix(&hex, 16)
                        .ok()
                        .and_then(char::from_u32)
                        .unwrap_or('\u{fffd}');
                    value.push(decoded);
                }
                other => value.push(other),
            },
            other => value.push(other),
        }
    }

    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// Interprets a raw provider reply.
#[must_use]
pub fn interpret(raw: &str) -> ParseOutcome {
    let trimmed = raw.trim();

    if let Some(candidate) = largest_braced(trimmed) {
        if let Some(reply) = parse_structured(candidate) {
            return ParseOutcome::Structured(reply);
        }
        if let Some(reply) = parse_structured(&repair(candidate)) {
            return ParseOutcome::Structured(reply);
        }
    }

    if let Some(text) = salvage_narration(trimmed) {
        debug!("reply was not valid JSON, salvaged the narration field");
        return ParseOutcome::HeuristicText(text);
    }

    debug!(length = trimmed.len(), "reply used as raw narration");
    ParseOutcome::RawText(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"narration": "The door creaks open.", "suggested_actions": ["Enter", "Listen"], "enemy": null}"#;

    #[test]
    fn test_plain_payload_is_structured() {
        let outcome = interpret(PAYLOAD);

        match outcome {
            ParseOutcome::Structured(reply) => {
                assert_eq!(reply.narration, "The door creaks open.");
                assert_eq!(
                    reply.suggested_actions,
                    Some(vec!["Enter".to_owned(), "Listen".to_owned()])
                );
                assert_eq!(reply.enemy, None);
            }
            other => panic!("expected Structured, got {other:?}"),
        }
    }

    #[test]
    fn test_wrapped_payload_parses_to_same_narration() {
        let wrapped = format!("Sure! Here you go:\n```json\n{PAYLOAD}\n```\nEnjoy.");

        let plain = interpret(PAYLOAD);
        let outcome = interpret(&wrapped);

        assert_eq!(outcome, plain);
    }

    #[test]
    fn test_trailing_commas_and_newlines_are_repaired() {
        let broken = "{\"narration\": \"Rain falls\non the tower.\",\n \"suggested_actions\": [\"Wait\",],\n}";

        let outcome = interpret(broken);

        assert_eq!(outcome.label(), "structured");
        assert_eq!(outcome.narration(), "Rain falls on the tower.");
        assert_eq!(outcome.suggested_actions(), Some(&["Wait".to_owned()][..]));
    }

    #[test]
    fn test_repair_keeps_commas_inside_strings() {
        let broken = r#"{"narration": "The sign reads \"left, }\" in chalk.", "suggested_actions": ["Read it",],}"#;

        let outcome = interpret(broken);

        assert_eq!(outcome.label(), "structured");
        assert_eq!(outcome.narration(), r#"The sign reads "left, }" in chalk."#);
        assert_eq!(outcome.suggested_actions(), Some(&["Read it".to_owned()][..]));
    }

    #[test]
    fn test_combat_start_alias_and_object_form() {
        let alias = interpret(r#"{"narration": "A growl.", "combat_start": "Ash Wolf"}"#);
        let object = interpret(r#"{"narration": "A growl.", "enemy": {"name": " Ash Wolf "}}"#);
        let blank = interpret(r#"{"narration": "A growl.", "enemy": "  "}"#);

        assert_eq!(alias.combat_start(), Some("Ash Wolf"));
        assert_eq!(object.combat_start(), Some("Ash Wolf"));
        assert_eq!(blank.combat_start(), None);
    }

    #[test]
    fn test_empty_narration_is_not_structured() {
        let outcome = interpret(r#"{"narration": "   ", "suggested_actions": []}"#);

        assert!(matches!(outcome, ParseOutcome::RawText(_)));
    }

    #[test]
    fn test_heuristic_extraction_honours_escapes() {
        let truncated = r#"{"narration": "She says \"run!\"\nThen silence.", "suggested_actions": ["#;

        let outcome = interpret(truncated);

        assert_eq!(
            outcome,
            ParseOutcome::HeuristicText("She says \"run!\"\nThen silence.".to_owned())
        );
        assert_eq!(outcome.suggested_actions(), None);
    }

    #[test]
    fn test_plain_prose_is_raw_text() {
        let outcome = interpret("  The wind howls across the dunes.  ");

        assert_eq!(
            outcome,
            ParseOutcome::RawText("The wind howls across the dunes.".to_owned())
        );
    }

    #[test]
    fn test_blank_reply_is_empty_raw_text() {
        assert_eq!(interpret(" \n ").narration(), "");
    }
}
