//! Rich document tree → plain text
//!
//! Total over any JSON value. Display-only leaves render to a readable token, containers
//! recurse into `content`, and anything unrecognised without content yields `None`.
//!
//!     | type         | text                                                         |
//!     |--------------|--------------------------------------------------------------|
//!     | text         | `text` (default "")                                          |
//!     | hardBreak    | "\n"                                                         |
//!     | mention      | `attrs.text`, `"@" + attrs.id`, "@unknown"                   |
//!     | emoji        | `attrs.text`, `attrs.shortName`, ""                          |
//!     | date         | `attrs.timestamp` (ms epoch, UTC) as YYYY-MM-DD, else raw    |
//!     | status       | "[" + `attrs.text` + "]"                                     |
//!     | inlineCard   | `attrs.url`, `attrs.data.url`, `attrs.data.name`, ""         |
//!     | codeBlock    | fenced recursion of `content`                                |
//!     | other        | recursion into non-empty `content`, else None                |

use super::nodes::NodeType;
use chrono::{DateTime, Datelike};
use serde_json::Value;
use std::str::FromStr;

/// Extract plain text from a rich document value.
pub fn extract_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => join_non_empty(items),
        Value::Object(map) => {
            let node_type = map
                .get("type")
                .and_then(Value::as_str)
                .and_then(|t| NodeType::from_str(t).ok());
            let attrs = map.get("attrs");
            match node_type {
                Some(NodeType::Text) => Some(
                    map.get("text")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                ),
                Some(NodeType::HardBreak) => Some("\n".to_string()),
                Some(NodeType::Mention) => Some(mention(attrs)),
                Some(NodeType::Emoji) => Some(
                    attr_str(attrs, "text")
                        .or_else(|| attr_str(attrs, "shortName"))
                        .unwrap_or_default()
                        .to_string(),
                ),
                Some(NodeType::Date) => Some(date(attrs)),
                Some(NodeType::Status) => Some(format!(
                    "[{}]",
                    attr_str(attrs, "text").unwrap_or_default()
                )),
                Some(NodeType::InlineCard) => Some(inline_card(attrs)),
                Some(NodeType::CodeBlock) => {
                    let body = map.get("content").and_then(extract_text).unwrap_or_default();
                    Some(format!("```\n{body}\n```"))
                }
                _ => match map.get("content") {
                    Some(content) if is_truthy(content) => extract_text(content),
                    _ => None,
                },
            }
        }
        Value::Bool(_) | Value::Number(_) => None,
    }
}

fn join_non_empty(items: &[Value]) -> Option<String> {
    let parts: Vec<String> = items
        .iter()
        .filter_map(extract_text)
        .filter(|text| !text.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::String(s) => !s.is_empty(),
        Value::Number(_) => true,
    }
}

fn attr_str<'a>(attrs: Option<&'a Value>, key: &str) -> Option<&'a str> {
    attrs?.get(key)?.as_str().filter(|s| !s.is_empty())
}

fn mention(attrs: Option<&Value>) -> String {
    if let Some(text) = attr_str(attrs, "text") {
        return text.to_string();
    }
    match attrs.and_then(|a| a.get("id")) {
        Some(Value::String(id)) if !id.is_empty() => format!("@{id}"),
        Some(Value::Number(id)) => format!("@{id}"),
        _ => "@unknown".to_string(),
    }
}

fn inline_card(attrs: Option<&Value>) -> String {
    let data = attrs.and_then(|a| a.get("data"));
    attr_str(attrs, "url")
        .or_else(|| attr_str(data, "url"))
        .or_else(|| attr_str(data, "name"))
        .unwrap_or_default()
        .to_string()
}

fn date(attrs: Option<&Value>) -> String {
    let raw = match attrs.and_then(|a| a.get("timestamp")) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return String::new(),
    };
    match format_timestamp(&raw) {
        Some(formatted) => formatted,
        None => {
            log::debug!("unparseable date timestamp {raw:?}, keeping raw value");
            raw
        }
    }
}

/// Format a millisecond epoch timestamp as a UTC calendar date.
fn format_timestamp(raw: &str) -> Option<String> {
    let millis: i64 = match raw.trim().parse::<i64>() {
        Ok(millis) => millis,
        Err(_) => {
            let float = raw.trim().parse::<f64>().ok()?;
            if !float.is_finite() || float.abs() >= i64::MAX as f64 {
                return None;
            }
            float as i64
        }
    };
    let datetime = DateTime::from_timestamp(millis.div_euclid(1000), 0)?;
    if !(1..=9999).contains(&datetime.year()) {
        return None;
    }
    Some(datetime.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_and_scalars() {
        assert_eq!(extract_text(&Value::Null), None);
        assert_eq!(extract_text(&json!("x")), Some("x".to_string()));
        assert_eq!(extract_text(&json!("")), Some(String::new()));
        assert_eq!(extract_text(&json!(5)), None);
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(extract_text(&json!({})), None);
        assert_eq!(extract_text(&json!([])), None);
        assert_eq!(extract_text(&json!({"type": "paragraph", "content": []})), None);
    }

    #[test]
    fn test_paragraph_joins_children_with_newline() {
        let value = json!({
            "type": "paragraph",
            "content": [{"type": "text", "text": "Hello "}, {"type": "text", "text": "World"}]
        });
        assert_eq!(extract_text(&value), Some("Hello \nWorld".to_string()));
    }

    #[test]
    fn test_mention_fallbacks() {
        let text = json!({"type": "mention", "attrs": {"id": "1", "text": "@Ann"}});
        let id = json!({"type": "mention", "attrs": {"id": "1"}});
        let bare = json!({"type": "mention"});
        assert_eq!(extract_text(&text).as_deref(), Some("@Ann"));
        assert_eq!(extract_text(&id).as_deref(), Some("@1"));
        assert_eq!(extract_text(&bare).as_deref(), Some("@unknown"));
    }

    #[test]
    fn test_emoji_fallbacks() {
        let text = json!({"type": "emoji", "attrs": {"text": "😀", "shortName": ":grin:"}});
        let short = json!({"type": "emoji", "attrs": {"shortName": ":grin:"}});
        let bare = json!({"type": "emoji"});
        assert_eq!(extract_text(&text).as_deref(), Some("😀"));
        assert_eq!(extract_text(&short).as_deref(), Some(":grin:"));
        assert_eq!(extract_text(&bare).as_deref(), Some(""));
    }

    #[test]
    fn test_date() {
        let value = json!({"type": "date", "attrs": {"timestamp": "1582152559000"}});
        assert_eq!(extract_text(&value).as_deref(), Some("2020-02-19"));
        let numeric = json!({"type": "date", "attrs": {"timestamp": 1582152559000u64}});
        assert_eq!(extract_text(&numeric).as_deref(), Some("2020-02-19"));
    }

    #[test]
    fn test_date_out_of_range_returns_raw() {
        for raw in ["99999999999999999", "-99999999999999999999", "not-a-date", "1e400"] {
            let value = json!({"type": "date", "attrs": {"timestamp": raw}});
            assert_eq!(extract_text(&value).as_deref(), Some(raw));
        }
    }

    #[test]
    fn test_date_without_timestamp() {
        assert_eq!(extract_text(&json!({"type": "date"})).as_deref(), Some(""));
    }

    #[test]
    fn test_status_and_card() {
        assert_eq!(
            extract_text(&json!({"type": "status", "attrs": {"text": "DONE"}})).as_deref(),
            Some("[DONE]")
        );
        assert_eq!(extract_text(&json!({"type": "status"})).as_deref(), Some("[]"));
        let card = json!({"type": "inlineCard", "attrs": {"data": {"name": "Roadmap"}}});
        assert_eq!(extract_text(&card).as_deref(), Some("Roadmap"));
        let url = json!({"type": "inlineCard", "attrs": {"url": "https://x"}});
        assert_eq!(extract_text(&url).as_deref(), Some("https://x"));
    }

    #[test]
    fn test_code_block() {
        let value = json!({"type": "codeBlock", "content": [{"type": "text", "text": "x = 1"}]});
        assert_eq!(extract_text(&value).as_deref(), Some("```\nx = 1\n```"));
        let empty = json!({"type": "codeBlock"});
        assert_eq!(extract_text(&empty).as_deref(), Some("```\n\n```"));
    }

    #[test]
    fn test_unknown_type_recurses() {
        let value = json!({"type": "somethingNew", "content": [{"type": "text", "text": "in"}]});
        assert_eq!(extract_text(&value).as_deref(), Some("in"));
        assert_eq!(extract_text(&json!({"type": "somethingNew"})), None);
    }
}
