//! Parsing of individual server-sent event lines.

use serde_json::Value;

/// Prefix marking an SSE data line.
pub const DATA_PREFIX: &str = "data: ";

/// Payload that terminates a stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// What a single framed line means to the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamRecord {
    /// A text fragment to append to the response.
    Content(String),
    /// The end-of-stream sentinel.
    Done,
    /// The server reported an error instead of content.
    ServerError(String),
    /// A data line whose payload is not valid JSON.
    Malformed { payload: String, reason: String },
    /// Anything that carries no content: blank lines, comments, other
    /// SSE fields, payloads without a `content` field.
    Ignored,
}

impl StreamRecord {
    /// Interpret one line (without its terminator).
    pub fn parse(line: &str) -> Self {
        let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
            return StreamRecord::Ignored;
        };
        if payload == DONE_SENTINEL {
            return StreamRecord::Done;
        }

        let value: Value = match serde_json::from_str(payload) {
            Ok(value) => value,
            Err(e) => {
                return StreamRecord::Malformed {
                    payload: payload.to_string(),
                    reason: e.to_string(),
                };
            }
        };

        match value.get("content").and_then(Value::as_str) {
            Some(content) if !content.is_empty() => StreamRecord::Content(content.to_string()),
            Some(_) => StreamRecord::Ignored,
            None => match value.get("error") {
                Some(Value::String(message)) => StreamRecord::ServerError(message.clone()),
                Some(other) if !other.is_null() => StreamRecord::ServerError(other.to_string()),
                _ => StreamRecord::Ignored,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_line() {
        assert_eq!(
            StreamRecord::parse(r#"data: {"content":"Hel"}"#),
            StreamRecord::Content("Hel".to_string())
        );
    }

    #[test]
    fn done_sentinel() {
        assert_eq!(StreamRecord::parse("data: [DONE]"), StreamRecord::Done);
    }

    #[test]
    fn non_data_lines_are_ignored() {
        assert_eq!(StreamRecord::parse(""), StreamRecord::Ignored);
        assert_eq!(StreamRecord::parse(": keep-alive"), StreamRecord::Ignored);
        assert_eq!(StreamRecord::parse("event: message"), StreamRecord::Ignored);
        assert_eq!(StreamRecord::parse("data:[DONE]"), StreamRecord::Ignored);
    }

    #[test]
    fn invalid_json_is_malformed() {
        match StreamRecord::parse("data: not-json") {
            StreamRecord::Malformed { payload, .. } => assert_eq!(payload, "not-json"),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn payload_without_content_is_ignored() {
        assert_eq!(StreamRecord::parse(r#"data: {"role":"assistant"}"#), StreamRecord::Ignored);
        assert_eq!(StreamRecord::parse(r#"data: {"content":""}"#), StreamRecord::Ignored);
        assert_eq!(StreamRecord::parse("data: 42"), StreamRecord::Ignored);
    }

    #[test]
    fn error_payload() {
        assert_eq!(
            StreamRecord::parse(r#"data: {"error":"model overloaded"}"#),
            StreamRecord::ServerError("model overloaded".to_string())
        );
    }

    #[test]
    fn content_wins_over_error() {
        assert_eq!(
            StreamRecord::parse(r#"data: {"content":"x","error":"ignored"}"#),
            StreamRecord::Content("x".to_string())
        );
    }
}
