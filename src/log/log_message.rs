//! Message payloads and their single-line normalization.

use serde::Serialize;
use serde_json::Value;

use crate::log::lossy_json::to_value_lossy;

/// Auxiliary placeholder values passed alongside a message.
pub type Context = serde_json::Map<String, Value>;

/// The payload of a log call: either free text or a structured value.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text(String),
    Structured(Value),
}

impl Message {
    /// Captures any serializable value as a structured message.
    ///
    /// Parts JSON cannot represent (e.g. a map with non-string keys) become
    /// `null`; the rest of the value is kept and the log call never fails.
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Self {
        Message::Structured(to_value_lossy(value))
    }

    /// Renders the message as exactly one physical line.
    ///
    /// Text has every `\r` and `\n` replaced by a single space. Structured values
    /// are written as compact JSON; serde_json leaves `/` and non-ASCII characters
    /// unescaped and escapes control characters, so the output never spans lines.
    #[must_use]
    pub fn normalize(&self) -> String {
        match self {
            Message::Text(text) => text.replace(['\r', '\n'], " "),
            Message::Structured(value) => encode_lossy(value),
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_owned())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl From<&String> for Message {
    fn from(text: &String) -> Self {
        Message::Text(text.clone())
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        Message::Structured(value)
    }
}

/// Raw bytes are decoded lossily: invalid UTF-8 becomes U+FFFD.
impl From<&[u8]> for Message {
    fn from(bytes: &[u8]) -> Self {
        Message::Text(String::from_utf8_lossy(bytes).into_owned())
    }
}

impl From<Vec<u8>> for Message {
    fn from(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Message::Text(text),
            Err(e) => Message::Text(String::from_utf8_lossy(e.as_bytes()).into_owned()),
        }
    }
}

/// Compact JSON that never aborts the caller.
///
/// Values that encode cleanly are written directly, keeping their field order.
/// Otherwise the unencodable parts are replaced by `null`.
pub fn encode_lossy<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .or_else(|_| serde_json::to_string(&to_value_lossy(value)))
        .unwrap_or_else(|_| String::from("null"))
}

/// Replaces `{key}` placeholders in `template` with values from `context`.
///
/// Keys may contain ASCII alphanumerics, `_` and `.`. Unknown keys and
/// malformed braces are left as written. Strings are inserted bare, `null`
/// as the empty string, everything else as compact JSON.
///
/// The logger never calls this on its own; callers opt in before logging.
#[must_use]
pub fn interpolate(template: &str, context: &Context) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}') {
            Some(close) if is_placeholder_key(&after[..close]) => {
                let key = &after[..close];
                match context.get(key) {
                    Some(value) => out.push_str(&render_value(value)),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_placeholder_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => encode_lossy(value),
    }
}
