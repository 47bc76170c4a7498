//! Extraction of user input and delivery settings from request params
//!
//! `message/send` params follow the A2A shape:
//!
//! ```json
//! { "message": { "parts": [{ "kind": "text", "text": "..." }], "messageId": "m-1" },
//!   "configuration": { "blocking": false,
//!                      "pushNotificationConfig": { "url": "...", "token": "..." } } }
//! ```
//!
//! Everything is read leniently from a `serde_json::Value`; clients send
//! extra fields, odd types and HTML fragments.

use std::sync::OnceLock;
use log::debug;
use regex::Regex;
use serde_json::Value;
use crate::{DeliveryConfig, WebhookTarget};

/// Input used when a `message/send` carries no usable text.
pub const DEFAULT_INPUT: &str = "Give me motivation";

const FILLER: &[&str] =
  &["ok", "okay", "more", "yes", "no", "thanks", "thank you", "continue"];

/// What the dispatcher needs out of a `message/send` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope
{   pub user_input: String
  , pub message_id: Option<String>
  , pub delivery: DeliveryConfig
}

/// Parse `message/send` params. Never fails: missing pieces take
/// their defaults.
pub fn parse_message_send(params: &Value) -> Envelope
{   let message = params.get("message");

    let parts = message
      .and_then(|m| m.get("parts"))
      .and_then(Value::as_array)
      .map(Vec::as_slice)
      .unwrap_or(&[]);

    let user_input = select_input(parts)
      .or_else(|| flat_input(params))
      .unwrap_or_else(|| {
        debug!("No usable text in envelope; using default input");
        DEFAULT_INPUT.to_string()
      });

    let message_id = message
      .and_then(|m| m.get("messageId"))
      .and_then(id_string);

    Envelope
    {   user_input
      , message_id
      , delivery: parse_delivery(params.get("configuration"))
    }
}

/// Parse `motivate` params: `input`, `message`, or the first positional
/// argument.
pub fn parse_motivate(params: &Value)
  -> Result<String, crate::error::Error>
{   let raw = match params
    {   Value::Object(map) => map
          .get("input")
          .filter(|v| !is_blank(v))
          .or_else(|| map.get("message"))
      , Value::Array(items) => items.first()
      , _ => None
    };

    match raw
    {   None => Err(crate::error::Error::InvalidParams(
          "'input' or 'message' is required".to_string()
        ))
      , Some(v) if is_blank(v) => Err(crate::error::Error::InvalidParams(
          "'input' or 'message' is required".to_string()
        ))
      , Some(Value::String(s)) => Ok(s.clone())
      , Some(_) => Err(crate::error::Error::InvalidInput(
          "user_input must be a non-empty string".to_string()
        ))
    }
}

/// Longest cleaned text part, ties to the earliest.
pub fn select_input(parts: &[Value]) -> Option<String>
{   parts
      .iter()
      .filter(|p| p.get("kind").and_then(Value::as_str) == Some("text"))
      .filter_map(|p| p.get("text").and_then(Value::as_str))
      .filter(|t| !t.trim().is_empty())
      .map(clean_text)
      .filter(|t| !t.is_empty() && !is_filler(t))
      .fold(None, |best: Option<String>, candidate| match best
      {   Some(b) if b.chars().count() >= candidate.chars().count() => {
            Some(b)
          }
        , _ => Some(candidate)
      })
}

/// Remove HTML-like tags and collapse whitespace.
pub fn clean_text(raw: &str) -> String
{   tag_pattern()
      .replace_all(raw, " ")
      .split_whitespace()
      .collect::<Vec<_>>()
      .join(" ")
}

/// Bare acknowledgements that carry no request.
pub fn is_filler(text: &str) -> bool
{   let word = text
      .trim_end_matches(|c: char| c.is_ascii_punctuation())
      .trim()
      .to_lowercase();
    FILLER.contains(&word.as_str())
}

/// Blocking flag and push target from `configuration`.
pub fn parse_delivery(configuration: Option<&Value>) -> DeliveryConfig
{   let Some(configuration) = configuration else {
      return DeliveryConfig::default();
    };

    let blocking = configuration
      .get("blocking")
      .and_then(Value::as_bool)
      .unwrap_or(true);

    let webhook = configuration
      .get("pushNotificationConfig")
      .and_then(|push| {
        let url = non_empty_str(push.get("url"))?;
        let token = non_empty_str(push.get("token"))?;
        Some(WebhookTarget { url, token })
      });

    DeliveryConfig { blocking, webhook }
}

fn flat_input(params: &Value) -> Option<String>
{   ["input", "message"]
      .iter()
      .filter_map(|key| params.get(*key).and_then(Value::as_str))
      .map(clean_text)
      .find(|t| !t.is_empty())
}

fn id_string(value: &Value) -> Option<String>
{   match value
    {   Value::String(s) if !s.trim().is_empty() => Some(s.clone())
      , Value::Number(n) => Some(n.to_string())
      , _ => None
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String>
{   value
      .and_then(Value::as_str)
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_string)
}

/// Absent-like values: null, blank strings, `false`, zero, and empty
/// collections.
fn is_blank(value: &Value) -> bool
{   match value
    {   Value::Null => true
      , Value::Bool(b) => !b
      , Value::Number(n) => n.as_f64() == Some(0.0)
      , Value::String(s) => s.trim().is_empty()
      , Value::Array(items) => items.is_empty()
      , Value::Object(map) => map.is_empty()
    }
}

fn tag_pattern() -> &'static Regex
{   static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
      Regex::new(r"</?[A-Za-z][A-Za-z0-9-]*(?:\s[^>]*)?/?>")
        .expect("tag pattern is valid")
    })
}
