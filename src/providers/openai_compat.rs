use std::sync::OnceLock;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};
use regex::Regex;

const MAX_SUGGESTIONS: usize = 3;
const MAX_TOKENS: usize = 300;
const TEMPERATURE: f32 = 0.9;

pub const SYSTEM_PROMPT: &str = "\
You are Motivo AI, a compassionate and energetic motivational coach.
Your role is to provide personalized, uplifting, and actionable motivation.

Guidelines:
- Keep responses concise (1-3 sentences each)
- Be empathetic and understanding
- Include practical advice when appropriate
- Use encouraging language and positive affirmations
- Add relevant emojis to make messages more engaging (📚 🧘 ✨ 💪 🎯 ⭐ 🌟 🔥 💡)
- Focus on growth mindset and resilience
- Personalize based on the user's specific concern

Return ONLY a JSON array with exactly 3 motivational strings. Example format:
[\"Motivation 1 with emoji 💪\", \"Motivation 2 with emoji ✨\", \"Motivation 3 with emoji 🎯\"]";

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse
{   #[serde(default)]
    pub choices: Vec<Choice>
}

/// Chat choices carry `message.content`; legacy completions carry `text`.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   #[serde(default)]
    pub message: Option<ChoiceMessage>
  , #[serde(default)]
    pub text: Option<String>
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage
{   #[serde(default)]
    pub content: Option<String>
}

// ===== Client =====

/// Client for any OpenAI-compatible chat completion API
/// (OpenRouter, Groq, a local vLLM, ...).
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient
{   config: crate::config::RemoteConfig
  , http_client: reqwest::Client
}

impl OpenAiCompatClient
{   pub fn new(
      config: crate::config::RemoteConfig
    , timeout: Duration
    ) -> Result<Self, crate::error::Error>
    {   debug!("Creating OpenAiCompatClient for {}", config.base_url);
        let http_client = reqwest::Client::builder()
          .timeout(timeout)
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;
        Ok(OpenAiCompatClient
        {   config
          , http_client
        })
    }

    pub fn model(&self) -> &str
    {   &self.config.model
    }

    /// Ask the model for up to three suggestions for `user_input`.
    pub async fn suggest(&self, user_input: &str)
      -> Result<Vec<String>, crate::error::Error>
    {   let reply = self.complete(user_input).await?;
        parse_suggestions(&reply)
    }

    /// Single chat completion round trip; returns the reply text.
    pub async fn complete(&self, user_input: &str)
      -> Result<String, crate::error::Error>
    {   debug!("Requesting completion from model: {}", self.config.model);

        let request = ChatRequest
        {   model: self.config.model.clone()
          , messages: vec![
              ChatMessage
              {   role: "system".to_string()
                , content: SYSTEM_PROMPT.to_string()
              }
            , ChatMessage
              {   role: "user".to_string()
                , content: user_input.to_string()
              }
            ]
          , max_tokens: Some(MAX_TOKENS)
          , temperature: Some(TEMPERATURE)
        };

        trace!("Chat request: {:?}", request);

        let response = self.http_client
          .post(self.config.completions_url())
          .header("Authorization", format!("Bearer {}", self.config.api_key))
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            crate::error::Error::from(e)
          })?;

        let status = response.status();
        trace!("Chat response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Chat API error ({}): {}", status, error_text);
            return Err(crate::error::Error::ApiError(
              format!("status {}: {}", status, error_text)
            ));
        }

        let body: serde_json::Value
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;

        reply_text(&body)
    }
}

/// Pull the reply text out of a chat completion body.
///
/// Falls back to the serialized body when no choice carries text, so
/// the suggestion parser still gets a chance at it.
pub fn reply_text(body: &serde_json::Value)
  -> Result<String, crate::error::Error>
{   let content = serde_json::from_value::<ChatResponse>(body.clone())
      .ok()
      .and_then(|r| r.choices.into_iter().next())
      .and_then(|c| {
        c.message
          .and_then(|m| m.content)
          .filter(|s| !s.trim().is_empty())
          .or(c.text)
      })
      .filter(|s| !s.trim().is_empty());

    match content
    {   Some(text) => Ok(text)
      , None if body.is_object() => {
          debug!("No choice content; parsing raw response body");
          Ok(body.to_string())
        }
      , None => {
          error!("No choices in response");
          Err(crate::error::Error::NoChoicesInResponse)
        }
    }
}

/// Turn free-form model output into at most three suggestions.
///
/// The first well-formed JSON array in the text wins; otherwise the
/// non-empty lines with enumeration markers removed are used.
pub fn parse_suggestions(reply: &str)
  -> Result<Vec<String>, crate::error::Error>
{   let from_array = first_json_array(reply)
      .map(|items| {
        items
          .into_iter()
          .map(|item| match item
          {   serde_json::Value::String(s) => s
            , other => other.to_string()
          })
          .map(|s| s.trim().to_string())
          .filter(|s| !s.is_empty())
          .take(MAX_SUGGESTIONS)
          .collect::<Vec<_>>()
      })
      .unwrap_or_default();

    if !from_array.is_empty()
    {   return Ok(from_array);
    }

    debug!("No JSON array in model reply; splitting into lines");
    let marker = enumeration_marker();
    let from_lines: Vec<String> = reply
      .lines()
      .map(|line| marker.replace(line, "").trim().to_string())
      .filter(|line| !line.is_empty())
      .take(MAX_SUGGESTIONS)
      .collect();

    if from_lines.is_empty()
    {   error!("Model returned no usable suggestions");
        return Err(crate::error::Error::NoSuggestions);
    }
    Ok(from_lines)
}

fn first_json_array(text: &str) -> Option<Vec<serde_json::Value>>
{   text
      .match_indices('[')
      .find_map(|(start, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[start..])
          .into_iter::<Vec<serde_json::Value>>();
        stream.next().and_then(Result::ok)
      })
}

fn enumeration_marker() -> &'static Regex
{   static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
      Regex::new(r"^\s*(?:\d+[).:\-]?|[-*•])\s*")
        .expect("enumeration marker pattern is valid")
    })
}
