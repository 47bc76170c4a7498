pub mod error;
pub mod config;
pub mod providers;
pub mod rules;
pub mod failover;
pub mod envelope;
pub mod request;
pub mod webhook;
pub mod dispatch;
pub mod server;
use serde::{Deserialize, Serialize};

/*

motivo is a small JSON-RPC agent: it takes a user's text, derives up
to three motivational messages (remote OpenAI-compatible model first,
local keyword rules when that is unavailable) and hands them back in
the HTTP response, plus through a caller supplied webhook when the
request asks for non-blocking delivery.

motivo/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Shared data model
│   ├── main.rs         # Process entry: logging, config, listener
│   ├── error.rs        # Error type and JSON-RPC code mapping
│   ├── config.rs       # Environment driven configuration
│   ├── providers/      # Remote generation clients
│   │   ├── mod.rs
│   │   └── openai_compat.rs
│   ├── rules.rs        # Local keyword templates
│   ├── failover.rs     # Remote-then-local selection
│   ├── envelope.rs     # message/send and motivate param parsing
│   ├── request.rs      # JSON-RPC wire types
│   ├── webhook.rs      # Push notification delivery task
│   ├── dispatch.rs     # Parse -> Generate -> Deliver
│   └── server.rs       # axum router
└── tests/

*/

/// MOTIVO STRUCTURES:

// ===== Generation =====

/// Where a set of suggestions came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Source
{   /// OpenAI-compatible chat completion endpoint
    Remote
  , /// Built-in keyword templates
    Local
}

/// Output of the suggestion generator: 1..=3 non-empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenerationResult
{   #[serde(rename = "motivations")]
    pub suggestions: Vec<String>
  , pub source: Source
}

// ===== Delivery =====

/// Caller supplied push notification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WebhookTarget
{   pub url: String
  , pub token: String
}

/// How the result of one call is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig
{   pub blocking: bool
  , pub webhook: Option<WebhookTarget>
}

impl Default for DeliveryConfig
{   fn default() -> Self
    {   DeliveryConfig
        {   blocking: true
          , webhook: None
        }
    }
}

impl DeliveryConfig
{   /// Webhook to notify for this call, if any.
    ///
    /// Only non-blocking calls with a complete target and a known
    /// message id are pushed.
    pub fn push_target(&self, message_id: Option<&str>)
      -> Option<&WebhookTarget>
    {   if self.blocking || message_id.is_none()
        {   return None;
        }
        self.webhook.as_ref()
    }
}

// ===== Outbound =====

/// One text part of an agent reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputPart
{   pub kind: String
  , pub text: String
}

impl OutputPart
{   pub fn text(text: impl Into<String>) -> Self
    {   OutputPart
        {   kind: "text".to_string()
          , text: text.into()
        }
    }
}

/// Reply built from a generation result, delivered inline and/or
/// through the webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage
{   pub outputs: Vec<OutputPart>
  , pub message_id: Option<String>
}

impl OutboundMessage
{   pub fn from_result(
      result: &GenerationResult
    , message_id: Option<String>
    ) -> Self
    {   OutboundMessage
        {   outputs: result.suggestions
              .iter()
              .map(OutputPart::text)
              .collect()
          , message_id
        }
    }

    /// Agent-role message wrapping the outputs as its parts.
    pub fn agent_message(&self) -> AgentMessage
    {   AgentMessage
        {   kind: "message".to_string()
          , role: "agent".to_string()
          , parts: self.outputs.clone()
          , message_id: self.message_id.clone()
        }
    }
}

/// A2A message object carried by `message/send` replies and webhooks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgentMessage
{   pub kind: String
  , pub role: String
  , pub parts: Vec<OutputPart>
  , #[serde(rename = "messageId")]
    pub message_id: Option<String>
}
