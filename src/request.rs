//! JSON-RPC 2.0 request and response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Methods served on `/jsonrpc`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method
{   /// A2A `message/send`
    MessageSend
  , /// Plain `motivate` call
    Motivate
}

impl Method
{   pub fn from_name(name: &str) -> Option<Method>
    {   match name
        {   "message/send" => Some(Method::MessageSend)
          , "motivate" => Some(Method::Motivate)
          , _ => None
        }
    }

    pub fn name(&self) -> &'static str
    {   match self
        {   Method::MessageSend => "message/send"
          , Method::Motivate => "motivate"
        }
    }
}

/// Validated request envelope
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest
{   pub method: Method
  , pub params: Value
  , pub id: Value
}

impl RpcRequest
{   /// Validate a raw body into a request.
    ///
    /// On failure the error comes back together with whatever `id` could
    /// be read, so it can still be echoed.
    pub fn parse(body: &[u8])
      -> Result<RpcRequest, (Value, crate::error::Error)>
    {   let payload: Value = serde_json::from_slice(body)
          .map_err(|e| (Value::Null, crate::error::Error::from(e)))?;

        let Value::Object(mut map) = payload else {
          return Err((
            Value::Null
          , crate::error::Error::InvalidRequest(
              "body must be a JSON object".to_string()
            )
          ));
        };

        let id = map.remove("id").unwrap_or(Value::Null);

        if map.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION)
        {   return Err((
              id
            , crate::error::Error::InvalidRequest(
                "unsupported jsonrpc version".to_string()
              )
            ));
        }

        let name = match map.get("method")
        {   Some(Value::String(name)) => name.clone()
          , Some(other) if !is_falsy(other) => other.to_string()
          , _ => String::new()
        };
        if name.is_empty()
        {   return Err((id, crate::error::Error::MissingMethod));
        }

        let Some(method) = Method::from_name(&name) else {
          return Err((id, crate::error::Error::MethodNotFound(name)));
        };

        let params = match map.remove("params")
        {   None | Some(Value::Null) => Value::Object(Default::default())
          , Some(p) => p
        };

        Ok(RpcRequest { method, params, id })
    }
}

/// Null, `false`, zero, and empty strings or collections.
fn is_falsy(value: &Value) -> bool
{   match value
    {   Value::Null => true
      , Value::Bool(b) => !b
      , Value::Number(n) => n.as_f64() == Some(0.0)
      , Value::String(s) => s.is_empty()
      , Value::Array(items) => items.is_empty()
      , Value::Object(map) => map.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError
{   pub code: i64
  , pub message: String
}

/// Response envelope: exactly one of `result` / `error` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse
{   pub jsonrpc: String
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>
  , pub id: Value
}

impl RpcResponse
{   pub fn success(id: Value, result: Value) -> Self
    {   RpcResponse
        {   jsonrpc: JSONRPC_VERSION.to_string()
          , result: Some(result)
          , error: None
          , id
        }
    }

    pub fn failure(id: Value, error: &crate::error::Error) -> Self
    {   RpcResponse
        {   jsonrpc: JSONRPC_VERSION.to_string()
          , result: None
          , error: Some(RpcError
            {   code: error.rpc_code()
              , message: error.rpc_message()
            })
          , id
        }
    }
}

/// Outbound `message/send` notification posted to a webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcNotification
{   pub jsonrpc: String
  , pub method: String
  , pub params: NotificationParams
  , pub id: Option<String>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationParams
{   pub message: crate::AgentMessage
}

impl RpcNotification
{   pub fn message_send(message: &crate::OutboundMessage) -> Self
    {   RpcNotification
        {   jsonrpc: JSONRPC_VERSION.to_string()
          , method: Method::MessageSend.name().to_string()
          , params: NotificationParams
            {   message: message.agent_message()
            }
          , id: message.message_id.clone()
        }
    }
}
