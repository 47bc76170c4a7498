use std::fmt;

/// JSON-RPC 2.0 reserved error codes used by the agent
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const SERVER_ERROR: i64 = -32000;

/// Custom error type for agent operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Request body is not valid JSON
    ParseError(String)
  , /// Envelope is not a JSON-RPC 2.0 request object
    InvalidRequest(String)
  , /// Request carries no method name
    MissingMethod
  , /// Method name is not served by the agent
    MethodNotFound(String)
  , /// Required parameter missing or malformed
    InvalidParams(String)
  , /// Generator input was empty or not text
    InvalidInput(String)
  , /// Neither the remote nor the local generator produced output
    GenerationFailure(String)
  , /// HTTP request error
    HttpError(String)
  , /// API returned an error response
    ApiError(String)
  , /// No choices in API response
    NoChoicesInResponse
  , /// Model reply contained nothing usable
    NoSuggestions
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Timeout error
    Timeout
  , /// Webhook target rejected or never received the delivery
    WebhookDelivery(String)
}

impl Error
{   /// JSON-RPC error code reported for this error
    pub fn rpc_code(&self) -> i64
    {   match self
        {   Error::ParseError(_) => PARSE_ERROR
          , Error::InvalidRequest(_) => INVALID_REQUEST
          , Error::MissingMethod
          | Error::MethodNotFound(_) => METHOD_NOT_FOUND
          , Error::InvalidParams(_) => INVALID_PARAMS
          , _ => SERVER_ERROR
        }
    }

    /// HTTP status the `/jsonrpc` endpoint answers with
    pub fn http_status(&self) -> u16
    {   match self
        {   Error::ParseError(_)
          | Error::InvalidRequest(_)
          | Error::MissingMethod
          | Error::InvalidParams(_) => 400
          , Error::MethodNotFound(_) => 404
          , _ => 500
        }
    }

    /// Message placed in the JSON-RPC error object
    pub fn rpc_message(&self) -> String
    {   match self
        {   Error::ParseError(_) => "Parse error".to_string()
          , Error::InvalidRequest(msg) => {
              format!("Invalid Request: {}", msg)
            }
          , Error::MissingMethod => "Method not found".to_string()
          , Error::MethodNotFound(method) => {
              format!("Method '{}' not found", method)
            }
          , Error::InvalidParams(msg) => {
              format!("Invalid params: {}", msg)
            }
          , Error::InvalidInput(msg) => format!("Server error: {}", msg)
          , other => format!("Server error: {}", other)
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::InvalidRequest(msg) => {
              write!(f, "Invalid request: {}", msg)
            }
          , Error::MissingMethod => {
              write!(f, "Request has no method")
            }
          , Error::MethodNotFound(method) => {
              write!(f, "Method not found: {}", method)
            }
          , Error::InvalidParams(msg) => {
              write!(f, "Invalid params: {}", msg)
            }
          , Error::InvalidInput(msg) => {
              write!(f, "Invalid input: {}", msg)
            }
          , Error::GenerationFailure(msg) => {
              write!(f, "Generation failed: {}", msg)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::NoSuggestions => {
              write!(f, "Model returned no usable suggestions")
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::WebhookDelivery(msg) => {
              write!(f, "Webhook delivery failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::Timeout
        } else
        {   Error::HttpError(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::ParseError(e.to_string())
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn present_but_unusable_input_is_a_server_error()
    {   let err = Error::InvalidInput(
          "user_input must be a non-empty string".to_string()
        );
        assert_eq!(err.rpc_code(), SERVER_ERROR);
        assert_eq!(err.http_status(), 500);
        assert_eq!(
          err.rpc_message()
        , "Server error: user_input must be a non-empty string"
        );

        let missing = Error::InvalidParams("'input' is required".to_string());
        assert_eq!(missing.rpc_code(), INVALID_PARAMS);
        assert_eq!(missing.http_status(), 400);
    }
}
