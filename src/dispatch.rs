//! One JSON-RPC call end to end: Parse -> Generate -> Deliver
//!
//! Non-blocking calls are still generated inline. When a usable push
//! target is present the same outputs go back in the response and to
//! the webhook; the webhook send never affects the response.

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::request::{Method, RpcRequest, RpcResponse};
use crate::{AgentMessage, OutboundMessage, OutputPart};

/// `message/send` result body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSendResult
{   pub outputs: Vec<OutputPart>
  , pub message: AgentMessage
}

impl From<&OutboundMessage> for MessageSendResult
{   fn from(outbound: &OutboundMessage) -> Self
    {   MessageSendResult
        {   outputs: outbound.outputs.clone()
          , message: outbound.agent_message()
        }
    }
}

/// Outcome of one call, before it is put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched
{   pub id: Value
  , pub outcome: Result<Value, crate::error::Error>
}

impl Dispatched
{   pub fn http_status(&self) -> u16
    {   match &self.outcome
        {   Ok(_) => 200
          , Err(e) => e.http_status()
        }
    }

    pub fn into_response(self) -> RpcResponse
    {   match self.outcome
        {   Ok(result) => RpcResponse::success(self.id, result)
          , Err(e) => RpcResponse::failure(self.id, &e)
        }
    }
}

pub struct Dispatcher
{   generator: crate::failover::Generator
  , notifier: crate::webhook::WebhookNotifier
}

impl Dispatcher
{   /// Build generator and notifier from configuration; spawns the
    /// notifier task, so call inside a runtime.
    pub fn new(config: &crate::config::AgentConfig)
      -> Result<Self, crate::error::Error>
    {   let generator = crate::failover::Generator::new(config)?;
        if generator.has_remote()
        {   info!("Remote generation enabled, local rules as fallback");
        } else
        {   info!("No remote model configured, using local rules only");
        }
        let notifier = crate::webhook::WebhookNotifier::new(
          config.webhook_timeout()
        )?;
        Ok(Dispatcher::with_parts(generator, notifier))
    }

    pub fn with_parts(
      generator: crate::failover::Generator
    , notifier: crate::webhook::WebhookNotifier
    ) -> Self
    {   Dispatcher { generator, notifier }
    }

    pub async fn dispatch(&self, body: &[u8]) -> Dispatched
    {   let request = match RpcRequest::parse(body)
        {   Ok(request) => request
          , Err((id, e)) => {
              debug!("Rejected request: {}", e);
              return Dispatched { id, outcome: Err(e) };
            }
        };

        debug!("Dispatching {} (id {})", request.method.name(), request.id);
        let outcome = match request.method
        {   Method::MessageSend => self.message_send(&request.params).await
          , Method::Motivate => self.motivate(&request.params).await
        };

        if let Err(e) = &outcome
        {   error!("{} failed: {}", request.method.name(), e);
        }
        Dispatched { id: request.id, outcome }
    }

    /// A2A `message/send`.
    pub async fn message_send(&self, params: &Value)
      -> Result<Value, crate::error::Error>
    {   let envelope = crate::envelope::parse_message_send(params);
        let generated = self.generator.generate(&envelope.user_input).await
          .map_err(|e| match e
          {   crate::error::Error::GenerationFailure(_) => e
            , other => into_server_error(other)
          })?;

        let outbound = OutboundMessage::from_result(
          &generated
        , envelope.message_id.clone()
        );

        if let Some(target) = envelope.delivery
          .push_target(envelope.message_id.as_deref())
        {   match self.notifier.submit(target.clone(), outbound.clone())
            {   Ok(_receipt) => {
                  info!("Queued webhook delivery to {}", target.url);
                }
              , Err(e) => {
                  error!("Could not queue webhook delivery: {}", e);
                }
            }
        } else if !envelope.delivery.blocking
        {   debug!("Non-blocking call without a usable push target");
        }

        info!(
          "Returning {} outputs ({:?})",
          outbound.outputs.len(),
          generated.source
        );
        serde_json::to_value(MessageSendResult::from(&outbound))
          .map_err(into_server_error)
    }

    /// Plain `motivate`.
    pub async fn motivate(&self, params: &Value)
      -> Result<Value, crate::error::Error>
    {   let user_input = crate::envelope::parse_motivate(params)?;
        let generated = self.generator.generate(&user_input).await?;
        serde_json::to_value(&generated).map_err(into_server_error)
    }
}

/// `message/send` input always has a default, so a failure past the
/// envelope is a server fault.
fn into_server_error<E: std::fmt::Display>(e: E) -> crate::error::Error
{   crate::error::Error::GenerationFailure(e.to_string())
}
