use std::time::Duration;
use tokio::sync::mpsc;
use log::{debug, trace, error, info, warn};

// ===== Delivery =====

/// `true` when the webhook answered with a 2xx status.
pub type DeliveryReply = bool;
pub type DeliveryReplySender = mpsc::UnboundedSender<DeliveryReply>;

/// One push notification to send.
pub struct DeliveryArgs
{   pub target: crate::WebhookTarget
  , pub message: crate::OutboundMessage
  , pub reply: DeliveryReplySender
}

/// POST one notification to `target`. Exactly one attempt, no retry.
pub async fn deliver(
  http_client: &reqwest::Client
, target: &crate::WebhookTarget
, message: &crate::OutboundMessage
) -> Result<(), crate::error::Error>
{   let payload = crate::request::RpcNotification::message_send(message);
    trace!("Webhook payload: {:?}", payload);

    let response = http_client
      .post(&target.url)
      .header("Authorization", format!("Bearer {}", target.token))
      .header("Content-Type", "application/json")
      .json(&payload)
      .send()
      .await
      .map_err(|e| crate::error::Error::WebhookDelivery(e.to_string()))?;

    let status = response.status();
    if !status.is_success()
    {   let body = response.text().await.unwrap_or_default();
        return Err(crate::error::Error::WebhookDelivery(
          format!("status {}: {}", status, body)
        ));
    }
    Ok(())
}

// ===== Notifier Task =====

/// Background push-notification sender.
///
/// Submissions return right away. Each delivery runs on its own task,
/// so a slow webhook never holds up the HTTP response it came from.
pub struct WebhookNotifier
{   tx: mpsc::UnboundedSender<DeliveryArgs>
  , _task: tokio::task::JoinHandle<()>
}

impl WebhookNotifier
{   /// Create and spawn a notifier; must be called inside a runtime.
    pub fn new(timeout: Duration) -> Result<Self, crate::error::Error>
    {   debug!("Creating WebhookNotifier (timeout {:?})", timeout);
        let http_client = reqwest::Client::builder()
          .timeout(timeout)
          .build()
          .map_err(|e| {
            error!("Failed to build webhook HTTP client: {}", e);
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let _task = tokio::spawn(async move {
          run_notifier_loop(rx, http_client).await;
        });

        Ok(WebhookNotifier
        {   tx
          , _task
        })
    }

    /// Queue a delivery - returns immediately
    ///
    /// The receiver yields the delivery outcome once; dropping it is
    /// fine for fire-and-forget use.
    pub fn submit(
      &self
    , target: crate::WebhookTarget
    , message: crate::OutboundMessage
    ) -> Result<
        mpsc::UnboundedReceiver<DeliveryReply>,
        crate::error::Error
      >
    {   debug!(
          "Queuing webhook delivery for message: {:?}",
          message.message_id
        );
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        self.tx
          .send(DeliveryArgs
          {   target
            , message
            , reply: reply_tx
          })
          .map_err(|_| {
            error!("Webhook notifier channel closed");
            crate::error::Error::WebhookDelivery(
              "notifier disconnected".to_string()
            )
          })?;

        Ok(reply_rx)
    }
}

/// Main notifier loop: hands each queued delivery to its own task.
async fn run_notifier_loop(
  mut rx: mpsc::UnboundedReceiver<DeliveryArgs>
, http_client: reqwest::Client
)
{   debug!("Starting webhook notifier loop");
    while let Some(args) = rx.recv().await
    {   let http_client = http_client.clone();
        tokio::spawn(async move {
          let DeliveryArgs { target, message, reply } = args;
          let delivered = match deliver(&http_client, &target, &message).await
          {   Ok(()) => {
                info!(
                  "Webhook delivered for message {:?} to {}",
                  message.message_id, target.url
                );
                true
              }
            , Err(e) => {
                warn!(
                  "Webhook delivery to {} failed: {}",
                  target.url, e
                );
                false
              }
          };
          let _ = reply.send(delivered);
        });
    }
    debug!("Webhook notifier channel closed");
}
