use std::sync::Arc;
use std::time::Duration;
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};

use motivo::config::{AgentConfig, RemoteConfig};
use motivo::dispatch::Dispatcher;
use motivo::failover::Generator;
use motivo::webhook::WebhookNotifier;
use motivo::{OutboundMessage, OutputPart, WebhookTarget};

const TIRED: [&str; 3] =
[   "You're allowed to rest — take a short, intentional break and come back with fresh energy."
  , "Break your work into 15-minute sprints; small wins will rebuild momentum."
  , "Celebrate one tiny thing you did well today, however small."
];

const GENERIC: [&str; 3] =
[   "You're closer than you think — focus on the next small step and start there."
  , "Set a 25-minute timer and do one thing; momentum builds quickly from action."
  , "Remember progress beats perfection: aim for progress today, no matter how small."
];

/// What a fake server saw: Authorization header and JSON body.
type Captured = (Option<String>, Value);

#[derive(Clone)]
struct CaptureState
{   tx: mpsc::UnboundedSender<Captured>
  , status: StatusCode
  , reply: Value
}

async fn capture(
  State(state): State<CaptureState>
, headers: HeaderMap
, Json(body): Json<Value>
) -> (StatusCode, Json<Value>)
{   let auth = headers
      .get(AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .map(str::to_string);
    let _ = state.tx.send((auth, body));
    (state.status, Json(state.reply.clone()))
}

async fn spawn_router(app: Router) -> String
{   let listener = assert_ok!(
      tokio::net::TcpListener::bind("127.0.0.1:0").await
    );
    let addr = assert_ok!(listener.local_addr());
    tokio::spawn(async move {
      let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

/// Fake endpoint at `path` answering every POST with `status`/`reply`.
async fn spawn_capture(path: &str, status: StatusCode, reply: Value)
  -> (String, mpsc::UnboundedReceiver<Captured>)
{   let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
      .route(path, post(capture))
      .with_state(CaptureState { tx, status, reply });
    (spawn_router(app).await, rx)
}

/// Address nothing listens on.
async fn dead_url() -> String
{   let listener = assert_ok!(
      tokio::net::TcpListener::bind("127.0.0.1:0").await
    );
    let addr = assert_ok!(listener.local_addr());
    drop(listener);
    format!("http://{}", addr)
}

async fn spawn_agent(generator: Generator) -> String
{   let notifier = assert_ok!(WebhookNotifier::new(Duration::from_secs(5)));
    let dispatcher = Arc::new(Dispatcher::with_parts(generator, notifier));
    spawn_router(motivo::server::create_router(dispatcher)).await
}

fn remote_generator(base_url: String) -> Generator
{   let config = AgentConfig
    {   remote: Some(RemoteConfig
        {   base_url
          , api_key: "sk-test".to_string()
          , model: "test-model".to_string()
        })
      , generation_timeout_secs: 5
      , ..AgentConfig::default()
    };
    assert_ok!(Generator::new(&config))
}

async fn post_raw(base: &str, body: String) -> (u16, Value)
{   let resp = assert_ok!(
      reqwest::Client::new()
        .post(format!("{}/jsonrpc", base))
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
    );
    let status = resp.status().as_u16();
    (status, assert_ok!(resp.json::<Value>().await))
}

async fn post_rpc(base: &str, payload: Value) -> (u16, Value)
{   post_raw(base, payload.to_string()).await
}

fn texts(outputs: &Value) -> Vec<String>
{   outputs
      .as_array()
      .map(|items| {
        items
          .iter()
          .filter_map(|o| o["text"].as_str().map(str::to_string))
          .collect()
      })
      .unwrap_or_default()
}

fn message_send(parts: Value, configuration: Value) -> Value
{   json!({
      "jsonrpc": "2.0",
      "id": "req-1",
      "method": "message/send",
      "params": {
        "message": {
          "kind": "message",
          "role": "user",
          "parts": parts,
          "messageId": "msg-42"
        },
        "configuration": configuration
      }
    })
}

// ===== HTTP surface =====

#[tokio::test]
async fn health_endpoint()
{   let base = spawn_agent(Generator::local_only()).await;
    let resp = assert_ok!(reqwest::get(format!("{}/", base)).await);
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = assert_ok!(resp.json().await);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["endpoint"], "/jsonrpc");
    assert!(body["service"].is_string());
}

#[tokio::test]
async fn motivate_tired_uses_local_template()
{   let base = spawn_agent(Generator::local_only()).await;
    let (status, body) = post_rpc(&base, json!({
      "jsonrpc": "2.0",
      "method": "motivate",
      "params": { "input": "I'm tired" },
      "id": 1
    })).await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["motivations"], json!(TIRED));
    assert_eq!(body["result"]["source"], "local");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn motivate_positional_params()
{   let base = spawn_agent(Generator::local_only()).await;
    let (status, body) = post_rpc(&base, json!({
      "jsonrpc": "2.0",
      "method": "motivate",
      "params": ["totally exhausted"],
      "id": "p"
    })).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"]["motivations"], json!(TIRED));
}

#[tokio::test]
async fn wrong_version_is_invalid_request_for_any_method()
{   let base = spawn_agent(Generator::local_only()).await;
    for method in ["message/send", "motivate", "does/not/exist"]
    {   let (status, body) = post_rpc(&base, json!({
          "jsonrpc": "1.0",
          "method": method,
          "params": { "input": "hi" },
          "id": 9
        })).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], -32600);
        assert_eq!(body["id"], 9);
    }
}

#[tokio::test]
async fn malformed_json_is_parse_error()
{   let base = spawn_agent(Generator::local_only()).await;
    let (status, body) = post_raw(&base, "{\"jsonrpc\": ".to_string()).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn non_object_body_is_invalid_request()
{   let base = spawn_agent(Generator::local_only()).await;
    let (status, body) = post_raw(&base, "[1, 2]".to_string()).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], -32600);
}

#[tokio::test]
async fn method_errors()
{   let base = spawn_agent(Generator::local_only()).await;

    let (status, body) = post_rpc(&base, json!({
      "jsonrpc": "2.0", "id": 1
    })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], -32601);

    let (status, body) = post_rpc(&base, json!({
      "jsonrpc": "2.0", "method": "tasks/get", "id": 2
    })).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], -32601);
    assert_eq!(body["error"]["message"], "Method 'tasks/get' not found");

    let (status, body) = post_rpc(&base, json!({
      "jsonrpc": "2.0", "method": 5, "id": 3
    })).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], -32601);
    assert_eq!(body["error"]["message"], "Method '5' not found");
}

#[tokio::test]
async fn motivate_without_input_is_invalid_params()
{   let base = spawn_agent(Generator::local_only()).await;
    let (status, body) = post_rpc(&base, json!({
      "jsonrpc": "2.0", "method": "motivate", "params": {}, "id": 3
    })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], -32602);
    assert_eq!(body["id"], 3);
}

// ===== message/send =====

#[tokio::test]
async fn blocking_message_send_returns_outputs_and_message()
{   let base = spawn_agent(Generator::local_only()).await;
    let (status, body) = post_rpc(&base, message_send(
      json!([
        { "kind": "text", "text": "ok" },
        { "kind": "text", "text": "I am stuck and need help" }
      ])
    , json!({ "blocking": true })
    )).await;

    assert_eq!(status, 200);
    assert_eq!(body["id"], "req-1");
    let result = &body["result"];
    let outputs = texts(&result["outputs"]);
    assert_eq!(outputs.len(), 3);
    assert!(outputs[0].starts_with("Try one small experiment"));
    assert!(result["outputs"]
      .as_array()
      .unwrap()
      .iter()
      .all(|o| o["kind"] == "text"));
    assert_eq!(result["message"]["role"], "agent");
    assert_eq!(result["message"]["kind"], "message");
    assert_eq!(result["message"]["messageId"], "msg-42");
    assert_eq!(result["message"]["parts"], result["outputs"]);
}

#[tokio::test]
async fn empty_parts_use_default_input()
{   let base = spawn_agent(Generator::local_only()).await;
    let (status, body) = post_rpc(&base, message_send(json!([]), json!({})))
      .await;
    assert_eq!(status, 200);
    assert_eq!(texts(&body["result"]["outputs"]), GENERIC.to_vec());
}

#[tokio::test]
async fn non_blocking_delivers_same_outputs_to_webhook_once()
{   let (hook, mut seen) = spawn_capture("/hook", StatusCode::OK, json!({}))
      .await;
    let base = spawn_agent(Generator::local_only()).await;

    let (status, body) = post_rpc(&base, message_send(
      json!([{ "kind": "text", "text": "Give me motivation to pass my exam" }])
    , json!({
        "blocking": false,
        "pushNotificationConfig": {
          "url": format!("{}/hook", hook),
          "token": "hook-token"
        }
      })
    )).await;

    assert_eq!(status, 200);
    let inline = &body["result"]["outputs"];
    assert!(!texts(inline).is_empty());

    let (auth, payload) = assert_ok!(
      tokio::time::timeout(Duration::from_secs(5), seen.recv()).await
    ).expect("webhook called");
    assert_eq!(auth.as_deref(), Some("Bearer hook-token"));
    assert_eq!(payload["jsonrpc"], "2.0");
    assert_eq!(payload["method"], "message/send");
    assert_eq!(payload["id"], "msg-42");
    assert_eq!(payload["params"]["message"]["role"], "agent");
    assert_eq!(payload["params"]["message"]["messageId"], "msg-42");
    assert_eq!(&payload["params"]["message"]["parts"], inline);
    assert_eq!(
      payload["params"]["message"]["parts"].to_string()
    , inline.to_string()
    );
    assert!(payload["params"].get("outputs").is_none());

    assert_err!(
      tokio::time::timeout(Duration::from_millis(300), seen.recv()).await
    );
}

#[tokio::test]
async fn blocking_call_never_pushes()
{   let (hook, mut seen) = spawn_capture("/hook", StatusCode::OK, json!({}))
      .await;
    let base = spawn_agent(Generator::local_only()).await;

    let (status, _) = post_rpc(&base, message_send(
      json!([{ "kind": "text", "text": "sad today" }])
    , json!({
        "blocking": true,
        "pushNotificationConfig": {
          "url": format!("{}/hook", hook),
          "token": "hook-token"
        }
      })
    )).await;
    assert_eq!(status, 200);
    assert_err!(
      tokio::time::timeout(Duration::from_millis(300), seen.recv()).await
    );
}

#[tokio::test]
async fn failing_webhook_does_not_affect_response()
{   let base = spawn_agent(Generator::local_only()).await;
    let (status, body) = post_rpc(&base, message_send(
      json!([{ "kind": "text", "text": "burnout" }])
    , json!({
        "blocking": false,
        "pushNotificationConfig": {
          "url": format!("{}/hook", dead_url().await),
          "token": "t"
        }
      })
    )).await;
    assert_eq!(status, 200);
    assert_eq!(texts(&body["result"]["outputs"]), TIRED.to_vec());
}

// ===== Webhook notifier =====

fn sample_message() -> OutboundMessage
{   OutboundMessage
    {   outputs: vec![OutputPart::text("one"), OutputPart::text("two")]
      , message_id: Some("m-1".to_string())
    }
}

#[tokio::test]
async fn notifier_reports_success_on_2xx()
{   let (hook, mut seen) =
      spawn_capture("/cb", StatusCode::ACCEPTED, json!({})).await;
    let notifier = assert_ok!(WebhookNotifier::new(Duration::from_secs(5)));

    let mut reply = assert_ok!(notifier.submit(
      WebhookTarget { url: format!("{}/cb", hook), token: "tk".to_string() }
    , sample_message()
    ));
    assert_eq!(reply.recv().await, Some(true));

    let (_, payload) = seen.recv().await.expect("delivered");
    assert_eq!(
      payload["params"]["message"]["parts"]
    , json!([{ "kind": "text", "text": "one" }, { "kind": "text", "text": "two" }])
    );
}

#[tokio::test]
async fn notifier_reports_failure_on_error_status()
{   let (hook, mut seen) =
      spawn_capture("/cb", StatusCode::INTERNAL_SERVER_ERROR, json!({})).await;
    let notifier = assert_ok!(WebhookNotifier::new(Duration::from_secs(5)));

    let mut reply = assert_ok!(notifier.submit(
      WebhookTarget { url: format!("{}/cb", hook), token: "tk".to_string() }
    , sample_message()
    ));
    assert_eq!(reply.recv().await, Some(false));
    assert!(seen.recv().await.is_some());
    assert_err!(
      tokio::time::timeout(Duration::from_millis(300), seen.recv()).await
    );
}

#[tokio::test]
async fn notifier_reports_failure_when_unreachable()
{   let notifier = assert_ok!(WebhookNotifier::new(Duration::from_secs(5)));
    let mut reply = assert_ok!(notifier.submit(
      WebhookTarget { url: format!("{}/cb", dead_url().await), token: "tk".to_string() }
    , sample_message()
    ));
    assert_eq!(reply.recv().await, Some(false));
}

// ===== Remote generation =====

fn completion(content: &str) -> Value
{   json!({
      "id": "cmpl-1",
      "object": "chat.completion",
      "choices": [{
        "index": 0,
        "message": { "role": "assistant", "content": content },
        "finish_reason": "stop"
      }]
    })
}

#[tokio::test]
async fn remote_suggestions_are_used_when_configured()
{   let (model, mut seen) = spawn_capture(
      "/v1/chat/completions"
    , StatusCode::OK
    , completion("Here you go!\n[\"Keep going 💪\", \"You got this ✨\", \"Breathe 🧘\"]")
    ).await;
    let base = spawn_agent(remote_generator(format!("{}/v1/", model))).await;

    let (status, body) = post_rpc(&base, json!({
      "jsonrpc": "2.0",
      "method": "motivate",
      "params": { "message": "exam tomorrow" },
      "id": 5
    })).await;

    assert_eq!(status, 200);
    assert_eq!(body["result"]["source"], "remote");
    assert_eq!(
      body["result"]["motivations"]
    , json!(["Keep going 💪", "You got this ✨", "Breathe 🧘"])
    );

    let (auth, request) = seen.recv().await.expect("model called");
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(request["model"], "test-model");
    assert_eq!(request["max_tokens"], 300);
    assert_eq!(request["messages"][0]["role"], "system");
    assert_eq!(request["messages"][1]["content"], "exam tomorrow");
}

#[tokio::test]
async fn remote_numbered_lines_are_parsed()
{   let (model, _seen) = spawn_capture(
      "/chat/completions"
    , StatusCode::OK
    , completion("1. Start small.\n2. Keep at it.\n3. Rest well.\n4. Extra.")
    ).await;
    let generator = remote_generator(model);

    let result = assert_ok!(generator.generate("help").await);
    assert_eq!(result.source, motivo::Source::Remote);
    assert_eq!(
      result.suggestions
    , vec!["Start small.", "Keep at it.", "Rest well."]
    );
}

#[tokio::test]
async fn remote_error_status_falls_back_to_local()
{   let (model, mut seen) = spawn_capture(
      "/chat/completions"
    , StatusCode::TOO_MANY_REQUESTS
    , json!({ "error": "rate limited" })
    ).await;
    let generator = remote_generator(model);
    assert!(generator.has_remote());

    let result = assert_ok!(generator.generate("I'm tired").await);
    assert_eq!(result.source, motivo::Source::Local);
    assert_eq!(result.suggestions, TIRED.to_vec());
    assert!(seen.recv().await.is_some());
}

#[tokio::test]
async fn unreachable_remote_falls_back_to_local()
{   let generator = remote_generator(dead_url().await);
    let base = spawn_agent(generator).await;

    let (status, body) = post_rpc(&base, message_send(
      json!([{ "kind": "text", "text": "feeling blocked at work" }])
    , json!({ "blocking": true })
    )).await;
    assert_eq!(status, 200);
    let outputs = texts(&body["result"]["outputs"]);
    assert_eq!(outputs.len(), 3);
    assert!(outputs[0].starts_with("Try one small experiment"));
}

#[tokio::test]
async fn blank_input_is_rejected_before_generation()
{   let generator = Generator::local_only();
    assert!(!generator.has_remote());
    assert_err!(generator.generate("   ").await);

    let base = spawn_agent(Generator::local_only()).await;
    let (status, body) = post_rpc(&base, json!({
      "jsonrpc": "2.0", "method": "motivate", "params": { "input": 12 }, "id": 4
    })).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"]["code"], -32000);
    assert_eq!(
      body["error"]["message"]
    , "Server error: user_input must be a non-empty string"
    );
    assert_eq!(body["id"], 4);

    let (status, body) = post_rpc(&base, json!({
      "jsonrpc": "2.0", "method": "motivate",
      "params": { "input": 0, "message": "so tired today" }, "id": 5
    })).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"]["source"], "local");
    assert_eq!(body["result"]["motivations"], json!(TIRED));
}
