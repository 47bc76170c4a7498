//! HTTP surface: health check and the JSON-RPC endpoint.

use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use crate::dispatch::Dispatcher;

pub const SERVICE_NAME: &str = "A2A JSON-RPC Motivation Agent";
pub const JSONRPC_PATH: &str = "/jsonrpc";

/// `GET /` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health
{   pub status: String
  , pub service: String
  , pub endpoint: String
}

/// Creates the API router.
pub fn create_router(dispatcher: Arc<Dispatcher>) -> Router
{   let cors = CorsLayer::new()
      .allow_methods([Method::GET, Method::POST])
      .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
      .allow_origin(AllowOrigin::any());

    Router::new()
      .route("/", get(health_check))
      .route(JSONRPC_PATH, post(handle_jsonrpc))
      .layer(cors)
      .with_state(dispatcher)
}

/// Bind the configured address and serve until the process stops.
pub async fn serve(config: crate::config::AgentConfig)
  -> Result<(), crate::error::Error>
{   let dispatcher = Arc::new(Dispatcher::new(&config)?);
    let app = create_router(dispatcher);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await
      .map_err(|e| {
        error!("Failed to bind {}: {}", addr, e);
        crate::error::Error::InvalidConfiguration(
          format!("cannot bind {}: {}", addr, e)
        )
      })?;

    info!("Serving {} on http://{}{}", SERVICE_NAME, addr, JSONRPC_PATH);
    axum::serve(listener, app).await
      .map_err(|e| crate::error::Error::HttpError(e.to_string()))
}

async fn health_check() -> impl IntoResponse
{   Json(Health
    {   status: "ok".to_string()
      , service: SERVICE_NAME.to_string()
      , endpoint: JSONRPC_PATH.to_string()
    })
}

async fn handle_jsonrpc(
  State(dispatcher): State<Arc<Dispatcher>>
, body: Bytes
) -> impl IntoResponse
{   info!("Received {} byte request on {}", body.len(), JSONRPC_PATH);
    let dispatched = dispatcher.dispatch(&body).await;
    let status = StatusCode::from_u16(dispatched.http_status())
      .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(dispatched.into_response()))
}
