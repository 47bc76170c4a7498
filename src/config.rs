//! Configuration for the remote generator and the HTTP listener

use std::time::Duration;
use serde::{Deserialize, Serialize};
use log::{debug, info};

pub const DEFAULT_MODEL: &str
  = "meta-llama/llama-3.1-8b-instruct:free";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;

/// OpenAI-compatible endpoint used for remote generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig
{   /// API base URL, `/chat/completions` is appended
    pub base_url: String
  , /// Bearer credential
    #[serde(skip_serializing)]
    pub api_key: String
  , /// Model name
    pub model: String
}

impl RemoteConfig
{   /// Chat completion URL with any trailing slash on the base removed
    pub fn completions_url(&self) -> String
    {   format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Agent configuration, built once at start-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig
{   /// Remote generator, `None` forces the local rules
    pub remote: Option<RemoteConfig>
  , /// Listener host
    pub host: String
  , /// Listener port
    pub port: u16
  , /// Remote generation timeout in seconds
    pub generation_timeout_secs: u64
  , /// Webhook delivery timeout in seconds
    pub webhook_timeout_secs: u64
}

impl Default for AgentConfig
{   fn default() -> Self
    {   AgentConfig
        {   remote: None
          , host: DEFAULT_HOST.to_string()
          , port: DEFAULT_PORT
          , generation_timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS
          , webhook_timeout_secs: DEFAULT_WEBHOOK_TIMEOUT_SECS
        }
    }
}

impl AgentConfig
{   /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any variable lookup
    ///
    /// Reads `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `A2A_MODEL`, `HOST`,
    /// `PORT`, `GENERATION_TIMEOUT_SECS` and `WEBHOOK_TIMEOUT_SECS`.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where F: Fn(&str) -> Option<String>
    {   let get = |key: &str| {
          lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        };

        let remote = match (get("OPENAI_API_KEY"), get("OPENAI_BASE_URL"))
        {   (Some(api_key), Some(base_url)) => {
              let model = get("A2A_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string());
              info!("Remote generation enabled: {} ({})", base_url, model);
              Some(RemoteConfig { base_url, api_key, model })
            }
          , _ => {
              info!("Remote generation not configured; local rules only");
              None
            }
        };

        let config = AgentConfig
        {   remote
          , host: get("HOST")
              .unwrap_or_else(|| DEFAULT_HOST.to_string())
          , port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?
          , generation_timeout_secs: parse_or(
              "GENERATION_TIMEOUT_SECS"
            , get("GENERATION_TIMEOUT_SECS")
            , DEFAULT_GENERATION_TIMEOUT_SECS
            )?
          , webhook_timeout_secs: parse_or(
              "WEBHOOK_TIMEOUT_SECS"
            , get("WEBHOOK_TIMEOUT_SECS")
            , DEFAULT_WEBHOOK_TIMEOUT_SECS
            )?
        };
        debug!("Loaded config: {}:{}", config.host, config.port);
        Ok(config)
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String
    {   format!("{}:{}", self.host, self.port)
    }

    pub fn generation_timeout(&self) -> Duration
    {   Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn webhook_timeout(&self) -> Duration
    {   Duration::from_secs(self.webhook_timeout_secs)
    }
}

fn parse_or<T: std::str::FromStr>(
  key: &str
, value: Option<String>
, default: T
) -> Result<T, crate::error::Error>
{   match value
    {   None => Ok(default)
      , Some(raw) => raw.parse().map_err(|_| {
          crate::error::Error::InvalidConfiguration(
            format!("{} must be a number, got '{}'", key, raw)
          )
        })
    }
}
