//! Remote-then-local fallback for suggestion generation

use log::{debug, warn};
use crate::{GenerationResult, Source};

/// Result of one generation attempt chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome
{   /// Suggestions parsed from the remote model
    Remote(Vec<String>)
  , /// Suggestions from the local keyword rules
    Local(Vec<String>)
}

impl Outcome
{   pub fn source(&self) -> Source
    {   match self
        {   Outcome::Remote(_) => Source::Remote
          , Outcome::Local(_) => Source::Local
        }
    }

    pub fn into_result(self) -> GenerationResult
    {   let source = self.source();
        let suggestions = match self
        {   Outcome::Remote(s) | Outcome::Local(s) => s
        };
        GenerationResult { suggestions, source }
    }
}

/// Pick the outcome from the (optional) single remote attempt.
///
/// `None` means the remote path is not configured. A failed or empty
/// attempt falls through to the local rules.
pub fn select_outcome(
  user_input: &str
, remote_attempt: Option<Result<Vec<String>, crate::error::Error>>
) -> Outcome
{   match remote_attempt
    {   Some(Ok(suggestions)) if !suggestions.is_empty() => {
          Outcome::Remote(suggestions)
        }
      , Some(Ok(_)) => {
          warn!("Remote model returned no suggestions; using local rules");
          Outcome::Local(crate::rules::motivate(user_input))
        }
      , Some(Err(e)) => {
          warn!("Remote model call failed ({}); using local rules", e);
          Outcome::Local(crate::rules::motivate(user_input))
        }
      , None => {
          debug!("Remote model not configured; using local rules");
          Outcome::Local(crate::rules::motivate(user_input))
        }
    }
}

/// Suggestion generator: one remote attempt when configured, local
/// rules otherwise.
#[derive(Debug, Clone)]
pub struct Generator
{   remote: Option<crate::providers::OpenAiCompatClient>
}

impl Generator
{   pub fn new(config: &crate::config::AgentConfig)
      -> Result<Self, crate::error::Error>
    {   let remote = match &config.remote
        {   Some(remote) => Some(
              crate::providers::OpenAiCompatClient::new(
                remote.clone()
              , config.generation_timeout()
              )?
            )
          , None => None
        };
        Ok(Generator { remote })
    }

    /// Generator that never calls out.
    pub fn local_only() -> Self
    {   Generator { remote: None }
    }

    pub fn has_remote(&self) -> bool
    {   self.remote.is_some()
    }

    pub async fn generate(&self, user_input: &str)
      -> Result<GenerationResult, crate::error::Error>
    {   let user_input = user_input.trim();
        if user_input.is_empty()
        {   return Err(crate::error::Error::InvalidInput(
              "user_input must be a non-empty string".to_string()
            ));
        }

        let remote_attempt = match &self.remote
        {   Some(client) => {
              debug!("Trying remote model: {}", client.model());
              Some(client.suggest(user_input).await)
            }
          , None => None
        };

        let result = select_outcome(user_input, remote_attempt)
          .into_result();
        if result.suggestions.is_empty()
        {   return Err(crate::error::Error::GenerationFailure(
              "no suggestions produced".to_string()
            ));
        }
        debug!(
          "Generated {} suggestions ({:?})",
          result.suggestions.len(),
          result.source
        );
        Ok(result)
    }
}
