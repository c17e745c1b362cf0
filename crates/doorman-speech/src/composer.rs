use std::time::Duration;

use async_trait::async_trait;
use doorman_core::EventKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generator returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("generator returned no usable text")]
    EmptyResponse,
}

/// Parameters for one generated message.
#[derive(Debug, Clone)]
pub struct MessagePrompt {
    pub identity: String,
    pub kind: EventKind,
    /// Only meaningful for arrivals.
    pub first_time: bool,
}

/// Strategy for producing a personalized message. Exactly one method;
/// absence of an implementation selects the template fallback.
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    async fn generate(&self, prompt: &MessagePrompt) -> Result<String, GeneratorError>;
}

/// Produces the text to speak for a notification.
///
/// `compose` never fails: with no generator configured it returns a
/// fixed template immediately, and with one configured any error or
/// timeout on the generation call falls back to the same template.
/// The fallback text is byte-identical across calls; generated text is
/// best-effort and carries no contract beyond being non-empty.
pub struct Composer {
    generator: Option<Box<dyn MessageGenerator>>,
    timeout: Duration,
}

impl Composer {
    /// Composer with no generation capability: always uses templates.
    pub fn fallback_only() -> Self {
        Self {
            generator: None,
            timeout: Duration::ZERO,
        }
    }

    /// Composer backed by a generator, with a per-call timeout bounding
    /// how long a cycle can stall on the external service.
    pub fn with_generator(generator: Box<dyn MessageGenerator>, timeout: Duration) -> Self {
        Self {
            generator: Some(generator),
            timeout,
        }
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn compose(&self, identity: &str, kind: EventKind, first_time: bool) -> String {
        let Some(generator) = &self.generator else {
            return fallback_message(identity, kind);
        };

        let prompt = MessagePrompt {
            identity: identity.to_string(),
            kind,
            first_time,
        };

        match tokio::time::timeout(self.timeout, generator.generate(&prompt)).await {
            Ok(Ok(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    tracing::warn!(identity, kind = kind.as_str(), "generator returned empty text; using template");
                    fallback_message(identity, kind)
                } else {
                    text.to_string()
                }
            }
            Ok(Err(err)) => {
                tracing::warn!(identity, kind = kind.as_str(), error = %err, "message generation failed; using template");
                fallback_message(identity, kind)
            }
            Err(_) => {
                tracing::warn!(
                    identity,
                    kind = kind.as_str(),
                    timeout_secs = self.timeout.as_secs(),
                    "message generation timed out; using template"
                );
                fallback_message(identity, kind)
            }
        }
    }
}

/// Fixed, deterministic message templates.
fn fallback_message(identity: &str, kind: EventKind) -> String {
    match kind {
        EventKind::Arrival => format!("Welcome, {identity}!"),
        EventKind::Departure => format!("Goodbye, {identity}, see you soon!"),
    }
}
