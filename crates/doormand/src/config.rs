use std::time::Duration;

/// Daemon configuration, loaded from environment variables.
pub struct Config {
    /// Minimum gap between welcome notifications for one identity.
    pub welcome_cooldown: Duration,
    /// Minimum gap between goodbye notifications for one identity.
    pub goodbye_cooldown: Duration,
    /// Speaking rate in words per minute.
    pub speech_rate: u32,
    /// Speech amplitude, 0..=200 (100 is the espeak default).
    pub speech_volume: u32,
    /// espeak voice name, e.g. "en-us". None uses the default voice.
    pub voice: Option<String>,
    /// When false, announcements are composed but not spoken.
    pub speech_enabled: bool,
    /// API key for the message generator. None selects the template path.
    pub openai_api_key: Option<String>,
    /// Base URL of the chat-completions endpoint.
    pub openai_base_url: String,
    /// Model name for greeting generation.
    pub openai_model: String,
    /// Upper bound on one message-generation call.
    pub compose_timeout: Duration,
    /// Upper bound on one utterance.
    pub speak_timeout: Duration,
}

impl Config {
    /// Load configuration from `DOORMAN_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            welcome_cooldown: Duration::from_secs(env_u64("DOORMAN_WELCOME_COOLDOWN_SECS", 3600)),
            goodbye_cooldown: Duration::from_secs(env_u64("DOORMAN_GOODBYE_COOLDOWN_SECS", 300)),
            speech_rate: env_u32("DOORMAN_SPEECH_RATE", 150),
            speech_volume: env_u32("DOORMAN_SPEECH_VOLUME", 100),
            voice: std::env::var("DOORMAN_VOICE").ok().filter(|v| !v.is_empty()),
            speech_enabled: std::env::var("DOORMAN_SPEECH_ENABLED")
                .map(|v| v != "0")
                .unwrap_or(true),
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|v| !v.is_empty()),
            openai_base_url: std::env::var("DOORMAN_OPENAI_BASE_URL")
                .unwrap_or_else(|_| doorman_speech::openai::DEFAULT_BASE_URL.to_string()),
            openai_model: std::env::var("DOORMAN_OPENAI_MODEL")
                .unwrap_or_else(|_| doorman_speech::openai::DEFAULT_MODEL.to_string()),
            compose_timeout: Duration::from_secs(env_u64("DOORMAN_COMPOSE_TIMEOUT_SECS", 5)),
            speak_timeout: Duration::from_secs(env_u64("DOORMAN_SPEAK_TIMEOUT_SECS", 10)),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
