use anyhow::Result;
use doorman_core::CooldownGate;
use doorman_speech::{Announcer, Composer, EspeakSink, NullSink, OpenAiGenerator, SpeechSink};
use tracing_subscriber::EnvFilter;

mod config;
mod dbus_interface;
mod engine;

use config::Config;
use dbus_interface::DoormanService;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("doormand starting");

    let config = Config::from_env();

    let composer = match &config.openai_api_key {
        Some(key) => {
            tracing::info!(model = %config.openai_model, "message generator enabled");
            Composer::with_generator(
                Box::new(OpenAiGenerator::with_endpoint(
                    key,
                    &config.openai_base_url,
                    &config.openai_model,
                )),
                config.compose_timeout,
            )
        }
        None => {
            tracing::info!("no API key configured; using template messages");
            Composer::fallback_only()
        }
    };

    let sink: Box<dyn SpeechSink> = if config.speech_enabled {
        Box::new(EspeakSink::new(
            config.speech_rate,
            config.speech_volume,
            config.voice.clone(),
        ))
    } else {
        tracing::warn!("speech disabled via DOORMAN_SPEECH_ENABLED=0");
        Box::new(NullSink)
    };
    let announcer = Announcer::new(sink, config.speak_timeout);

    let gate = CooldownGate::new(config.welcome_cooldown, config.goodbye_cooldown);
    tracing::info!(
        welcome_secs = config.welcome_cooldown.as_secs(),
        goodbye_secs = config.goodbye_cooldown.as_secs(),
        "cooldown windows configured"
    );

    let generator_enabled = composer.has_generator();
    let engine = engine::spawn_engine(gate, composer, announcer);

    let service = DoormanService::new(engine, generator_enabled, config.speech_enabled);
    let _conn = zbus::connection::Builder::session()?
        .name("org.sovren.Doorman1")?
        .serve_at("/org/sovren/Doorman1", service)?
        .build()
        .await?;

    tracing::info!("doormand ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("doormand shutting down");

    Ok(())
}
