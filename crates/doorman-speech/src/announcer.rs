use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("failed to launch speech process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to write text to speech process: {0}")]
    Pipe(#[source] std::io::Error),
    #[error("speech process exited with status {0}")]
    Exit(std::process::ExitStatus),
    #[error("speech process did not report status: {0}")]
    Wait(#[source] std::io::Error),
}

/// Output sink for synthesized speech. Exactly one method; the sink is
/// a serial resource that plays one utterance at a time.
#[async_trait]
pub trait SpeechSink: Send + Sync {
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;
}

/// Speaks through the `espeak-ng` binary.
///
/// Text is piped on stdin rather than passed as an argument, so
/// arbitrary generated messages cannot be mistaken for flags.
pub struct EspeakSink {
    /// Speaking rate in words per minute.
    rate: u32,
    /// Output amplitude, 0..=200.
    volume: u32,
    /// Voice name, e.g. "en-us". None uses the espeak default.
    voice: Option<String>,
}

impl EspeakSink {
    pub fn new(rate: u32, volume: u32, voice: Option<String>) -> Self {
        Self {
            rate,
            volume: volume.min(200),
            voice,
        }
    }
}

#[async_trait]
impl SpeechSink for EspeakSink {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let mut cmd = Command::new("espeak-ng");
        cmd.arg("-s")
            .arg(self.rate.to_string())
            .arg("-a")
            .arg(self.volume.to_string());
        if let Some(voice) = &self.voice {
            cmd.arg("-v").arg(voice);
        }
        cmd.arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let mut child = cmd.spawn().map_err(SpeechError::Spawn)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(SpeechError::Pipe)?;
            // Close stdin so espeak sees EOF and starts speaking.
            drop(stdin);
        }

        let status = child.wait().await.map_err(SpeechError::Wait)?;
        if status.success() {
            Ok(())
        } else {
            Err(SpeechError::Exit(status))
        }
    }
}

/// Discards all utterances. Used for silent operation and in tests.
pub struct NullSink;

#[async_trait]
impl SpeechSink for NullSink {
    async fn speak(&self, _text: &str) -> Result<(), SpeechError> {
        Ok(())
    }
}

/// Serializes utterances to a speech sink.
///
/// `announce` is infallible from the caller's perspective: a sink error
/// or timeout is logged and the utterance dropped, so a stalled or
/// broken audio path never blocks the presence loop. Delivery is
/// best-effort by design.
pub struct Announcer {
    sink: Box<dyn SpeechSink>,
    timeout: Duration,
}

impl Announcer {
    pub fn new(sink: Box<dyn SpeechSink>, timeout: Duration) -> Self {
        Self { sink, timeout }
    }

    pub async fn announce(&self, text: &str) {
        match tokio::time::timeout(self.timeout, self.sink.speak(text)).await {
            Ok(Ok(())) => {
                tracing::info!(text, "announced");
            }
            Ok(Err(err)) => {
                tracing::warn!(text, error = %err, "speech output failed; dropping announcement");
            }
            Err(_) => {
                tracing::warn!(
                    text,
                    timeout_secs = self.timeout.as_secs(),
                    "speech output timed out; dropping announcement"
                );
            }
        }
    }
}
