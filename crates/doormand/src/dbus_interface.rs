use std::collections::HashSet;

use zbus::interface;

use crate::engine::EngineHandle;

/// Sentinel label emitted by recognizers for faces below the
/// confidence threshold. Never eligible for notification.
const UNKNOWN_LABEL: &str = "unknown";

/// D-Bus interface for the Doorman presence daemon.
///
/// Bus name: org.sovren.Doorman1
/// Object path: /org/sovren/Doorman1
pub struct DoormanService {
    engine: EngineHandle,
    generator_enabled: bool,
    speech_enabled: bool,
}

impl DoormanService {
    pub fn new(engine: EngineHandle, generator_enabled: bool, speech_enabled: bool) -> Self {
        Self {
            engine,
            generator_enabled,
            speech_enabled,
        }
    }
}

#[interface(name = "org.sovren.Doorman1")]
impl DoormanService {
    /// Submit the set of identity labels recognized in the latest
    /// frame. Returns the cycle report as JSON.
    async fn report_presence(&self, labels: Vec<String>) -> zbus::fdo::Result<String> {
        // Boundary contract: empty and sentinel labels never reach the
        // tracker.
        let filtered: HashSet<String> = labels
            .into_iter()
            .filter(|l| !l.is_empty() && !l.eq_ignore_ascii_case(UNKNOWN_LABEL))
            .collect();

        tracing::debug!(labels = filtered.len(), "recognition result received");

        let report = self
            .engine
            .report(filtered)
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;

        serde_json::to_string(&report).map_err(|e| zbus::fdo::Error::Failed(e.to_string()))
    }

    /// Return daemon status information as JSON.
    async fn status(&self) -> zbus::fdo::Result<String> {
        let status = self
            .engine
            .status()
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;

        Ok(serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "present": status.present,
            "known_count": status.known_count,
            "uptime_secs": status.uptime_secs,
            "generator_enabled": self.generator_enabled,
            "speech_enabled": self.speech_enabled,
        })
        .to_string())
    }
}
