//! doorman-speech — Greeting composition and speech dispatch.
//!
//! Turns arrival/departure events into short spoken messages. Message
//! text comes from an optional generator backend (OpenAI-compatible
//! chat completions) with a deterministic template fallback; speech
//! goes to a pluggable sink (espeak-ng by default). Both paths are
//! best-effort by design: a failed generation falls back to the
//! template, a failed utterance is logged and dropped.

pub mod announcer;
pub mod composer;
pub mod openai;

pub use announcer::{Announcer, EspeakSink, NullSink, SpeechError, SpeechSink};
pub use composer::{Composer, GeneratorError, MessageGenerator, MessagePrompt};
pub use openai::OpenAiGenerator;
