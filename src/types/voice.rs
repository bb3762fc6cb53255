use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One recognition hypothesis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    pub text: String,
    #[serde(default)]
    pub confidence: f32,
}

/// A recognition result as delivered by the speech engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognitionResult {
    pub alternatives: Vec<Transcript>,
    #[serde(default = "default_final")]
    pub is_final: bool,
}

fn default_final() -> bool {
    true
}

/// Listening state of a voice capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,
    Listening,
}

/// What a finished capture produced.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceOutcome {
    /// The transcript became the pending title.
    Captured { title: String },
    /// The transcript became the pending title and quick search should be
    /// submitted after `delay`.
    QuickSearch { title: String, delay: Duration },
}

impl VoiceOutcome {
    pub fn title(&self) -> &str {
        match self {
            VoiceOutcome::Captured { title } | VoiceOutcome::QuickSearch { title, .. } => title,
        }
    }
}
