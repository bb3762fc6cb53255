//! Voice Capture for ottmarks.
//!
//! One-shot speech-to-text feeding the title field. The recognition engine
//! itself is a [`SpeechRecognizer`]; this module only tracks the listening
//! state and turns the first final result into a [`VoiceOutcome`].

use std::time::Duration;

use crate::types::errors::VoiceError;
use crate::types::settings::VoiceSettings;
use crate::types::voice::{RecognitionResult, VoiceOutcome, VoiceState};

/// A speech-recognition capability.
pub trait SpeechRecognizer {
    fn is_available(&self) -> bool;
    fn start(&mut self, language: &str) -> Result<(), VoiceError>;
    fn stop(&mut self);
}

/// Recognizer living in the UI shell. The shell reports whether the
/// platform has speech recognition and streams results back as events.
#[derive(Debug, Default)]
pub struct HostSpeechRecognizer {
    available: bool,
    active_language: Option<String>,
}

impl HostSpeechRecognizer {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            active_language: None,
        }
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Language of the running session, if any.
    pub fn active_language(&self) -> Option<&str> {
        self.active_language.as_deref()
    }
}

impl SpeechRecognizer for HostSpeechRecognizer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&mut self, language: &str) -> Result<(), VoiceError> {
        self.active_language = Some(language.to_string());
        Ok(())
    }

    fn stop(&mut self) {
        self.active_language = None;
    }
}

/// Picks the highest-confidence alternative; ties go to the earliest.
pub fn best_transcript(result: &RecognitionResult) -> Option<&str> {
    let mut best: Option<&crate::types::voice::Transcript> = None;
    for alt in &result.alternatives {
        match best {
            Some(b) if alt.confidence <= b.confidence => {}
            _ => best = Some(alt),
        }
    }
    best.map(|t| t.text.as_str())
}

/// State machine for a single capture session.
pub struct VoiceCapture<R: SpeechRecognizer> {
    recognizer: R,
    state: VoiceState,
    quick_search: bool,
    language: String,
    quick_search_delay: Duration,
}

impl<R: SpeechRecognizer> VoiceCapture<R> {
    pub fn new(recognizer: R, settings: &VoiceSettings) -> Self {
        Self {
            recognizer,
            state: VoiceState::Idle,
            quick_search: false,
            language: settings.language.clone(),
            quick_search_delay: Duration::from_millis(settings.quick_search_delay_ms),
        }
    }

    /// Picks up new voice settings. A running capture keeps listening; the
    /// language applies from the next start.
    pub fn apply_settings(&mut self, settings: &VoiceSettings) {
        self.language = settings.language.clone();
        self.quick_search_delay = Duration::from_millis(settings.quick_search_delay_ms);
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == VoiceState::Listening
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn recognizer_mut(&mut self) -> &mut R {
        &mut self.recognizer
    }

    /// Starts listening. `quick_search` chains the result into quick search.
    pub fn start(&mut self, quick_search: bool) -> Result<(), VoiceError> {
        if !self.recognizer.is_available() {
            log::warn!("voice capture requested but speech recognition is unavailable");
            return Err(VoiceError::Unsupported);
        }
        if self.is_listening() {
            return Err(VoiceError::AlreadyListening);
        }

        self.recognizer.start(&self.language)?;
        self.quick_search = quick_search;
        self.state = VoiceState::Listening;
        log::debug!("voice capture listening (quick_search={})", quick_search);
        Ok(())
    }

    /// Handles a batch of recognition results.
    ///
    /// The first final result ends the capture. Interim results and results
    /// arriving while idle are ignored.
    pub fn on_result(&mut self, results: &[RecognitionResult]) -> Option<VoiceOutcome> {
        if !self.is_listening() {
            return None;
        }
        let result = results.iter().find(|r| r.is_final)?;
        let text = best_transcript(result).unwrap_or("").trim().to_string();

        self.finish("result");
        if text.is_empty() {
            return None;
        }

        if self.quick_search {
            Some(VoiceOutcome::QuickSearch {
                title: text,
                delay: self.quick_search_delay,
            })
        } else {
            Some(VoiceOutcome::Captured { title: text })
        }
    }

    pub fn on_error(&mut self, message: &str) {
        log::warn!("voice capture error: {}", message);
        self.finish("error");
    }

    /// Natural end of speech.
    pub fn on_end(&mut self) {
        self.finish("end");
    }

    fn finish(&mut self, reason: &str) {
        if self.is_listening() {
            self.recognizer.stop();
            log::debug!("voice capture stopped ({})", reason);
        }
        self.state = VoiceState::Idle;
    }
}
