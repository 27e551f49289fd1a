//! Device-capability seams for audio playback and speech capture.
//!
//! Browser speech APIs are process-global singletons; the core never touches
//! them directly. Implementations live with the platform layer and expose
//! explicit start/stop with future-based completion. Whether a spoken
//! answer was correct is judged outside the core and arrives through
//! `SessionRunner::record_answer`.

#[derive(Debug, Clone)]
pub struct SpeechTranscript {
    pub transcript: String,
    pub confidence: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("audio device unavailable: {0}")]
    Unavailable(String),
    #[error("capture cancelled")]
    Cancelled,
}

/// Text-to-speech / clip playback. `speak` and `play` resolve when playback
/// finishes; `stop` interrupts an in-flight utterance.
#[allow(async_fn_in_trait)]
pub trait AudioPlayback {
    async fn speak(&self, text: &str) -> Result<(), AudioError>;
    async fn play(&self, url: &str) -> Result<(), AudioError>;
    fn stop(&self);
}

/// Speech recognition. `listen` resolves with the final transcript of one
/// utterance; `stop` aborts the capture, resolving the pending future with
/// `Cancelled`.
#[allow(async_fn_in_trait)]
pub trait SpeechCapture {
    async fn listen(&self) -> Result<SpeechTranscript, AudioError>;
    fn stop(&self);
}

/// No-op double for tests and headless embedders: playback completes
/// immediately, capture yields an empty transcript.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioPlayback for SilentAudio {
    async fn speak(&self, _text: &str) -> Result<(), AudioError> {
        Ok(())
    }

    async fn play(&self, _url: &str) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop(&self) {}
}

impl SpeechCapture for SilentAudio {
    async fn listen(&self) -> Result<SpeechTranscript, AudioError> {
        Ok(SpeechTranscript {
            transcript: String::new(),
            confidence: 0.0,
        })
    }

    fn stop(&self) {}
}
