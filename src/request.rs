//! Request types for a voice cloning run.
//!
//! A [`CloneRequest`] carries everything a single generation needs: the raw
//! bytes of the reference sample, the text to speak, the emotion weights and
//! the two unconditional toggles. Values are accepted as-is; validation of
//! the trigger conditions happens in the session, not here.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default language tag. No other language is selectable.
pub const DEFAULT_LANGUAGE: &str = "en-us";

/// Seven independently weighted emotion channels.
///
/// Each weight is expected in `[0.0, 1.0]` but is passed to the engine
/// unvalidated and unnormalized; the weights need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionWeights {
    pub happiness: f32,
    pub sadness: f32,
    pub disgust: f32,
    pub fear: f32,
    pub surprise: f32,
    pub anger: f32,
    pub neutral: f32,
}

impl Default for EmotionWeights {
    fn default() -> Self {
        Self {
            happiness: 0.1,
            sadness: 0.05,
            disgust: 0.05,
            fear: 0.05,
            surprise: 0.05,
            anger: 0.05,
            neutral: 0.2,
        }
    }
}

impl EmotionWeights {
    /// Flatten into the channel order the engine expects.
    pub fn as_array(&self) -> [f32; 7] {
        [
            self.happiness,
            self.sadness,
            self.disgust,
            self.fear,
            self.surprise,
            self.anger,
            self.neutral,
        ]
    }
}

/// Conditioning controls forwarded to the engine alongside the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceControls {
    /// Emotion weights. Ignored by the engine when `unconditional_emotion` is set.
    pub emotion: EmotionWeights,
    /// Generate without any speaker embedding, even if a sample is present.
    pub unconditional_speaker: bool,
    /// Generate without any emotion vector, regardless of the weights.
    pub unconditional_emotion: bool,
    /// Language tag. Fixed to `"en-us"`.
    pub language: String,
}

impl Default for VoiceControls {
    fn default() -> Self {
        Self {
            emotion: EmotionWeights::default(),
            unconditional_speaker: false,
            unconditional_emotion: false,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// A single voice cloning request.
///
/// Built with [`CloneRequestBuilder`]; every field has a default so a
/// request can be assembled incrementally the way form state is.
///
/// ```
/// use voice_clone_rs::CloneRequest;
///
/// let request = CloneRequest::builder()
///     .sample(vec![0u8; 4])
///     .text("Hello, world!")
///     .unconditional_emotion(true)
///     .build()
///     .unwrap();
/// assert!(request.sample.is_some());
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), default)]
pub struct CloneRequest {
    /// Raw bytes of the uploaded reference sample (`.wav` or `.mp3`).
    /// `None` when nothing has been uploaded yet.
    #[builder(setter(strip_option))]
    pub sample: Option<Vec<u8>>,
    /// Text to synthesize. May be empty; the session guard rejects it then.
    pub text: String,
    /// Emotion weights, one slider per channel.
    pub emotion: EmotionWeights,
    /// Generate without a speaker embedding.
    pub unconditional_speaker: bool,
    /// Generate without an emotion vector.
    pub unconditional_emotion: bool,
    /// Language tag, fixed to `"en-us"`.
    #[builder(default = "DEFAULT_LANGUAGE.to_string()")]
    pub language: String,
}

impl Default for CloneRequest {
    fn default() -> Self {
        Self {
            sample: None,
            text: String::new(),
            emotion: EmotionWeights::default(),
            unconditional_speaker: false,
            unconditional_emotion: false,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl CloneRequest {
    /// Start building a request from defaults.
    pub fn builder() -> CloneRequestBuilder {
        CloneRequestBuilder::default()
    }

    /// The conditioning controls carried by this request.
    pub fn controls(&self) -> VoiceControls {
        VoiceControls {
            emotion: self.emotion,
            unconditional_speaker: self.unconditional_speaker,
            unconditional_emotion: self.unconditional_emotion,
            language: self.language.clone(),
        }
    }
}
