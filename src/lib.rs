//! # voice-clone-rs
//!
//! A Rust library for zero-shot voice cloning using the Zonos engine.
//!
//! ## Features
//!
//! - **Voice cloning**: clone a voice from a short reference sample
//! - **Emotion control**: seven independently weighted emotion channels
//! - **Unconditional modes**: drop the speaker or emotion conditioning entirely
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! voice-clone-rs = { version = "0.1", features = ["zonos"] }
//! ```
//!
//! ```ignore
//! use std::path::PathBuf;
//! use voice_clone_rs::{engines::zonos::ZonosEngine, CloneRequest, CloneSession, CloningEngine};
//!
//! let mut engine = ZonosEngine::new();
//! engine.load_model(&PathBuf::from("models/zonos-v0.1"))?;
//!
//! let mut session = CloneSession::new(engine);
//! let request = CloneRequest::builder()
//!     .sample(std::fs::read("my_voice.wav")?)
//!     .text("Hello, world!")
//!     .build()?;
//!
//! let output = session.generate_voice(&request)?;
//! println!("wrote {}", output.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod engines;
pub mod request;
pub mod session;

pub use request::{CloneRequest, CloneRequestBuilder, EmotionWeights, VoiceControls};
pub use session::{CloneSession, SessionError};

use std::path::Path;

/// The result of a voice cloning run.
///
/// Contains raw f32 audio samples and the sample rate reported by the
/// engine's decoder (not re-derived from the reference input).
#[derive(Debug)]
pub struct ClonedAudio {
    /// Raw audio samples as f32 values
    pub samples: Vec<f32>,
    /// Sample rate of the audio (44100 for Zonos)
    pub sample_rate: u32,
}

impl ClonedAudio {
    /// Write the audio to a 32-bit float WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Common interface for voice cloning engines.
///
/// This trait defines the standard operations that all cloning engines must
/// support. Each engine may have different parameter types for model loading
/// and inference configuration.
pub trait CloningEngine {
    /// Parameters for configuring inference behavior (sampling limits, timeout, etc.)
    type InferenceParams;
    /// Parameters for configuring model loading (threads, etc.)
    type ModelParams: Default;

    /// Load a model from the specified path using default parameters.
    fn load_model(&mut self, model_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.load_model_with_params(model_path, Self::ModelParams::default())
    }

    /// Load a model from the specified path with custom parameters.
    fn load_model_with_params(
        &mut self,
        model_path: &Path,
        params: Self::ModelParams,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Unload the currently loaded model and free associated resources.
    fn unload_model(&mut self);

    /// Clone a voice: speak `text` with the vocal identity of the reference sample.
    ///
    /// `sample_path` points at the persisted reference audio. It may be
    /// `None` only when `controls.unconditional_speaker` is set, in which
    /// case no speaker embedding is extracted.
    fn clone_voice(
        &mut self,
        text: &str,
        sample_path: Option<&Path>,
        controls: &request::VoiceControls,
        params: Option<Self::InferenceParams>,
    ) -> Result<ClonedAudio, Box<dyn std::error::Error>>;
}
