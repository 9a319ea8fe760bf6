//! Zonos-v0.1 voice cloning engine implementation.
//!
//! This module provides a Zonos-based cloning engine that uses the ONNX
//! export of the Zonos-v0.1 transformer. The model clones a voice from a
//! short reference sample and supports seven-channel emotion conditioning.
//!
//! # Model Directory Layout
//!
//! ```text
//! models/zonos-v0.1/
//! ├── speaker_encoder.onnx   # reference waveform -> 128-dim speaker embedding
//! ├── generator.onnx         # conditioning + code prefix -> next-step logits
//! ├── autoencoder.onnx       # code matrix -> 44.1kHz waveform
//! └── config.json            # optional text vocabulary (falls back to built-in)
//! ```
//!
//! # Conditioning
//!
//! Generation is steered by a [`Conditioning`](conditioning::Conditioning)
//! structure: text token IDs, an optional speaker embedding, an optional
//! seven-channel emotion vector, and a language tag fixed to `en-us`.
//! Either conditioning signal can be dropped entirely via the
//! unconditional toggles on the request.
//!
//! # Examples
//!
//! ## Direct Engine Use
//!
//! ```rust,no_run
//! use voice_clone_rs::{CloningEngine, VoiceControls};
//! use voice_clone_rs::engines::zonos::ZonosEngine;
//! use std::path::{Path, PathBuf};
//!
//! let mut engine = ZonosEngine::new();
//! engine.load_model(&PathBuf::from("models/zonos-v0.1"))?;
//!
//! let audio = engine.clone_voice(
//!     "Hello, world!",
//!     Some(Path::new("my_voice.wav")),
//!     &VoiceControls::default(),
//!     None,
//! )?;
//! println!("generated {} samples at {}Hz", audio.samples.len(), audio.sample_rate);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## With a Generation Deadline
//!
//! ```rust,no_run
//! use voice_clone_rs::{CloningEngine, VoiceControls};
//! use voice_clone_rs::engines::zonos::{ZonosEngine, ZonosInferenceParams};
//! use std::path::{Path, PathBuf};
//! use std::time::Duration;
//!
//! let mut engine = ZonosEngine::new();
//! engine.load_model(&PathBuf::from("models/zonos-v0.1"))?;
//!
//! let params = ZonosInferenceParams {
//!     timeout: Some(Duration::from_secs(120)),
//!     ..Default::default()
//! };
//! let audio = engine.clone_voice(
//!     "Hello!",
//!     Some(Path::new("my_voice.wav")),
//!     &VoiceControls::default(),
//!     Some(params),
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod audio;
pub mod conditioning;
pub mod engine;
pub mod model;
pub mod vocab;

pub use conditioning::{Conditioning, SpeakerEmbedding};
pub use engine::{ZonosEngine, ZonosInferenceParams, ZonosModelParams};
pub use model::ZonosError;
