use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::request::VoiceControls;
use crate::{ClonedAudio, CloningEngine};

use super::conditioning::Conditioning;
use super::model::{ZonosError, ZonosModel, DEFAULT_MAX_NEW_TOKENS, SAMPLE_RATE};
use super::{audio, vocab};

/// Parameters for configuring Zonos model loading.
#[derive(Debug, Clone, Default)]
pub struct ZonosModelParams {
    /// Number of CPU threads to use for inference.
    /// `None` uses the ORT default (typically all available cores).
    pub num_threads: Option<usize>,
    /// Directory for caching Level3-optimized ONNX graphs, one file per
    /// pipeline component.
    ///
    /// - First load: ORT runs Level3 optimization and serialises the results here.
    /// - Subsequent loads: the pre-built graphs are loaded at `Disable`
    ///   optimization, skipping the expensive re-optimization step entirely.
    ///
    /// Always point at a writable location (e.g. app data dir); bundled
    /// resource directories may be read-only.
    pub optimized_model_cache_dir: Option<PathBuf>,
}

/// Parameters for configuring a Zonos generation request.
#[derive(Debug, Clone)]
pub struct ZonosInferenceParams {
    /// Cap on generated code steps. Default covers roughly 30s of audio.
    pub max_new_tokens: usize,
    /// Wall-clock budget for the generation loop. `None` means unbounded.
    /// Checked between autoregressive steps, not inside a single ONNX run.
    pub timeout: Option<Duration>,
    /// Cooperative cancellation flag, checked between autoregressive steps.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ZonosInferenceParams {
    fn default() -> Self {
        Self {
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            timeout: None,
            cancel: None,
        }
    }
}

/// Zonos voice cloning engine.
///
/// Uses the ONNX export of Zonos-v0.1 to clone a voice from a short
/// reference sample, with seven-channel emotion conditioning and optional
/// unconditional speaker/emotion modes.
///
/// # Quick Start
///
/// ```rust,no_run
/// use voice_clone_rs::{CloningEngine, VoiceControls};
/// use voice_clone_rs::engines::zonos::ZonosEngine;
/// use std::path::{Path, PathBuf};
///
/// let mut engine = ZonosEngine::new();
/// engine.load_model(&PathBuf::from("models/zonos-v0.1"))?;
/// let audio = engine.clone_voice(
///     "Hello, world!",
///     Some(Path::new("my_voice.wav")),
///     &VoiceControls::default(),
///     None,
/// )?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ZonosEngine {
    model: Option<ZonosModel>,
    model_path: Option<PathBuf>,
}

impl Default for ZonosEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ZonosEngine {
    /// Create a new engine with no model loaded.
    pub fn new() -> Self {
        Self {
            model: None,
            model_path: None,
        }
    }

    /// Path the current model was loaded from, if any.
    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }
}

impl Drop for ZonosEngine {
    fn drop(&mut self) {
        self.unload_model();
    }
}

impl CloningEngine for ZonosEngine {
    type InferenceParams = ZonosInferenceParams;
    type ModelParams = ZonosModelParams;

    fn load_model_with_params(
        &mut self,
        model_path: &Path,
        params: Self::ModelParams,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let model = ZonosModel::load(
            model_path,
            params.num_threads,
            params.optimized_model_cache_dir.as_deref(),
        )?;
        self.model = Some(model);
        self.model_path = Some(model_path.to_path_buf());
        Ok(())
    }

    fn unload_model(&mut self) {
        self.model = None;
        self.model_path = None;
    }

    fn clone_voice(
        &mut self,
        text: &str,
        sample_path: Option<&Path>,
        controls: &VoiceControls,
        params: Option<Self::InferenceParams>,
    ) -> Result<ClonedAudio, Box<dyn std::error::Error>> {
        let model = self.model.as_mut().ok_or(ZonosError::ModelNotLoaded)?;
        let p = params.unwrap_or_default();

        // Speaker embedding extraction is skipped entirely in
        // unconditional-speaker mode; the sample is not even decoded.
        let speaker = if controls.unconditional_speaker {
            None
        } else {
            let path = sample_path.ok_or(ZonosError::MissingReference)?;
            let (samples, sample_rate) = audio::load_reference_wav(path)?;
            log::debug!(
                "Reference: {} samples at {}Hz",
                samples.len(),
                sample_rate
            );
            Some(model.extract_speaker_embedding(&samples, sample_rate)?)
        };

        let text_ids = vocab::tokenize(text, model.vocab());
        let cond = Conditioning::build(text_ids, speaker, controls)?;

        let deadline = p.timeout.map(|t| Instant::now() + t);
        let codes = model.generate(&cond, p.max_new_tokens, deadline, p.cancel.as_deref())?;
        let samples = model.decode(&codes)?;

        Ok(ClonedAudio {
            samples,
            sample_rate: SAMPLE_RATE,
        })
    }
}
