use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use ndarray::{Array1, Array2, Array3, Axis};
use ort::execution_providers::CPUExecutionProvider;
use ort::inputs;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use super::conditioning::{Conditioning, SpeakerEmbedding};

/// Speaker embedding dimension for Zonos.
pub const SPEAKER_DIM: usize = 128;

/// Number of emotion channels.
pub const EMOTION_DIM: usize = 7;

/// Number of parallel codebooks in the code matrix.
pub const NUM_CODEBOOKS: usize = 9;

/// Audio codes per codebook occupy `0..CODEBOOK_SIZE`; BOS and EOS follow.
pub const CODEBOOK_SIZE: i64 = 1024;

/// Start-of-sequence code, prepended to every generation prefix.
pub const BOS_CODE: i64 = CODEBOOK_SIZE;

/// End-of-sequence code on codebook 0 terminates generation.
pub const EOS_CODE: i64 = CODEBOOK_SIZE + 1;

/// Output sample rate of the Zonos autoencoder.
pub const SAMPLE_RATE: u32 = 44100;

/// Default cap on generated code steps (~30s of audio at 86 steps/s).
pub const DEFAULT_MAX_NEW_TOKENS: usize = 2580;

const SPEAKER_ENCODER_FILE: &str = "speaker_encoder.onnx";
const GENERATOR_FILE: &str = "generator.onnx";
const AUTOENCODER_FILE: &str = "autoencoder.onnx";

#[derive(thiserror::Error, Debug)]
pub enum ZonosError {
    #[error("ONNX runtime error: {0}")]
    Ort(#[from] ort::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("WAV decode error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Cannot decode reference audio: {0}")]
    UnsupportedReference(String),
    #[error("Invalid config.json: {0}")]
    Config(String),
    #[error("Language '{0}' is not supported; only 'en-us' is available")]
    UnsupportedLanguage(String),
    #[error("Speaker embedding has {got} values, expected {expected}")]
    EmbeddingDim { expected: usize, got: usize },
    #[error("A reference sample is required unless unconditional speaker mode is set")]
    MissingReference,
    #[error("Generation exceeded its deadline after {0} steps")]
    GenerationTimeout(usize),
    #[error("Generation was cancelled after {0} steps")]
    Cancelled(usize),
    #[error("Model not loaded. Call load_model() first.")]
    ModelNotLoaded,
}

/// Internal Zonos ONNX model state: the three pipeline components plus the
/// text vocabulary.
pub struct ZonosModel {
    speaker_encoder: Session,
    generator: Session,
    autoencoder: Session,
    vocab: HashMap<char, i64>,
}

impl ZonosModel {
    /// Load the Zonos model from a directory.
    ///
    /// The directory must contain:
    /// - `speaker_encoder.onnx`
    /// - `generator.onnx`
    /// - `autoencoder.onnx`
    /// - Optionally a `config.json` for vocabulary (falls back to built-in)
    pub fn load(
        model_dir: &Path,
        num_threads: Option<usize>,
        optimized_cache_dir: Option<&Path>,
    ) -> Result<Self, ZonosError> {
        log::info!("Loading Zonos model from {}", model_dir.display());

        let speaker_encoder = init_session(
            &locate_component(model_dir, SPEAKER_ENCODER_FILE)?,
            num_threads,
            optimized_cache_dir,
        )?;
        let generator = init_session(
            &locate_component(model_dir, GENERATOR_FILE)?,
            num_threads,
            optimized_cache_dir,
        )?;
        let autoencoder = init_session(
            &locate_component(model_dir, AUTOENCODER_FILE)?,
            num_threads,
            optimized_cache_dir,
        )?;

        let config_path = model_dir.join("config.json");
        let vocab = if config_path.exists() {
            log::info!("Loading vocab from config.json");
            super::vocab::load_vocab(&config_path)?
        } else {
            log::warn!("config.json not found, using built-in vocab");
            super::vocab::hardcoded_vocab()
        };

        Ok(Self {
            speaker_encoder,
            generator,
            autoencoder,
            vocab,
        })
    }

    /// The text vocabulary in effect for this model.
    pub fn vocab(&self) -> &HashMap<char, i64> {
        &self.vocab
    }

    /// Extract a speaker embedding from a reference waveform at its native
    /// sample rate.
    pub fn extract_speaker_embedding(
        &mut self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<SpeakerEmbedding, ZonosError> {
        let waveform = Array2::from_shape_vec((1, samples.len()), samples.to_vec())?;
        let rate = Array1::from_vec(vec![sample_rate as i64]);

        let outputs = self.speaker_encoder.run(inputs![
            "waveform" => TensorRef::from_array_view(waveform.view())?,
            "sample_rate" => TensorRef::from_array_view(rate.view())?,
        ])?;

        let first = outputs
            .iter()
            .next()
            .ok_or_else(|| ZonosError::Ort(ort::Error::new("No output from speaker encoder")))?;
        let embedding = first.1.try_extract_array::<f32>()?;
        let values = embedding.as_slice().unwrap_or(&[]).to_vec();

        SpeakerEmbedding::new(values)
    }

    /// Autoregressively generate the code matrix for one request.
    ///
    /// Runs at most `max_new_tokens` steps, stopping early on the EOS code.
    /// The deadline and the cancellation flag are checked once per step, so
    /// a hung request can always be bounded or aborted between steps.
    pub fn generate(
        &mut self,
        cond: &Conditioning,
        max_new_tokens: usize,
        deadline: Option<Instant>,
        cancel: Option<&AtomicBool>,
    ) -> Result<Array2<i64>, ZonosError> {
        if cond.text_ids.is_empty() {
            log::warn!("No text tokens produced; returning empty codes");
            return Ok(Array2::zeros((NUM_CODEBOOKS, 0)));
        }

        let text_ids = Array2::from_shape_vec((1, cond.text_ids.len()), cond.text_ids.clone())?;
        let speaker = match &cond.speaker {
            Some(embedding) => Array2::from_shape_vec((1, SPEAKER_DIM), embedding.as_slice().to_vec())?,
            None => Array2::zeros((1, SPEAKER_DIM)),
        };
        let speaker_mask = Array1::from_vec(vec![cond.speaker.is_some() as i64]);
        let emotion = match &cond.emotion {
            Some(weights) => Array2::from_shape_vec((1, EMOTION_DIM), weights.to_vec())?,
            None => Array2::zeros((1, EMOTION_DIM)),
        };
        let emotion_mask = Array1::from_vec(vec![cond.emotion.is_some() as i64]);
        let language_id = Array1::from_vec(vec![cond.language_id]);

        // Prefix starts with a BOS column; generated columns are appended.
        let mut steps: Vec<[i64; NUM_CODEBOOKS]> = vec![[BOS_CODE; NUM_CODEBOOKS]];
        let started = Instant::now();

        for step in 0..max_new_tokens {
            if let Some(cancel) = cancel {
                if cancel.load(Ordering::Relaxed) {
                    return Err(ZonosError::Cancelled(step));
                }
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(ZonosError::GenerationTimeout(step));
                }
            }

            let codes = codes_tensor(&steps)?;
            let outputs = self.generator.run(inputs![
                "text_ids" => TensorRef::from_array_view(text_ids.view())?,
                "speaker" => TensorRef::from_array_view(speaker.view())?,
                "speaker_mask" => TensorRef::from_array_view(speaker_mask.view())?,
                "emotion" => TensorRef::from_array_view(emotion.view())?,
                "emotion_mask" => TensorRef::from_array_view(emotion_mask.view())?,
                "language_id" => TensorRef::from_array_view(language_id.view())?,
                "codes" => TensorRef::from_array_view(codes.view())?,
            ])?;

            let first = outputs
                .iter()
                .next()
                .ok_or_else(|| ZonosError::Ort(ort::Error::new("No output from generator")))?;
            let logits = first.1.try_extract_array::<f32>()?;
            // Expected shape: [1, NUM_CODEBOOKS, step_vocab]
            let logits = logits.index_axis_move(Axis(0), 0);

            let mut next = [0i64; NUM_CODEBOOKS];
            for (q, row) in logits.axis_iter(Axis(0)).enumerate().take(NUM_CODEBOOKS) {
                let row = row.to_owned();
                next[q] = argmax(row.as_slice().unwrap_or(&[])) as i64;
            }

            if next[0] == EOS_CODE {
                break;
            }
            steps.push(next);
        }

        let generated = steps.len() - 1;
        log::debug!(
            "Generated {} code steps in {:.2?}",
            generated,
            started.elapsed()
        );

        // Drop the BOS column; the decoder only sees audio codes.
        let mut codes = Array2::zeros((NUM_CODEBOOKS, generated));
        for (t, column) in steps[1..].iter().enumerate() {
            for (q, &code) in column.iter().enumerate() {
                codes[(q, t)] = code;
            }
        }
        Ok(codes)
    }

    /// Decode a code matrix to a waveform at the autoencoder's native rate.
    pub fn decode(&mut self, codes: &Array2<i64>) -> Result<Vec<f32>, ZonosError> {
        if codes.ncols() == 0 {
            return Ok(Vec::new());
        }

        let batched = codes
            .to_owned()
            .insert_axis(Axis(0));
        let outputs = self.autoencoder.run(inputs![
            "codes" => TensorRef::from_array_view(batched.view())?,
        ])?;

        let first = outputs
            .iter()
            .next()
            .ok_or_else(|| ZonosError::Ort(ort::Error::new("No output from autoencoder")))?;
        let waveform = first.1.try_extract_array::<f32>()?;

        Ok(waveform.iter().copied().collect())
    }
}

/// Resolve one ONNX component inside the model directory.
fn locate_component(model_dir: &Path, file_name: &str) -> Result<PathBuf, ZonosError> {
    let path = model_dir.join(file_name);
    if path.exists() {
        return Ok(path);
    }
    Err(ZonosError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!(
            "{} not found in {}. The model directory must contain \
             speaker_encoder.onnx, generator.onnx and autoencoder.onnx.",
            file_name,
            model_dir.display()
        ),
    )))
}

/// Initialize an ONNX session with optional on-disk graph caching.
///
/// The first time a component is loaded, ORT runs Level3 graph optimization
/// and serialises the result into `optimized_cache_dir`. Every subsequent
/// load reads the pre-optimized file directly at `Disable` optimization
/// level, cutting cold-start time.
///
/// If `optimized_cache_dir` is `None` the component is always loaded at
/// Level3, which is useful for unit-testing or read-only deployments.
fn init_session(
    onnx_path: &Path,
    num_threads: Option<usize>,
    optimized_cache_dir: Option<&Path>,
) -> Result<Session, ZonosError> {
    let providers = vec![CPUExecutionProvider::default().build()];

    let cache_path = optimized_cache_dir.map(|dir| {
        let stem = onnx_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("component");
        dir.join(format!("{stem}.opt.onnx"))
    });

    let (load_path, opt_level, write_cache) = match &cache_path {
        Some(cache) if cache.exists() => {
            log::info!(
                "Loading pre-optimized graph from {} — skipping Level3",
                cache.display()
            );
            (cache.clone(), GraphOptimizationLevel::Disable, false)
        }
        Some(cache) => {
            log::info!(
                "First load: running Level3 optimization; saving graph to {}",
                cache.display()
            );
            (onnx_path.to_path_buf(), GraphOptimizationLevel::Level3, true)
        }
        None => (onnx_path.to_path_buf(), GraphOptimizationLevel::Level3, false),
    };

    let mut builder = Session::builder()?
        .with_optimization_level(opt_level)?
        .with_execution_providers(providers)?
        .with_parallel_execution(true)?;

    if write_cache {
        let cache = cache_path.as_ref().unwrap();
        builder = builder.with_optimized_model_path(cache)?;
    }

    if let Some(threads) = num_threads {
        builder = builder
            .with_intra_threads(threads)?
            .with_inter_threads(threads)?;
    }

    Ok(builder.commit_from_file(&load_path)?)
}

/// Index of the largest logit; ties resolve to the first occurrence.
fn argmax(row: &[f32]) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for (i, &v) in row.iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

/// Pack generation steps into a `[1, NUM_CODEBOOKS, t]` tensor.
fn codes_tensor(steps: &[[i64; NUM_CODEBOOKS]]) -> Result<Array3<i64>, ZonosError> {
    let t = steps.len();
    let mut flat = vec![0i64; NUM_CODEBOOKS * t];
    for (s, column) in steps.iter().enumerate() {
        for (q, &code) in column.iter().enumerate() {
            flat[q * t + s] = code;
        }
    }
    Ok(Array3::from_shape_vec((1, NUM_CODEBOOKS, t), flat)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_of_equal_logits() {
        assert_eq!(argmax(&[0.0, 1.0, 1.0]), 1);
        assert_eq!(argmax(&[3.0, -1.0]), 0);
        assert_eq!(argmax(&[]), 0);
    }

    #[test]
    fn codes_tensor_lays_codebooks_out_row_major() {
        let steps = [[10i64; NUM_CODEBOOKS], {
            let mut col = [0i64; NUM_CODEBOOKS];
            col[0] = 1;
            col[8] = 9;
            col
        }];
        let tensor = codes_tensor(&steps).unwrap();
        assert_eq!(tensor.shape(), &[1, NUM_CODEBOOKS, 2]);
        assert_eq!(tensor[(0, 0, 0)], 10);
        assert_eq!(tensor[(0, 0, 1)], 1);
        assert_eq!(tensor[(0, 8, 1)], 9);
    }

    #[test]
    fn missing_component_error_names_the_layout() {
        let dir = tempfile::tempdir().unwrap();
        let err = locate_component(dir.path(), GENERATOR_FILE).unwrap_err();
        assert!(err.to_string().contains("generator.onnx"));
    }
}
