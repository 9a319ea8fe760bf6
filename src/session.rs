//! Voice cloning session handler.
//!
//! A [`CloneSession`] owns a loaded engine for the lifetime of the process
//! and turns [`CloneRequest`]s into an output WAV file. Requests are
//! serialized by construction: `generate_voice` takes `&mut self`, so two
//! generations can never share the temporary or output path.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::request::CloneRequest;
use crate::CloningEngine;

/// Default output file, overwritten on every successful request.
pub const DEFAULT_OUTPUT_PATH: &str = "generated_voice.wav";

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("no reference sample uploaded")]
    MissingSample,
    #[error("no text to synthesize")]
    EmptyText,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("voice generation failed: {0}")]
    Engine(Box<dyn std::error::Error>),
    #[error("failed to write output audio: {0}")]
    OutputWrite(Box<dyn std::error::Error>),
}

/// Drives the fixed generation pipeline against a loaded engine.
///
/// The engine is read-only after construction as far as the session is
/// concerned: no request mutates model state, and a failed request leaves
/// the engine valid for the next attempt.
pub struct CloneSession<E: CloningEngine> {
    engine: E,
    output_path: PathBuf,
}

impl<E: CloningEngine> CloneSession<E> {
    /// Create a session writing to [`DEFAULT_OUTPUT_PATH`].
    pub fn new(engine: E) -> Self {
        Self::with_output_path(engine, DEFAULT_OUTPUT_PATH)
    }

    /// Create a session writing to a custom output path.
    pub fn with_output_path(engine: E, output_path: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            output_path: output_path.into(),
        }
    }

    /// The engine this session drives.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Where the next successful request will write its audio.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Run one generation with the engine's default inference parameters.
    pub fn generate_voice(&mut self, request: &CloneRequest) -> Result<PathBuf, SessionError> {
        self.generate_voice_with_params(request, None)
    }

    /// Run one generation.
    ///
    /// Guards: a reference sample must be present and the text must be
    /// non-empty; otherwise the pipeline never starts. Everything else
    /// (slider values, toggle combinations, text content) is forwarded to
    /// the engine unvalidated.
    ///
    /// On success the output file has been overwritten with the new audio
    /// and its path is returned. On failure no partial output is written;
    /// output from an earlier successful request may still be on disk.
    pub fn generate_voice_with_params(
        &mut self,
        request: &CloneRequest,
        params: Option<E::InferenceParams>,
    ) -> Result<PathBuf, SessionError> {
        let sample = request.sample.as_deref().ok_or(SessionError::MissingSample)?;
        if request.text.is_empty() {
            return Err(SessionError::EmptyText);
        }

        // Persist the upload to a scoped temp file; the guard removes it on
        // every exit path, success or failure.
        let mut temp = tempfile::Builder::new()
            .prefix("voice-clone-")
            .suffix(".wav")
            .tempfile()?;
        temp.write_all(sample)?;
        temp.flush()?;

        log::info!(
            "generating: {} bytes of reference audio, {} chars of text",
            sample.len(),
            request.text.len()
        );

        let controls = request.controls();
        let audio = self
            .engine
            .clone_voice(&request.text, Some(temp.path()), &controls, params)
            .map_err(SessionError::Engine)?;

        audio
            .write_wav(&self.output_path)
            .map_err(SessionError::OutputWrite)?;

        log::info!(
            "wrote {:.2}s of audio to {}",
            audio.duration_secs(),
            self.output_path.display()
        );

        Ok(self.output_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{CloneRequest, EmotionWeights, VoiceControls};
    use crate::ClonedAudio;

    #[derive(Debug)]
    struct RecordedCall {
        text: String,
        sample_path: Option<PathBuf>,
        sample_existed: bool,
        controls: VoiceControls,
    }

    /// Engine that records every call and emits one sample per text byte.
    #[derive(Default)]
    struct MockEngine {
        calls: Vec<RecordedCall>,
        fail: bool,
    }

    impl CloningEngine for MockEngine {
        type InferenceParams = ();
        type ModelParams = ();

        fn load_model_with_params(
            &mut self,
            _model_path: &Path,
            _params: (),
        ) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }

        fn unload_model(&mut self) {}

        fn clone_voice(
            &mut self,
            text: &str,
            sample_path: Option<&Path>,
            controls: &VoiceControls,
            _params: Option<()>,
        ) -> Result<ClonedAudio, Box<dyn std::error::Error>> {
            self.calls.push(RecordedCall {
                text: text.to_string(),
                sample_path: sample_path.map(Path::to_path_buf),
                sample_existed: sample_path.map(Path::exists).unwrap_or(false),
                controls: controls.clone(),
            });
            if self.fail {
                return Err("mock failure".into());
            }
            Ok(ClonedAudio {
                samples: vec![0.25; text.len()],
                sample_rate: 44100,
            })
        }
    }

    fn session_in(dir: &tempfile::TempDir) -> CloneSession<MockEngine> {
        CloneSession::with_output_path(MockEngine::default(), dir.path().join("out.wav"))
    }

    fn request_with(text: &str) -> CloneRequest {
        CloneRequest::builder()
            .sample(vec![1u8, 2, 3, 4])
            .text(text)
            .build()
            .unwrap()
    }

    #[test]
    fn missing_sample_never_reaches_engine() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);
        let request = CloneRequest::builder().text("hello").build().unwrap();

        let err = session.generate_voice(&request).unwrap_err();
        assert!(matches!(err, SessionError::MissingSample));
        assert!(session.engine().calls.is_empty());
        assert!(!session.output_path().exists());
    }

    #[test]
    fn empty_text_never_reaches_engine() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);
        let request = CloneRequest::builder().sample(vec![0u8; 8]).build().unwrap();

        let err = session.generate_voice(&request).unwrap_err();
        assert!(matches!(err, SessionError::EmptyText));
        assert!(session.engine().calls.is_empty());
    }

    #[test]
    fn sample_is_persisted_for_the_engine_and_cleaned_up_after() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);

        session.generate_voice(&request_with("hi")).unwrap();

        let call = &session.engine().calls[0];
        assert_eq!(call.text, "hi");
        assert!(call.sample_existed, "temp file must exist during the call");
        let temp_path = call.sample_path.as_ref().unwrap();
        assert_eq!(temp_path.extension().and_then(|e| e.to_str()), Some("wav"));
        assert!(!temp_path.exists(), "temp file must be removed afterwards");
    }

    #[test]
    fn controls_are_forwarded_unvalidated() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);

        let request = CloneRequest::builder()
            .sample(vec![0u8; 8])
            .text("hi")
            .emotion(EmotionWeights {
                happiness: 1.0,
                sadness: 1.0,
                disgust: 1.0,
                fear: 1.0,
                surprise: 1.0,
                anger: 1.0,
                neutral: 1.0,
            })
            .unconditional_emotion(true)
            .build()
            .unwrap();
        session.generate_voice(&request).unwrap();

        let controls = &session.engine().calls[0].controls;
        assert_eq!(controls.emotion.as_array(), [1.0; 7]);
        assert!(controls.unconditional_emotion);
        assert!(!controls.unconditional_speaker);
    }

    #[test]
    fn consecutive_requests_overwrite_the_single_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(&dir);

        let first = session.generate_voice(&request_with("one")).unwrap();
        let first_len = hound::WavReader::open(&first).unwrap().len();

        let second = session.generate_voice(&request_with("second")).unwrap();
        let second_len = hound::WavReader::open(&second).unwrap().len();

        assert_eq!(first, second, "both requests write the same path");
        assert_eq!(first_len, 3);
        assert_eq!(second_len, 6, "latest request wins");
    }

    #[test]
    fn engine_failure_surfaces_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let engine = MockEngine {
            fail: true,
            ..Default::default()
        };
        let mut session = CloneSession::with_output_path(engine, dir.path().join("out.wav"));

        let err = session.generate_voice(&request_with("hi")).unwrap_err();
        assert!(matches!(err, SessionError::Engine(_)));
        assert!(!session.output_path().exists());
    }
}
