use crate::request::VoiceControls;

use super::model::{ZonosError, EMOTION_DIM, SPEAKER_DIM};

/// Language tags the generator was trained on, paired with their IDs.
const LANGUAGES: &[(&str, i64)] = &[("en-us", 0)];

/// A fixed-dimension vector representing a voice's identity characteristics.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerEmbedding(Vec<f32>);

impl SpeakerEmbedding {
    /// Wrap a raw embedding, checking its dimension.
    pub fn new(values: Vec<f32>) -> Result<Self, ZonosError> {
        if values.len() != SPEAKER_DIM {
            return Err(ZonosError::EmbeddingDim {
                expected: SPEAKER_DIM,
                got: values.len(),
            });
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Everything the generator is steered by for one request.
///
/// Built fresh per request and consumed immediately. The unconditional
/// toggles are applied here: when set, the corresponding signal is absent
/// from the structure no matter what else the request carried.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditioning {
    /// Text token IDs from the vocabulary.
    pub text_ids: Vec<i64>,
    /// Speaker embedding, absent in unconditional-speaker mode.
    pub speaker: Option<SpeakerEmbedding>,
    /// Emotion weights, absent in unconditional-emotion mode.
    pub emotion: Option<[f32; EMOTION_DIM]>,
    /// Generator language ID.
    pub language_id: i64,
}

impl Conditioning {
    /// Combine the request pieces into one conditioning structure.
    pub fn build(
        text_ids: Vec<i64>,
        speaker: Option<SpeakerEmbedding>,
        controls: &VoiceControls,
    ) -> Result<Self, ZonosError> {
        let language_id = language_id(&controls.language)?;
        Ok(Self {
            text_ids,
            speaker: if controls.unconditional_speaker {
                None
            } else {
                speaker
            },
            emotion: if controls.unconditional_emotion {
                None
            } else {
                Some(controls.emotion.as_array())
            },
            language_id,
        })
    }
}

fn language_id(tag: &str) -> Result<i64, ZonosError> {
    LANGUAGES
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, id)| *id)
        .ok_or_else(|| ZonosError::UnsupportedLanguage(tag.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::EmotionWeights;

    fn embedding() -> SpeakerEmbedding {
        SpeakerEmbedding::new(vec![0.5; SPEAKER_DIM]).unwrap()
    }

    #[test]
    fn embedding_dimension_is_enforced() {
        let err = SpeakerEmbedding::new(vec![0.0; 3]).unwrap_err();
        assert!(matches!(
            err,
            ZonosError::EmbeddingDim { expected, got: 3 } if expected == SPEAKER_DIM
        ));
    }

    #[test]
    fn unconditional_speaker_drops_embedding_even_when_present() {
        let controls = VoiceControls {
            unconditional_speaker: true,
            ..Default::default()
        };
        let cond = Conditioning::build(vec![1, 2], Some(embedding()), &controls).unwrap();
        assert!(cond.speaker.is_none());
        assert!(cond.emotion.is_some());
    }

    #[test]
    fn unconditional_emotion_drops_weights_regardless_of_sliders() {
        let controls = VoiceControls {
            unconditional_emotion: true,
            emotion: EmotionWeights {
                happiness: 1.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let cond = Conditioning::build(vec![1], Some(embedding()), &controls).unwrap();
        assert!(cond.emotion.is_none());
        assert_eq!(cond.speaker, Some(embedding()));
    }

    #[test]
    fn default_controls_keep_both_signals() {
        let controls = VoiceControls::default();
        let cond = Conditioning::build(vec![7], Some(embedding()), &controls).unwrap();
        assert!(cond.speaker.is_some());
        assert_eq!(
            cond.emotion,
            Some([0.1, 0.05, 0.05, 0.05, 0.05, 0.05, 0.2])
        );
        assert_eq!(cond.language_id, 0);
    }

    #[test]
    fn unknown_language_is_rejected() {
        let controls = VoiceControls {
            language: "fr".to_string(),
            ..Default::default()
        };
        let err = Conditioning::build(vec![1], None, &controls).unwrap_err();
        assert!(matches!(err, ZonosError::UnsupportedLanguage(_)));
    }
}
