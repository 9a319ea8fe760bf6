use std::path::Path;

use hound::SampleFormat;

use super::model::ZonosError;

/// Load a reference WAV file as mono f32 samples at its native sample rate.
///
/// Supports 16/24/32-bit integer and 32-bit float PCM. Multi-channel audio
/// is downmixed to mono by averaging. No resampling happens here; the
/// speaker encoder takes the native rate alongside the samples.
pub fn load_reference_wav(path: &Path) -> Result<(Vec<f32>, u32), ZonosError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<Result<Vec<_>, _>>()?,
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8_388_608.0))
            .collect::<Result<Vec<_>, _>>()?,
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2_147_483_648.0))
            .collect::<Result<Vec<_>, _>>()?,
        (format, bits) => {
            return Err(ZonosError::UnsupportedReference(format!(
                "unsupported WAV format: {format:?} {bits}-bit"
            )))
        }
    };

    let mono = if spec.channels <= 1 {
        samples
    } else {
        let ch = spec.channels as usize;
        samples
            .chunks(ch)
            .map(|frame| frame.iter().sum::<f32>() / ch as f32)
            .collect()
    };

    if mono.is_empty() {
        return Err(ZonosError::UnsupportedReference(
            "reference audio contains no samples".to_string(),
        ));
    }

    Ok((mono, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: &[f32]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in frames {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn loads_mono_at_native_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.wav");
        write_wav(&path, 1, 16000, &[0.1, -0.2, 0.3]);

        let (samples, rate) = load_reference_wav(&path).unwrap();
        assert_eq!(rate, 16000);
        assert_eq!(samples, vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn downmixes_stereo_to_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.wav");
        // Two frames of interleaved stereo.
        write_wav(&path, 2, 44100, &[1.0, 0.0, -0.5, 0.5]);

        let (samples, rate) = load_reference_wav(&path).unwrap();
        assert_eq!(rate, 44100);
        assert_eq!(samples, vec![0.5, 0.0]);
    }

    #[test]
    fn rejects_non_audio_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.wav");
        std::fs::write(&path, b"definitely not a wav file").unwrap();

        assert!(load_reference_wav(&path).is_err());
    }
}
