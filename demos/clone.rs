use std::path::PathBuf;
use std::time::Instant;

use voice_clone_rs::{
    engines::zonos::{ZonosEngine, ZonosModelParams},
    CloneRequest, CloneSession, CloningEngine, EmotionWeights,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let model_path = PathBuf::from(args.next().unwrap_or_else(|| "models/zonos-v0.1".into()));
    let reference = PathBuf::from(args.next().unwrap_or_else(|| "reference.wav".into()));
    let text = args.next().unwrap_or_else(|| {
        "Hello! This is a cloned voice speaking. \
         Upload a short sample and the generated speech will match it."
            .into()
    });

    let mut engine = ZonosEngine::new();
    let load_start = Instant::now();
    engine.load_model_with_params(&model_path, ZonosModelParams::default())?;
    println!("Model loaded in {:.2?}", load_start.elapsed());

    let mut session = CloneSession::new(engine);

    let request = CloneRequest::builder()
        .sample(std::fs::read(&reference)?)
        .text(text)
        .emotion(EmotionWeights {
            happiness: 0.3,
            ..Default::default()
        })
        .build()?;

    let gen_start = Instant::now();
    let output = session.generate_voice(&request)?;
    let gen_dur = gen_start.elapsed();

    let reader = hound::WavReader::open(&output)?;
    let audio_duration = reader.duration() as f64 / reader.spec().sample_rate as f64;
    let speedup = audio_duration / gen_dur.as_secs_f64();
    println!(
        "Generated {:.2}s audio in {:.2?} ({:.1}x real-time)",
        audio_duration, gen_dur, speedup
    );
    println!("Saved to {}", output.display());

    Ok(())
}
