//! Audio rendering probe (stage 3: exhaustive)
//!
//! Renders a 10kHz triangle wave through a dynamics compressor in an
//! offline context and folds the tail of the buffer into one number.
//! DSP rounding differs per hardware/OS/browser build, so the sum is a
//! stable device signal. This is the slowest probe in the default registry;
//! the unit timeout covers a render that never completes.

use std::rc::Rc;

use serde_json::json;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AudioBuffer, OfflineAudioContext, OscillatorType};

use super::{reflect_has, ProbeContext};
use crate::error::Result;
use crate::registry::ProbeReading;

const SAMPLE_RATE: f32 = 44_100.0;
const RENDER_SAMPLES: u32 = 5_000;
/// Only the settled tail of the render is folded; the attack phase is noisy.
const TAIL_START: usize = 4_500;

pub async fn audio_fingerprint(ctx: Rc<ProbeContext>) -> Result<ProbeReading> {
    // Existence check before construction so missing support reads as
    // unavailability, not as a thrown error.
    let window = ctx.window()?;
    if !reflect_has(window.as_ref(), "OfflineAudioContext") {
        return Ok(ProbeReading::Unavailable);
    }

    let audio_ctx = OfflineAudioContext::new_with_number_of_channels_and_length_and_sample_rate(
        1,
        RENDER_SAMPLES,
        SAMPLE_RATE,
    )?;

    let oscillator = audio_ctx.create_oscillator()?;
    oscillator.set_type(OscillatorType::Triangle);
    oscillator.frequency().set_value(10_000.0);

    let compressor = audio_ctx.create_dynamics_compressor()?;
    compressor.threshold().set_value(-50.0);
    compressor.knee().set_value(40.0);
    compressor.ratio().set_value(12.0);
    compressor.attack().set_value(0.0);
    compressor.release().set_value(0.25);

    oscillator.connect_with_audio_node(&compressor)?;
    compressor.connect_with_audio_node(&audio_ctx.destination())?;
    oscillator.start()?;

    let rendered = JsFuture::from(audio_ctx.start_rendering()?).await?;
    let buffer: AudioBuffer = rendered
        .dyn_into()
        .map_err(|_| crate::error::Error::Probe("rendered buffer cast failed".to_string()))?;

    let samples = buffer.get_channel_data(0)?;
    let tail_start = TAIL_START.min(samples.len());
    let fingerprint: f64 = samples[tail_start..]
        .iter()
        .map(|s| s.abs() as f64)
        .sum();

    ProbeReading::value(json!({
        "fingerprint": fingerprint,
        "sampleRate": buffer.sample_rate(),
        "length": buffer.length(),
    }))
}

pub fn speech_voices(ctx: &ProbeContext) -> Result<ProbeReading> {
    let window = ctx.window()?;
    if !reflect_has(window.as_ref(), "speechSynthesis") {
        return Ok(ProbeReading::Unavailable);
    }
    let synthesis = window.speech_synthesis()?;
    // The voice list populates asynchronously in some browsers; a zero count
    // here is itself a reading, not a failure.
    ProbeReading::value(json!({
        "supported": true,
        "voiceCount": synthesis.get_voices().length(),
    }))
}
