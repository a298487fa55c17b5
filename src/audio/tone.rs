//! Cue tone synthesis.
//!
//! Each cue is a handful of oscillator voices, optionally staggered, summed
//! into one mono buffer. Pure functions, no I/O besides `write_wav`.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::f32::consts::PI;
use std::path::Path;

use crate::timing::CueEvent;

pub const SAMPLE_RATE: u32 = 44_100;

const ATTACK_SECONDS: f32 = 0.05;
const RELEASE_FLOOR: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
}

impl Waveform {
    /// One sample at `phase` in [0, 1).
    fn sample(&self, phase: f32) -> f32 {
        match self {
            Self::Sine => (2.0 * PI * phase).sin(),
            Self::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Self::Sawtooth => 2.0 * phase - 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub waveform: Waveform,
    pub frequency: f32,
    pub delay_seconds: f32,
    pub duration_seconds: f32,
    pub volume: f32,
}

impl Voice {
    const fn new(waveform: Waveform, frequency: f32, duration_seconds: f32, volume: f32) -> Self {
        Self {
            waveform,
            frequency,
            delay_seconds: 0.0,
            duration_seconds,
            volume,
        }
    }

    const fn delayed(mut self, delay_seconds: f32) -> Self {
        self.delay_seconds = delay_seconds;
        self
    }

    /// Linear attack, then exponential decay down to the release floor.
    fn envelope(&self, t: f32) -> f32 {
        if t < ATTACK_SECONDS {
            return self.volume * t / ATTACK_SECONDS;
        }
        let span = (self.duration_seconds - ATTACK_SECONDS).max(f32::EPSILON);
        let progress = ((t - ATTACK_SECONDS) / span).min(1.0);
        self.volume * (RELEASE_FLOOR / self.volume).powf(progress)
    }

    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let rate = sample_rate as f32;
        let silence = (self.delay_seconds * rate).round() as usize;
        let length = (self.duration_seconds * rate).round() as usize;

        let mut samples = vec![0.0f32; silence];
        samples.extend((0..length).map(|n| {
            let t = n as f32 / rate;
            let phase = (self.frequency * t).fract();
            self.waveform.sample(phase) * self.envelope(t)
        }));
        samples
    }
}

/// Voices making up the tone for `cue`.
pub fn voices(cue: CueEvent) -> Vec<Voice> {
    match cue {
        // C5 then E5 chime
        CueEvent::GreenEntered => vec![
            Voice::new(Waveform::Sine, 523.25, 0.8, 0.3),
            Voice::new(Waveform::Sine, 659.25, 0.8, 0.3).delayed(0.1),
        ],
        CueEvent::YellowEntered => vec![Voice::new(Waveform::Triangle, 440.0, 0.6, 0.3)],
        CueEvent::RedEntered => vec![Voice::new(Waveform::Sawtooth, 220.0, 0.8, 0.2)],
        CueEvent::BellEntered => vec![
            Voice::new(Waveform::Sine, 880.0, 1.5, 0.8),
            Voice::new(Waveform::Triangle, 440.0, 1.5, 0.4).delayed(0.05),
        ],
    }
}

/// Sum voices into one buffer. Zero-pads shorter inputs and scales the
/// result back into [-1.0, 1.0] if it clips.
pub fn mix(sources: &[Vec<f32>]) -> Vec<f32> {
    let max_len = sources.iter().map(Vec::len).max().unwrap_or(0);
    let mut mixed = vec![0.0f32; max_len];

    for source in sources {
        for (i, &sample) in source.iter().enumerate() {
            mixed[i] += sample;
        }
    }

    let max_abs = mixed.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
    if max_abs > 1.0 {
        for sample in &mut mixed {
            *sample /= max_abs;
        }
    }

    mixed
}

pub fn render_cue(cue: CueEvent, sample_rate: u32) -> Vec<f32> {
    let rendered: Vec<Vec<f32>> = voices(cue).iter().map(|v| v.render(sample_rate)).collect();
    mix(&rendered)
}

/// 16-bit mono PCM, which every player handles.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {:?}", path))?;
    for &sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_empty() {
        assert!(mix(&[]).is_empty());
    }

    #[test]
    fn test_mix_different_lengths() {
        let a = vec![0.25, 0.25];
        let b = vec![0.25, 0.25, 0.25, 0.25];
        let result = mix(&[a, b]);
        assert_eq!(result, vec![0.5, 0.5, 0.25, 0.25]);
    }

    #[test]
    fn test_mix_normalizes_clipping() {
        let result = mix(&[vec![1.0, -0.5], vec![1.0, 0.0]]);
        assert_eq!(result, vec![1.0, -0.25]);
    }

    #[test]
    fn test_waveform_shapes() {
        assert!(Waveform::Sine.sample(0.0).abs() < 1e-6);
        assert!((Waveform::Sine.sample(0.25) - 1.0).abs() < 1e-6);
        assert_eq!(Waveform::Triangle.sample(0.5), 1.0);
        assert_eq!(Waveform::Triangle.sample(0.0), -1.0);
        assert_eq!(Waveform::Sawtooth.sample(0.0), -1.0);
        assert_eq!(Waveform::Sawtooth.sample(0.5), 0.0);
    }

    #[test]
    fn test_cue_lengths() {
        let rate = 8_000;
        // green: second voice starts 100 ms late
        assert_eq!(render_cue(CueEvent::GreenEntered, rate).len(), 7_200);
        assert_eq!(render_cue(CueEvent::YellowEntered, rate).len(), 4_800);
        assert_eq!(render_cue(CueEvent::RedEntered, rate).len(), 6_400);
        assert_eq!(render_cue(CueEvent::BellEntered, rate).len(), 12_400);
    }

    #[test]
    fn test_rendered_tones_stay_in_range_and_fade() {
        for cue in CueEvent::ALL {
            let samples = render_cue(cue, 8_000);
            assert!(samples.iter().all(|s| s.abs() <= 1.0));
            let tail = &samples[samples.len() - 10..];
            assert!(tail.iter().all(|s| s.abs() < 0.01), "{cue} does not fade out");
        }
    }

    #[test]
    fn test_write_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bell.wav");
        let samples = render_cue(CueEvent::BellEntered, 8_000);
        write_wav(&path, &samples, 8_000).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8_000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len() as usize, samples.len());
    }
}
