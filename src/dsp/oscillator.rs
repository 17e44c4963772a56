use std::f32::consts::TAU;

use crate::patch::Waveform;

/*
Phase Accumulator
=================

Every waveform here is a function of a single phase value that walks from 0
to 1 once per cycle:

    phase += frequency / sample_rate      (wrap at 1.0)

    sine      sin(2π · phase)
    sawtooth  2 · phase - 1
    square    +1 for the first half of the cycle, -1 for the second
    triangle  1 - 4 · |phase - 0.5|

The frequency is read per sample, so a glide or vibrato is just a different
value in the frequency buffer. Phase is never reset by a frequency change,
which is what keeps a glide free of discontinuities.

Sawtooth and square have instant jumps. Sampled naively those jumps alias
badly at higher notes, so each jump is smoothed with a two-sample polynomial
correction (PolyBLEP). Sine and triangle have no jumps and need nothing.
*/

#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    waveform: Waveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Switch shape without touching phase.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let dt = (frequency / sample_rate).clamp(0.0, 0.5);
        let phase = self.phase;

        let sample = match self.waveform {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Sawtooth => 2.0 * phase - 1.0 - poly_blep(phase, dt),
            Waveform::Square => {
                let naive = if phase < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(phase, dt) - poly_blep((phase + 0.5).fract(), dt)
            }
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        };

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }

    /// Render at a fixed frequency.
    pub fn render(&mut self, out: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }

    /// Render with one frequency per output sample.
    pub fn render_modulated(&mut self, out: &mut [f32], frequency: &[f32], sample_rate: f32) {
        for (sample, &f) in out.iter_mut().zip(frequency) {
            *sample = self.next_sample(f, sample_rate);
        }
    }
}

/// Band-limited step correction around a discontinuity at phase 0.
#[inline]
fn poly_blep(phase: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    if phase < dt {
        let t = phase / dt;
        t + t - t * t - 1.0
    } else if phase > 1.0 - dt {
        let t = (phase - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn zero_crossings(buffer: &[f32]) -> usize {
        buffer
            .windows(2)
            .filter(|w| w[0] <= 0.0 && w[1] > 0.0)
            .count()
    }

    #[test]
    fn valid_sine() {
        let mut osc = OscillatorBlock::sine();
        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer, 440.0, SAMPLE_RATE);

        let sample_index = 12;
        let expected = (TAU * 440.0 * sample_index as f32 / SAMPLE_RATE).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn every_waveform_stays_bounded() {
        for waveform in Waveform::ALL {
            let mut osc = OscillatorBlock::new(waveform);
            let mut buffer = vec![0.0f32; 4096];
            osc.render(&mut buffer, 1_760.0, SAMPLE_RATE);
            for &s in &buffer {
                assert!(
                    s.is_finite() && s.abs() <= 1.05,
                    "{} produced {s}",
                    waveform.name()
                );
            }
        }
    }

    #[test]
    fn cycle_count_matches_frequency() {
        for waveform in Waveform::ALL {
            let mut osc = OscillatorBlock::new(waveform);
            let mut buffer = vec![0.0f32; SAMPLE_RATE as usize];
            osc.render(&mut buffer, 100.0, SAMPLE_RATE);
            let crossings = zero_crossings(&buffer);
            assert!(
                (99..=101).contains(&crossings),
                "{}: {crossings} crossings",
                waveform.name()
            );
        }
    }

    #[test]
    fn changing_waveform_keeps_phase() {
        let mut osc = OscillatorBlock::new(Waveform::Sine);
        let mut buffer = vec![0.0f32; 10];
        osc.render(&mut buffer, 1_000.0, SAMPLE_RATE);
        let phase = osc.phase;
        osc.set_waveform(Waveform::Square);
        assert_eq!(osc.phase, phase);
    }

    #[test]
    fn modulated_frequency_is_read_per_sample() {
        let mut fixed = OscillatorBlock::sine();
        let mut swept = OscillatorBlock::sine();
        let mut a = vec![0.0f32; 256];
        let mut b = vec![0.0f32; 256];
        let freqs = vec![440.0f32; 256];

        fixed.render(&mut a, 440.0, SAMPLE_RATE);
        swept.render_modulated(&mut b, &freqs, SAMPLE_RATE);

        assert_eq!(a, b);
    }
}
