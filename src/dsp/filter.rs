use std::f32::consts::PI;

/*
| response  | output   | passes       | rejects      |
| --------- | -------- | ------------ | ------------ |
| low-pass  | v2       | below cutoff | above cutoff |

Two integrators in a loop (TPT / Zavalishin form). `g` sets where the loop
rolls off, `k = 1/Q` sets how much of the band-pass state is fed back, so a
larger Q means less damping and a taller peak at the cutoff.

Coefficients are recomputed per sample because cutoff is modulated per
sample. `tan` is the only expensive call.
*/

/// Lowest cutoff the filter will run at.
pub const MIN_CUTOFF_HZ: f32 = 20.0;

/// Highest cutoff as a fraction of the sample rate. `tan` blows up at
/// Nyquist, so stay clear of it.
pub const MAX_CUTOFF_RATIO: f32 = 0.45;

/// Q values below this would make `k` explode.
pub const MIN_Q: f32 = 0.05;

/// Clamp a modulated cutoff into the range the filter can run at.
#[inline]
pub fn clamp_cutoff(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let hi = MAX_CUTOFF_RATIO * sample_rate;
    if cutoff_hz.is_nan() {
        return MIN_CUTOFF_HZ;
    }
    cutoff_hz.clamp(MIN_CUTOFF_HZ, hi.max(MIN_CUTOFF_HZ))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub g: f32,
    pub k: f32,
}

impl Coefficients {
    #[inline]
    pub fn new(cutoff_hz: f32, q: f32, sample_rate: f32) -> Self {
        let cutoff = clamp_cutoff(cutoff_hz, sample_rate);
        let g = (PI * cutoff / sample_rate).tan();
        let k = 1.0 / q.max(MIN_Q);
        Self { g, k }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory
}

impl SVFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one sample through the filter and return the low-pass output.
    #[inline]
    pub fn next_sample(&mut self, sample: f32, coeffs: Coefficients) -> f32 {
        let Coefficients { g, k } = coeffs;
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    /// Filter a block at fixed settings.
    pub fn render(&mut self, buffer: &mut [f32], cutoff_hz: f32, q: f32, sample_rate: f32) {
        let coeffs = Coefficients::new(cutoff_hz, q, sample_rate);
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, coeffs);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}
