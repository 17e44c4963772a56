//! Waveshaping Curves
//!
//! Distortion adds harmonics by reshaping the waveform: every sample is
//! replaced by `f(sample)` for some fixed transfer function `f`. Here `f` is
//! stored as a lookup table (the "curve") so the rendering thread only pays
//! for an index and a lerp per sample.
//!
//! # The Transfer Function
//!
//! ```text
//!   f(x) = (3 + k) · x · K / (π + k · |x|)        K = π / 3
//! ```
//!
//! `k` is the distortion amount (0 to 100). At `k = 0` the expression
//! reduces to `3 · x · (π/3) / π = x`, so zero amount is a clean pass
//! through. As `k` grows the denominator starts to dominate near |x| = 1 and
//! the curve bends into a soft knee:
//!
//! ```text
//!   out                         k = 0     straight line
//!    1 ┤          ___----       k = 10    gentle knee
//!      │      _.-'              k = 100   almost a hard clip
//!      │    .'
//!    0 ┼──/──────────→ in
//!      │.'
//!   -1 ┤
//! ```
//!
//! # Why a Table
//!
//! The curve is rebuilt on the control thread whenever the amount changes and
//! handed to the rendering thread as a whole. Swapping a pointer is the only
//! thing the rendering thread does with it, so a knob sweep never stalls the
//! audio callback with math or allocation.

use std::f32::consts::PI;

/// Points in a default curve.
pub const CURVE_RESOLUTION: usize = 44_100;

const CURVE_GAIN: f32 = PI / 3.0;

/// Transfer function sampled at evenly spaced inputs over [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct ShaperCurve {
    amount: f32,
    points: Box<[f32]>,
}

impl ShaperCurve {
    /// Build a curve for `amount`, clamped to [0, 100].
    pub fn new(amount: f32, resolution: usize) -> Self {
        let amount = crate::patch::bounded(amount, 0.0, 100.0);
        let resolution = resolution.max(2);
        let last = (resolution - 1) as f32;

        let points = (0..resolution)
            .map(|i| {
                let x = i as f32 * 2.0 / last - 1.0;
                transfer(x, amount)
            })
            .collect();

        Self { amount, points }
    }

    /// A curve that leaves the signal untouched.
    pub fn identity() -> Self {
        Self::new(0.0, 2)
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Look `x` up on the curve with linear interpolation. Inputs outside
    /// [-1, 1] take the end points.
    #[inline]
    pub fn shape(&self, x: f32) -> f32 {
        let last = self.points.len() - 1;
        if x.is_nan() {
            return 0.0;
        }
        let position = ((x.clamp(-1.0, 1.0) + 1.0) * 0.5) * last as f32;
        let index = (position as usize).min(last);
        if index == last {
            return self.points[last];
        }
        let frac = position - index as f32;
        let a = self.points[index];
        let b = self.points[index + 1];
        a + (b - a) * frac
    }

    pub fn render(&self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.shape(*sample);
        }
    }
}

impl Default for ShaperCurve {
    fn default() -> Self {
        Self::identity()
    }
}

#[inline]
fn transfer(x: f32, amount: f32) -> f32 {
    (3.0 + amount) * x * CURVE_GAIN / (PI + amount * x.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_amount_is_identity() {
        let curve = ShaperCurve::new(0.0, CURVE_RESOLUTION);
        for i in 0..=200 {
            let x = i as f32 / 100.0 - 1.0;
            let y = curve.shape(x);
            assert!((y - x).abs() < 1e-4, "f({x}) = {y}");
        }
    }

    #[test]
    fn curve_is_odd_and_monotonic() {
        let curve = ShaperCurve::new(50.0, 1_001);
        let mut previous = f32::NEG_INFINITY;
        for i in 0..=100 {
            let x = i as f32 / 50.0 - 1.0;
            let y = curve.shape(x);
            assert!(y >= previous, "curve must rise: f({x}) = {y}");
            assert!((curve.shape(-x) + y).abs() < 1e-4);
            previous = y;
        }
    }

    #[test]
    fn more_amount_means_more_gain_at_small_inputs() {
        let soft = ShaperCurve::new(5.0, CURVE_RESOLUTION);
        let hard = ShaperCurve::new(80.0, CURVE_RESOLUTION);
        assert!(hard.shape(0.2) > soft.shape(0.2));
        assert!(soft.shape(0.2) > 0.2);
    }

    #[test]
    fn out_of_range_inputs_use_end_points() {
        let curve = ShaperCurve::new(30.0, 512);
        assert_eq!(curve.shape(4.0), curve.shape(1.0));
        assert_eq!(curve.shape(-4.0), curve.shape(-1.0));
        assert_eq!(curve.shape(f32::NAN), 0.0);
    }

    #[test]
    fn amount_is_clamped() {
        assert_eq!(ShaperCurve::new(250.0, 16).amount(), 100.0);
        assert_eq!(ShaperCurve::new(-3.0, 16).amount(), 0.0);
        assert_eq!(ShaperCurve::new(f32::NAN, 16).amount(), 0.0);
    }
}
