//! Building blocks of the signal graph.
//!
//! Graph nodes wrap the low-level DSP primitives with what a running
//! instrument needs: block rendering on the render clock, automated
//! parameters, and start/stop times. The fixed wiring of these nodes lives in
//! [`crate::synth::assembler`].

/// Amplitude stage driven by the envelope.
pub mod amplify;
/// Feedback delay with smoothed time, feedback and mix.
pub mod delay;
/// Waveshaping stage with swappable curves.
pub mod distortion;
/// Resonant low-pass filter with per-sample cutoff modulation.
pub mod filter;
/// Free-running sine LFO for cutoff modulation.
pub mod lfo;
/// Core traits shared by all graph nodes.
pub mod node;
/// Pooled audio-band oscillator slots.
pub mod oscillator;
/// Non-blocking output tap for visualizers.
pub mod probe;

pub use node::{GraphNode, RenderCtx};
