//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are allocation-free once built and realtime-safe, so
//! they can live directly inside graph nodes. They stay focused on the
//! signal-processing math; scheduling and wiring happen one layer up.

/// Fractional delay line.
pub mod delay;
/// Waveshaper transfer curves.
pub mod distortion;
/// Attack/decay/sustain/release automation schedules.
pub mod envelope;
/// State-variable low-pass filter.
pub mod filter;
/// Phase-accumulator oscillator waveforms.
pub mod oscillator;
/// Scheduled parameter timelines.
pub mod param;

pub use envelope::EnvelopeGenerator;
pub use param::{Automation, AutomationEvent, Param};
