pub mod analysis; // Probe reader: waveform and spectrum
pub mod config;
pub mod dsp;
pub mod error;
pub mod graph; // Render-side nodes of the signal chain
pub mod host; // Audio back ends
pub mod keymap;
pub mod patch; // Sound parameters, presets, randomizer
pub mod synth; // Voice control, engine, renderer

pub use config::EngineConfig;
pub use error::HostError;
pub use host::{AudioHost, CpalHost, HostStatus, OfflineHost};
pub use keymap::NoteEntry;
pub use patch::{Patch, Waveform};
pub use synth::{Engine, VoicePhase, VoiceState};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
