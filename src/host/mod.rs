//! Audio back ends.
//!
//! An [`AudioHost`] owns the render thread. The engine asks it for a sample
//! rate, hands it a [`Renderer`], and from then on only talks to the renderer
//! through queues.

pub mod device;
pub mod offline;

use crate::{error::HostError, synth::renderer::Renderer};

pub use device::CpalHost;
pub use offline::OfflineHost;

pub trait AudioHost {
    /// Acquire the output and report its sample rate.
    fn open(&mut self) -> Result<f32, HostError>;

    /// Start pulling audio from `renderer`.
    fn launch(&mut self, renderer: Renderer) -> Result<(), HostError>;

    fn suspend(&mut self) -> Result<(), HostError>;

    fn resume(&mut self) -> Result<(), HostError>;
}

/// Lifecycle of the audio side, as seen from the control thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostStatus {
    /// Nothing built yet. The first note or `start()` brings it up.
    #[default]
    Dormant,
    Running,
    Suspended,
    /// The host failed once; control calls are ignored from here on.
    Unavailable,
}
