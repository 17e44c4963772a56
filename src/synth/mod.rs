// Purpose: Note handling, the control surface, and the render-thread driver
// This layer sits above graph nodes and owns the queues between threads

pub mod assembler;
pub mod engine;
pub mod message;
pub mod renderer;
pub mod voice;

pub use engine::Engine;
pub use renderer::{RenderClock, Renderer};
pub use voice::{VoicePhase, VoiceState};
