//! Real-world scenario benchmarks.
//!
//! These render the assembled signal graph the way the engine drives it:
//! a held note with modulation on, and a renderer fed a stream of notes.

mod graph;

pub use graph::{bench_graph, bench_renderer};
