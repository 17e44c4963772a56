/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: Time of the first sample in the block, in seconds on the render
///   clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }

    /// Context for a block starting `frame` samples into the render clock.
    pub fn at_frame(sample_rate: f32, frame: u64) -> Self {
        Self {
            sample_rate,
            time: frame as f64 / sample_rate as f64,
        }
    }

    /// Time of sample `index` within the block.
    #[inline]
    pub fn sample_time(&self, index: usize) -> f64 {
        self.time + index as f64 / self.sample_rate as f64
    }

    /// Time just past the last sample of a block of `len` frames.
    #[inline]
    pub fn end_time(&self, len: usize) -> f64 {
        self.sample_time(len)
    }
}

/// Core trait for audio processing graph nodes
///
/// Nodes process `out` in place: sources overwrite it, effects read it and
/// write the result back.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Check if this node is still producing sound
    fn is_active(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_clock_converts_to_seconds() {
        let ctx = RenderCtx::at_frame(48_000.0, 96_000);
        assert_eq!(ctx.time, 2.0);
        assert!((ctx.sample_time(480) - 2.01).abs() < 1e-12);
        assert!((ctx.end_time(48_000) - 3.0).abs() < 1e-12);
    }
}
