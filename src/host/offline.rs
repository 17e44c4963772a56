use crate::{
    config::EngineConfig,
    error::HostError,
    host::AudioHost,
    synth::renderer::Renderer,
};

/// Renders on demand into caller buffers. Used for tests and bouncing to
/// disk.
pub struct OfflineHost {
    sample_rate: f32,
    renderer: Option<Renderer>,
    suspended: bool,
}

impl OfflineHost {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            renderer: None,
            suspended: false,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Fill `out` with the next samples. Writes silence and leaves the render
    /// clock where it is while suspended or before launch.
    pub fn render(&mut self, out: &mut [f32]) {
        match self.renderer.as_mut() {
            Some(renderer) if !self.suspended => renderer.render(out),
            _ => out.fill(0.0),
        }
    }

    /// Render `seconds` of audio and return it.
    pub fn bounce(&mut self, seconds: f32) -> Vec<f32> {
        let frames = (seconds.max(0.0) * self.sample_rate).round() as usize;
        let mut out = vec![0.0; frames];
        self.render(&mut out);
        out
    }

    pub fn renderer(&self) -> Option<&Renderer> {
        self.renderer.as_ref()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }
}

impl Default for OfflineHost {
    fn default() -> Self {
        Self::new(EngineConfig::default().offline_sample_rate)
    }
}

impl AudioHost for OfflineHost {
    fn open(&mut self) -> Result<f32, HostError> {
        Ok(self.sample_rate)
    }

    fn launch(&mut self, renderer: Renderer) -> Result<(), HostError> {
        self.renderer = Some(renderer);
        self.suspended = false;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), HostError> {
        if self.renderer.is_none() {
            return Err(HostError::NotLaunched);
        }
        self.suspended = true;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), HostError> {
        if self.renderer.is_none() {
            return Err(HostError::NotLaunched);
        }
        self.suspended = false;
        Ok(())
    }
}
