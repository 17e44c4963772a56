//! Reader side of the visualization tap.
//!
//! The render thread pushes master output into a ring buffer through
//! [`ProbeTap`](crate::graph::probe::ProbeTap). A [`Probe`] owns the other
//! end, keeps the most recent window of samples, and turns it into a
//! waveform or a spectrum on request. Reads never block and never reach back
//! into the signal path.

pub mod spectrum;

use rtrb::Consumer;

pub use spectrum::SpectrumAnalyzer;

/// Samples kept for display and analysis.
pub const PROBE_WINDOW: usize = 1024;

pub struct Probe {
    rx: Consumer<f32>,
    window: Vec<f32>,
    analyzer: SpectrumAnalyzer,
}

impl Probe {
    pub fn new(rx: Consumer<f32>, sample_rate: f32) -> Self {
        Self {
            rx,
            window: vec![0.0; PROBE_WINDOW],
            analyzer: SpectrumAnalyzer::new(PROBE_WINDOW, sample_rate),
        }
    }

    /// Move everything waiting in the ring into the window.
    pub fn poll(&mut self) -> usize {
        let mut received = 0;
        while let Ok(sample) = self.rx.pop() {
            self.window.push(sample);
            received += 1;
        }

        if self.window.len() > PROBE_WINDOW {
            let excess = self.window.len() - PROBE_WINDOW;
            self.window.drain(0..excess);
        }
        received
    }

    /// The latest `PROBE_WINDOW` samples, oldest first.
    pub fn time_domain(&mut self) -> &[f32] {
        self.poll();
        &self.window
    }

    /// Magnitude spectrum of the latest window as (Hz, dB) pairs.
    pub fn frequency_domain(&mut self) -> &[(f64, f64)] {
        self.poll();
        self.analyzer.update(&self.window);
        self.analyzer.data()
    }

    /// Peak and RMS of the current window.
    pub fn levels(&self) -> (f32, f32) {
        let peak = self.window.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (self.window.iter().map(|&x| x * x).sum::<f32>() / self.window.len() as f32).sqrt();
        (peak, rms)
    }
}
