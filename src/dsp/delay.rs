/// Longest delay time the line can hold, in seconds.
pub const MAX_DELAY_SEC: f32 = 2.0;

/// Circular buffer with a fractional read head.
///
/// Sized once from the sample rate; reading and writing never allocate.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    pub fn new(sample_rate: f32) -> Self {
        // Two extra slots so a read at exactly MAX_DELAY_SEC can interpolate.
        let len = (MAX_DELAY_SEC * sample_rate).ceil() as usize + 2;
        Self {
            buffer: vec![0.0; len.max(2)],
            write_pos: 0,
        }
    }

    /// Longest delay, in samples, a read can ask for.
    pub fn max_delay_samples(&self) -> f32 {
        (self.buffer.len() - 2) as f32
    }

    /// Read the sample written `delay_samples` ago, interpolating between
    /// neighbours. A delay of zero returns the most recent write.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = if delay_samples.is_finite() {
            delay_samples.clamp(0.0, self.max_delay_samples())
        } else {
            0.0
        };

        let whole = delay.floor();
        let frac = delay - whole;
        let newest = (self.write_pos + len - 1) % len;
        let a = (newest + len - whole as usize) % len;
        let b = (a + len - 1) % len;

        self.buffer[a] + (self.buffer[b] - self.buffer[a]) * frac
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_comes_back_after_delay() {
        let mut line = DelayLine::new(1_000.0);
        line.write(1.0);
        for _ in 0..9 {
            line.write(0.0);
        }
        // Impulse was written 9 samples before the newest one.
        assert_eq!(line.read(9.0), 1.0);
        assert_eq!(line.read(8.0), 0.0);
        assert_eq!(line.read(0.0), 0.0);
    }

    #[test]
    fn fractional_read_interpolates() {
        let mut line = DelayLine::new(100.0);
        line.write(0.0);
        line.write(1.0);
        // newest = 1.0, one back = 0.0
        assert!((line.read(0.25) - 0.75).abs() < 1e-6);
        assert!((line.read(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn holds_two_seconds() {
        let sample_rate = 48_000.0;
        let mut line = DelayLine::new(sample_rate);
        let delay = MAX_DELAY_SEC * sample_rate;
        assert!(line.max_delay_samples() >= delay);

        line.write(1.0);
        for _ in 0..delay as usize {
            line.write(0.0);
        }
        assert_eq!(line.read(delay), 1.0);
    }

    #[test]
    fn out_of_range_delay_is_clamped() {
        let line = DelayLine::new(100.0);
        assert_eq!(line.read(f32::NAN), 0.0);
        assert_eq!(line.read(-4.0), 0.0);
        assert_eq!(line.read(1.0e9), 0.0);
    }
}
