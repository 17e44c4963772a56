//! Engine tunables.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{
    distortion::CURVE_RESOLUTION,
    envelope::{PEAK_LEVEL, RELEASE_FLOOR},
};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Control to render queue, in commands.
    pub command_capacity: usize,
    /// Render to probe queue, in samples.
    pub probe_capacity: usize,
    /// Retired shaper curves waiting to be freed on the control side.
    pub curve_return_capacity: usize,
    /// Oscillator slots in the graph. Two are live at most; the rest cover
    /// release tails that overlap a new note.
    pub oscillator_pool: usize,
    /// Frames added to the render clock when scheduling.
    pub lookahead_frames: u64,
    pub peak_level: f32,
    pub release_floor: f32,
    /// Fade applied when one note cuts off another.
    pub anti_click_sec: f32,
    /// Time constant for cutoff, Q, LFO and delay changes.
    pub smoothing_time_constant: f32,
    pub shaper_resolution: usize,
    /// Sample rate used by [`OfflineHost`](crate::host::offline::OfflineHost).
    pub offline_sample_rate: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_capacity: 1024,
            probe_capacity: 8192,
            curve_return_capacity: 16,
            oscillator_pool: 8,
            lookahead_frames: 128,
            peak_level: PEAK_LEVEL,
            release_floor: RELEASE_FLOOR,
            anti_click_sec: 0.01,
            smoothing_time_constant: 0.1,
            shaper_resolution: CURVE_RESOLUTION,
            offline_sample_rate: 48_000.0,
        }
    }
}
