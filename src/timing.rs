use crate::random::RandomSource;
use std::time::Duration;

const BASE_CLICK_DELAY: (f64, f64) = (0.11, 0.18);
const BASE_MOVE_DURATION: (f64, f64) = (0.02, 0.06);

pub const DEFAULT_START_DELAY_SECS: f64 = 3.0;
pub const DEFAULT_JITTER_PX: i32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speed {
    /// Human-like pacing.
    Human = 1,
    /// Roughly twice as fast.
    Fast = 2,
}

impl Speed {
    pub fn from_setting(value: u8) -> Self {
        if value >= 2 { Speed::Fast } else { Speed::Human }
    }
}

/// Per-click pacing ranges, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingProfile {
    pub click_delay_min: f64,
    pub click_delay_max: f64,
    pub move_duration_min: f64,
    pub move_duration_max: f64,
}

impl TimingProfile {
    pub fn for_speed(speed: Speed) -> Self {
        let scale = match speed {
            Speed::Human => 1.0,
            Speed::Fast => 0.5,
        };
        Self {
            click_delay_min: (BASE_CLICK_DELAY.0 * scale).max(0.0),
            click_delay_max: (BASE_CLICK_DELAY.1 * scale).max(0.0),
            move_duration_min: (BASE_MOVE_DURATION.0 * scale).max(0.0),
            move_duration_max: (BASE_MOVE_DURATION.1 * scale).max(0.0),
        }
    }

    /// Reaction-time style delay: triangular, peaked at the midpoint.
    pub fn sample_click_delay(&self, rng: &mut dyn RandomSource) -> Duration {
        let mid = (self.click_delay_min + self.click_delay_max) / 2.0;
        secs(rng.triangular(self.click_delay_min, self.click_delay_max, mid))
    }

    pub fn sample_move_duration(&self, rng: &mut dyn RandomSource) -> Duration {
        secs(rng.uniform(self.move_duration_min, self.move_duration_max))
    }
}

/// Deliberate pauses. Not scaled by speed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RestProfile {
    pub burst_clicks_min: u32,
    pub burst_clicks_max: u32,
    pub burst_rest_min: f64,
    pub burst_rest_max: f64,
    pub unit_rest_min: f64,
    pub unit_rest_max: f64,
}

impl Default for RestProfile {
    fn default() -> Self {
        Self {
            burst_clicks_min: 24,
            burst_clicks_max: 48,
            burst_rest_min: 0.40,
            burst_rest_max: 0.90,
            unit_rest_min: 0.30,
            unit_rest_max: 0.70,
        }
    }
}

impl RestProfile {
    pub fn sample_burst_gap(&self, rng: &mut dyn RandomSource) -> u32 {
        rng.int_inclusive(self.burst_clicks_min as i64, self.burst_clicks_max as i64) as u32
    }

    pub fn sample_burst_rest(&self, rng: &mut dyn RandomSource) -> Duration {
        secs(rng.uniform(self.burst_rest_min, self.burst_rest_max))
    }

    pub fn sample_unit_rest(&self, rng: &mut dyn RandomSource) -> Duration {
        secs(rng.uniform(self.unit_rest_min, self.unit_rest_max))
    }
}

pub fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value.max(0.0))
}
