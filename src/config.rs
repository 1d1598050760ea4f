use crate::error::Error;
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Consecutive missed frames after which a track is dropped
    pub max_miss_budget: u32,
    /// Share of each frame dimension covered by the centered tracking region
    pub roi_fraction: f64,
    /// Smoothed speed a track must exceed to be counted, km/h
    pub confirm_speed_kmh: f64,
    /// History cap, velocity span, speed window and smoothing period
    pub window: usize,
    pub max_tracks: usize,
    pub near_gate_px: f64,
    pub far_gate_px: f64,
    /// History a track needs beyond this length before the near gate applies
    pub settled_history_len: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_miss_budget: 10,
            roi_fraction: 0.95,
            confirm_speed_kmh: 10.0,
            window: 10,
            max_tracks: 100,
            near_gate_px: 20.0,
            far_gate_px: 30.0,
            settled_history_len: 5,
        }
    }
}

impl TrackerConfig {
    pub fn new(max_miss_budget: u32) -> Self {
        Self {
            max_miss_budget,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_miss_budget == 0 {
            return Err(Error::InvalidConfig("max_miss_budget must be at least 1".into()));
        }

        if !(self.roi_fraction > 0.0 && self.roi_fraction <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "roi_fraction must be in (0, 1], got {}",
                self.roi_fraction
            )));
        }

        if !self.confirm_speed_kmh.is_finite() || self.confirm_speed_kmh < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "confirm_speed_kmh must be non-negative, got {}",
                self.confirm_speed_kmh
            )));
        }

        // velocity needs at least two smoothed points
        if self.window < 2 {
            return Err(Error::InvalidConfig(format!(
                "window must be at least 2, got {}",
                self.window
            )));
        }

        if self.max_tracks == 0 {
            return Err(Error::InvalidConfig("max_tracks must be at least 1".into()));
        }

        let gates = [
            ("near_gate_px", self.near_gate_px),
            ("far_gate_px", self.far_gate_px),
        ];
        for (name, gate) in gates {
            if !(gate.is_finite() && gate > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, gate
                )));
            }
        }

        Ok(())
    }
}
