use crate::config::TrackerConfig;
use crate::error::Error;
use crate::frame::Frame;
use crate::registry::{FleetSnapshot, Registry};
use crate::report::{ReportClock, TrafficReport};
use crate::scale::{CameraIntrinsics, Scale};

/// Result of one processed frame.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    pub snapshot: FleetSnapshot,
    pub scale: Scale,
    /// Present once per second of video
    pub report: Option<TrafficReport>,
}

/// Full per-frame pipeline: scale from altitude, miss accounting,
/// association, pruning, snapshot and the per-second report.
pub struct SpeedTracker {
    intrinsics: CameraIntrinsics,
    registry: Registry,
    clock: ReportClock,
    scale: Scale,
    frames: u64,
}

impl SpeedTracker {
    pub fn new(intrinsics: CameraIntrinsics, config: TrackerConfig) -> Result<Self, Error> {
        let registry = Registry::new(config, &intrinsics)?;

        Ok(Self {
            clock: ReportClock::new(intrinsics.fps),
            intrinsics,
            registry,
            scale: Scale::default(),
            frames: 0,
        })
    }

    /// Updates the ground scale. Invalid altitudes keep the previous scale.
    fn update_scale(&mut self, altitude_m: f64) {
        if altitude_m.is_finite() && altitude_m > 0.0 {
            self.scale = self.intrinsics.scale_at(altitude_m);
        } else {
            tracing::warn!(
                altitude_m,
                frame = self.frames,
                "invalid altitude, keeping previous scale"
            );
        }
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline]
    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    #[inline]
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }
}

impl crate::Tracking for SpeedTracker {
    fn process(&mut self, frame: &Frame) -> FrameOutput {
        self.update_scale(frame.altitude_m);
        self.frames += 1;

        let scale = self.scale;
        let mut update = self.registry.advance_frame(scale);
        for det in frame.iter() {
            update.submit(det);
        }
        let snapshot = update.finish();

        let report = self.clock.tick(self.frames, &snapshot);

        FrameOutput {
            snapshot,
            scale,
            report,
        }
    }

    #[inline]
    fn speed_history(&self, id: u64) -> Option<Vec<f64>> {
        self.registry.speed_history(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Detection, Pose};
    use crate::Tracking;
    use approx::assert_relative_eq;

    fn tracker() -> SpeedTracker {
        let cam = CameraIntrinsics::new(10.0, 16.0, 9.0, 1600, 900, 10.0).unwrap();
        SpeedTracker::new(cam, TrackerConfig::default()).unwrap()
    }

    #[test]
    fn test_scale_survives_bad_altitude() {
        let mut t = tracker();

        let out = t.process(&Frame::new(50.0, vec![]));
        assert_relative_eq!(out.scale.horizontal, 0.05, epsilon = 1e-12);

        let out = t.process(&Frame::new(f64::NAN, vec![]));
        assert_relative_eq!(out.scale.horizontal, 0.05, epsilon = 1e-12);

        let out = t.process(&Frame::new(0.0, vec![]));
        assert_relative_eq!(out.scale.vertical, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_scale_before_first_altitude() {
        let mut t = tracker();
        let out = t.process(&Frame::new(-1.0, vec![]));

        assert_eq!(out.scale, Scale::default());
    }

    #[test]
    fn test_report_every_second() {
        let mut t = tracker();
        let det = Detection::new(Pose::new(400.0, 400.0, 40.0, 20.0, 0.0), 10);

        let reports: Vec<u64> = (0..25)
            .filter_map(|_| t.process(&Frame::new(50.0, vec![det])).report)
            .map(|r| r.second)
            .collect();

        assert_eq!(reports, vec![1, 2]);
        assert_eq!(t.frames_processed(), 25);
    }
}
