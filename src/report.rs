use crate::registry::FleetSnapshot;
use serde_derive::{Deserialize, Serialize};

/// One row of the per-second traffic log.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TrafficReport {
    /// Seconds of source video elapsed
    pub second: u64,
    pub average_speed_kmh: f64,
    /// Confirmed vehicles included in the average
    pub vehicles: usize,
}

/// Decides on which frames a report row is due: once per second of video.
///
/// The period and the reported second round halves to even.
#[derive(Debug, Clone)]
pub struct ReportClock {
    fps: f64,
    period: u64,
}

impl ReportClock {
    pub fn new(fps: f64) -> Self {
        Self {
            fps,
            period: (fps.round_ties_even() as u64).max(1),
        }
    }

    /// `frame` counts processed frames starting from 1.
    pub fn tick(&self, frame: u64, snapshot: &FleetSnapshot) -> Option<TrafficReport> {
        if frame == 0 || frame % self.period != 0 {
            return None;
        }

        let report = TrafficReport {
            second: (frame as f64 / self.fps).round_ties_even() as u64,
            average_speed_kmh: (snapshot.average_speed_kmh * 100.0).round() / 100.0,
            vehicles: snapshot.averaged_tracks,
        };

        tracing::info!(
            second = report.second,
            average_speed_kmh = report.average_speed_kmh,
            vehicles = report.vehicles,
            "traffic report"
        );

        Some(report)
    }

    #[inline]
    pub fn period(&self) -> u64 {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(avg: f64, n: usize) -> FleetSnapshot {
        FleetSnapshot {
            average_speed_kmh: avg,
            averaged_tracks: n,
            ..Default::default()
        }
    }

    #[test]
    fn test_once_per_second() {
        let clock = ReportClock::new(29.97);
        assert_eq!(clock.period(), 30);

        let snap = snapshot(48.256, 3);
        let due: Vec<u64> = (1..=95).filter(|f| clock.tick(*f, &snap).is_some()).collect();
        assert_eq!(due, vec![30, 60, 90]);

        let report = clock.tick(60, &snap).unwrap();
        assert_eq!(report.second, 2);
        assert_eq!(report.average_speed_kmh, 48.26);
        assert_eq!(report.vehicles, 3);
    }

    #[test]
    fn test_low_frame_rate() {
        let clock = ReportClock::new(0.4);
        assert_eq!(clock.period(), 1);
        assert!(clock.tick(0, &snapshot(0.0, 0)).is_none());
        assert_eq!(clock.tick(2, &snapshot(0.0, 0)).map(|r| r.second), Some(5));
    }

    #[test]
    fn test_half_frame_rate_rounds_to_even() {
        let clock = ReportClock::new(2.5);
        assert_eq!(clock.period(), 2);
        assert_eq!(ReportClock::new(3.5).period(), 4);

        // 10 frames at 2.5 fps is 4 s, 5 frames would be 2 s
        assert_eq!(clock.tick(10, &snapshot(0.0, 0)).map(|r| r.second), Some(4));
        assert!(clock.tick(5, &snapshot(0.0, 0)).is_none());
        assert_eq!(clock.tick(4, &snapshot(0.0, 0)).map(|r| r.second), Some(2));
    }
}
