use crate::scale::Scale;
use crate::window::SlidingWindow;
use nalgebra as na;

pub const MS_TO_KMH: f64 = 3.6;

/// Mean per-step displacement over the last `span` points, zero when fewer
/// than `span` points exist.
pub fn average_velocity(points: &[na::Point2<f64>], span: usize) -> na::Vector2<f64> {
    if span < 2 || points.len() < span {
        return na::Vector2::zeros();
    }

    let recent = &points[points.len() - span..];
    let sum = recent
        .windows(2)
        .fold(na::Vector2::zeros(), |acc, w| acc + (w[1] - w[0]));

    sum / (span - 1) as f64
}

/// Pixel velocity per frame to km/h. Zero when the result is not finite.
#[inline]
pub fn to_kmh(velocity_px: na::Vector2<f64>, scale: &Scale, fps: f64) -> f64 {
    let kmh = scale.to_meters(velocity_px).norm() * fps * MS_TO_KMH;

    if kmh.is_finite() {
        kmh
    } else {
        0.0
    }
}

/// Rolling speed estimate of one track.
///
/// Every matched frame contributes an instantaneous sample. Every `period`
/// samples the window mean becomes the new smoothed speed and is appended
/// to the history.
#[derive(Debug, Clone)]
pub struct SpeedEstimator {
    period: usize,
    tick: usize,
    current: f64,
    smoothed: f64,
    samples: SlidingWindow<f64>,
    history: Vec<f64>,
}

impl SpeedEstimator {
    pub fn new(window: usize) -> Self {
        Self {
            period: window,
            tick: 0,
            current: 0.0,
            smoothed: 0.0,
            samples: SlidingWindow::with_capacity(window),
            history: Vec::new(),
        }
    }

    /// Records an instantaneous sample, returns the new smoothed speed when
    /// this sample closed a period.
    pub fn push(&mut self, kmh: f64) -> Option<f64> {
        self.current = kmh;
        self.samples.push(kmh);
        self.tick += 1;

        if self.tick < self.period {
            return None;
        }

        self.tick = 0;
        self.smoothed = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        self.history.push(self.smoothed);

        Some(self.smoothed)
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    #[inline]
    pub fn smoothed(&self) -> f64 {
        self.smoothed
    }

    #[inline]
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    #[inline]
    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn samples(&self) -> impl Iterator<Item = &f64> {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_average_velocity_needs_full_span() {
        let pts: Vec<_> = (0..9).map(|i| na::Point2::new(i as f64, 0.0)).collect();
        assert_eq!(average_velocity(&pts, 10), na::Vector2::zeros());

        let pts: Vec<_> = (0..12)
            .map(|i| na::Point2::new(3.0 * i as f64, -1.0 * i as f64))
            .collect();
        let v = average_velocity(&pts, 10);
        assert_relative_eq!(v.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(v.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_to_kmh() {
        let kmh = to_kmh(na::Vector2::new(10.0, 0.0), &Scale::new(0.05, 0.05), 30.0);
        assert_relative_eq!(kmh, 54.0, epsilon = 1e-9);

        let kmh = to_kmh(na::Vector2::new(-3.0, -4.0), &Scale::new(1.0, 1.0), 1.0);
        assert_relative_eq!(kmh, 5.0 * MS_TO_KMH, epsilon = 1e-12);
    }

    #[test]
    fn test_to_kmh_non_finite_is_zero() {
        let v = na::Vector2::new(10.0, 2.0);
        assert_eq!(to_kmh(v, &Scale::new(f64::NAN, 0.05), 30.0), 0.0);
        assert_eq!(to_kmh(v, &Scale::new(0.05, f64::INFINITY), 30.0), 0.0);

        let nan = na::Vector2::new(f64::NAN, 0.0);
        assert_eq!(to_kmh(nan, &Scale::new(0.05, 0.05), 30.0), 0.0);
    }

    #[test]
    fn test_smoothing_period() {
        let mut est = SpeedEstimator::new(10);

        for i in 0..9 {
            assert_eq!(est.push(i as f64), None);
        }
        assert_eq!(est.tick(), 9);
        assert_eq!(est.smoothed(), 0.0);

        assert_relative_eq!(est.push(9.0).unwrap(), 4.5, epsilon = 1e-12);
        assert_eq!(est.tick(), 0);
        assert_eq!(est.history().len(), 1);

        // the window keeps sliding across periods
        for _ in 0..10 {
            est.push(20.0);
        }
        assert_eq!(est.history().len(), 2);
        assert_relative_eq!(est.smoothed(), 20.0, epsilon = 1e-12);
        assert_eq!(est.current(), 20.0);
        assert_eq!(est.samples().count(), 10);
    }
}
