//! Quadratic motion model over a track's recent poses.
//!
//! Sample index stands in for time. Each axis gets its own degree-2 least
//! squares fit, so the model absorbs acceleration and gentle turns. The
//! miss count shifts the index axis forward so that frames spent occluded
//! still count as elapsed time.

use crate::math::{polyval, quadratic_ls};
use crate::pose::Pose;
use nalgebra as na;

#[derive(Debug, Clone, Copy)]
pub struct QuadraticFit {
    pub x: na::Matrix3x1<f64>,
    pub y: na::Matrix3x1<f64>,
}

impl QuadraticFit {
    /// Fits both center coordinates against `times`. `None` when the system
    /// is singular or the result is not finite.
    pub fn new<'a, I>(times: &[f64], poses: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Pose>,
    {
        let (xs, ys): (Vec<f64>, Vec<f64>) = poses.into_iter().map(|p| (p.x, p.y)).unzip();

        if xs.len() != times.len() || times.len() < 3 {
            return None;
        }

        let t = na::DVector::from_column_slice(times);
        let x = na::DVector::from_vec(xs);
        let y = na::DVector::from_vec(ys);
        let coeffs = quadratic_ls(&t, &x, &y)?;

        if coeffs.iter().all(|c| c.is_finite()) {
            Some(Self {
                x: coeffs.column(0).into_owned(),
                y: coeffs.column(1).into_owned(),
            })
        } else {
            None
        }
    }

    #[inline]
    pub fn eval(&self, t: f64) -> na::Point2<f64> {
        na::Point2::new(polyval(&self.x, t), polyval(&self.y, t))
    }
}

#[inline]
fn raw_centers<'a, I: IntoIterator<Item = &'a Pose>>(history: I) -> Vec<na::Point2<f64>> {
    history.into_iter().map(Pose::center).collect()
}

/// Smoothed centers for the whole history, one per sample.
///
/// Fewer than 3 samples are returned verbatim. Otherwise the fit uses indices
/// `0..n`, with the last index pushed back by `miss_count - 1` once the history
/// holds more than 3 samples, and is evaluated at `i + miss_count - 1`.
pub fn smooth(history: &[Pose], miss_count: u32) -> Vec<na::Point2<f64>> {
    let n = history.len();
    if n < 3 {
        return raw_centers(history);
    }

    let shift = miss_count as f64 - 1.0;
    let mut times: Vec<f64> = (0..n).map(|i| i as f64).collect();
    if n > 3 {
        times[n - 1] += shift;
    }

    match QuadraticFit::new(&times, history) {
        Some(fit) => (0..n).map(|i| fit.eval(i as f64 + shift)).collect(),
        None => {
            tracing::trace!(n, miss_count, "quadratic fit failed, keeping raw history");
            raw_centers(history)
        }
    }
}

/// Expected pose `miss_count` steps past the last sample.
///
/// Only the center is extrapolated, size and rotation come from the last pose.
pub fn predict(history: &[Pose], miss_count: u32) -> Option<Pose> {
    let current = *history.last()?;

    match history.len() {
        1 => Some(current),
        2 => {
            let prev = history[0].center();
            let last = current.center();

            Some(current.with_center(last + (last - prev)))
        }
        n => {
            let times: Vec<f64> = (0..n).map(|i| i as f64).collect();
            let next = (n - 1) as f64 + miss_count as f64;

            Some(match QuadraticFit::new(&times, history) {
                Some(fit) => current.with_center(fit.eval(next)),
                None => current,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn line(n: usize, step: f64) -> Vec<Pose> {
        (0..n)
            .map(|i| Pose::new(100.0 + step * i as f64, 50.0, 40.0, 20.0, 15.0))
            .collect()
    }

    #[test]
    fn test_short_history_is_verbatim() {
        for n in 0..3 {
            let history = line(n, 7.0);
            let smoothed = smooth(&history, 3);

            assert_eq!(smoothed.len(), n);
            for (p, s) in history.iter().zip(&smoothed) {
                assert_eq!(p.center(), *s);
            }
        }
    }

    #[test]
    fn test_smooth_linear_motion_is_exact() {
        let history = line(10, 10.0);
        let smoothed = smooth(&history, 1);

        assert_eq!(smoothed.len(), 10);
        for (p, s) in history.iter().zip(&smoothed) {
            assert_abs_diff_eq!(p.x, s.x, epsilon = 1e-6);
            assert_abs_diff_eq!(p.y, s.y, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_smooth_accounts_for_missed_frames() {
        // last sample arrived after two unseen frames
        let mut history = line(6, 10.0);
        history[5].x = 170.0;

        let smoothed = smooth(&history, 3);
        // shift of 2 moves every evaluation point two steps ahead
        assert_abs_diff_eq!(smoothed[0].x, 120.0, epsilon = 1e-6);
        assert_abs_diff_eq!(smoothed[5].x, 170.0, epsilon = 1e-6);
    }

    #[test]
    fn test_smooth_reduces_jitter() {
        let mut history = line(10, 10.0);
        history[4].y += 6.0;

        let smoothed = smooth(&history, 1);
        assert!((smoothed[4].y - 50.0).abs() < 6.0);
    }

    #[test]
    fn test_predict_edge_cases() {
        assert_eq!(predict(&[], 1), None);

        let one = line(1, 10.0);
        assert_eq!(predict(&one, 5), Some(one[0]));

        let two = line(2, 10.0);
        let p = predict(&two, 1).unwrap();
        assert_abs_diff_eq!(p.x, 120.0, epsilon = 1e-12);
        assert_eq!(p.width, 40.0);
    }

    #[test]
    fn test_predict_extrapolates_over_misses() {
        let history = line(5, 10.0);

        let p = predict(&history, 1).unwrap();
        assert_abs_diff_eq!(p.x, 150.0, epsilon = 1e-6);

        let p = predict(&history, 4).unwrap();
        assert_abs_diff_eq!(p.x, 180.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.y, 50.0, epsilon = 1e-6);
        assert_eq!((p.width, p.height, p.angle_deg), (40.0, 20.0, 15.0));
    }

    #[test]
    fn test_predict_follows_acceleration() {
        let history: Vec<Pose> = (0..6)
            .map(|i| {
                let t = i as f64;
                Pose::new(t * t, 2.0 * t, 10.0, 10.0, 0.0)
            })
            .collect();

        let p = predict(&history, 1).unwrap();
        assert_abs_diff_eq!(p.x, 36.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.y, 12.0, epsilon = 1e-6);
    }
}
