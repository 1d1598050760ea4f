/// Per-frame drone altitude above the road, in meters.
///
/// Telemetry usually carries altitude relative to the takeoff point. When the
/// ground under the drone changes height during the flight, per-frame terrain
/// heights move each sample onto the ground below that frame:
/// `corrected_i = relative_i + (ground_0 - ground_i)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AltitudeProfile {
    altitudes: Vec<f64>,
}

impl AltitudeProfile {
    pub fn new(relative: Vec<f64>) -> Self {
        Self { altitudes: relative }
    }

    /// Applies terrain correction. Frames past the end of `ground` reuse its
    /// last height; an empty `ground` leaves the profile untouched.
    pub fn with_terrain(mut self, ground: &[f64]) -> Self {
        let (first, last) = match (ground.first(), ground.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return self,
        };

        for (i, alt) in self.altitudes.iter_mut().enumerate() {
            let g = ground.get(i).copied().unwrap_or(last);
            *alt += first - g;
        }

        self
    }

    /// Altitude for `frame`. Frames past the recorded telemetry reuse the last
    /// sample, `None` only for an empty profile.
    #[inline]
    pub fn at(&self, frame: usize) -> Option<f64> {
        self.altitudes
            .get(frame)
            .or_else(|| self.altitudes.last())
            .copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.altitudes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.altitudes.is_empty()
    }
}

impl FromIterator<f64> for AltitudeProfile {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
