use crate::pose::Detection;

/// Detector output and telemetry for one video frame.
pub struct Frame {
    /// Drone height above the road, meters
    pub altitude_m: f64,
    pub detections: Vec<Detection>,
}

impl Frame {
    #[inline]
    pub fn new(altitude_m: f64, detections: Vec<Detection>) -> Self {
        Self {
            altitude_m,
            detections,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
