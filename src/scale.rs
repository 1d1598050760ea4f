use crate::error::Error;
use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

pub const SENSOR_ASPECT_RATIO: f64 = 16.0 / 9.0;

/// Ground sample distance: meters covered by one pixel along each image axis.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Scale {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Scale {
    #[inline]
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    #[inline(always)]
    pub fn as_vector(&self) -> na::Vector2<f64> {
        na::Vector2::new(self.horizontal, self.vertical)
    }

    /// Pixel displacement to meters.
    #[inline]
    pub fn to_meters(&self, px: na::Vector2<f64>) -> na::Vector2<f64> {
        px.component_mul(&self.as_vector())
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.horizontal.is_finite() && self.vertical.is_finite()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DroneModel {
    #[serde(rename = "DJI mini 4 pro")]
    DjiMini4Pro,
    #[serde(rename = "DJI air 2s")]
    DjiAir2S,
}

impl DroneModel {
    /// `(focal length, sensor width, sensor height)` in millimeters, before cropping.
    pub fn optics(&self) -> (f64, f64, f64) {
        match self {
            DroneModel::DjiMini4Pro => (6.7, 8.9739, 6.7175),
            DroneModel::DjiAir2S => (22.0, 13.2, 8.8),
        }
    }
}

/// Largest `aspect_ratio` rectangle that fits in `width x height`.
pub fn crop_to_aspect(width: f64, height: f64, aspect_ratio: f64) -> (f64, f64) {
    if height * aspect_ratio <= width {
        (height * aspect_ratio, height)
    } else {
        (width, width / aspect_ratio)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsics {
    pub focal_length_mm: f64,
    /// Already cropped to the video aspect ratio.
    pub sensor_width_mm: f64,
    pub sensor_height_mm: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub fps: f64,
}

impl CameraIntrinsics {
    /// Builds intrinsics from a raw sensor size, cropping it to 16:9.
    pub fn new(
        focal_length_mm: f64,
        sensor_width_mm: f64,
        sensor_height_mm: f64,
        frame_width: u32,
        frame_height: u32,
        fps: f64,
    ) -> Result<Self, Error> {
        let (sensor_width_mm, sensor_height_mm) =
            crop_to_aspect(sensor_width_mm, sensor_height_mm, SENSOR_ASPECT_RATIO);

        let intrinsics = Self {
            focal_length_mm,
            sensor_width_mm,
            sensor_height_mm,
            frame_width,
            frame_height,
            fps,
        };

        intrinsics.validate()?;

        Ok(intrinsics)
    }

    pub fn for_drone(
        model: DroneModel,
        frame_width: u32,
        frame_height: u32,
        fps: f64,
    ) -> Result<Self, Error> {
        let (focal, sw, sh) = model.optics();

        Self::new(focal, sw, sh, frame_width, frame_height, fps)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidIntrinsics(format!("{} must be positive, got {}", name, v)))
            }
        };

        positive("focal length", self.focal_length_mm)?;
        positive("sensor width", self.sensor_width_mm)?;
        positive("sensor height", self.sensor_height_mm)?;
        positive("fps", self.fps)?;

        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(Error::InvalidIntrinsics(format!(
                "frame size must be non-empty, got {}x{}",
                self.frame_width, self.frame_height
            )));
        }

        Ok(())
    }

    /// Ground sample distance at `altitude_m` above the road.
    #[inline]
    pub fn scale_at(&self, altitude_m: f64) -> Scale {
        Scale {
            horizontal: altitude_m * self.sensor_width_mm
                / (self.focal_length_mm * self.frame_width as f64),
            vertical: altitude_m * self.sensor_height_mm
                / (self.focal_length_mm * self.frame_height as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_crop_to_aspect() {
        // 4:3 sensor loses height
        let (w, h) = crop_to_aspect(8.0, 6.0, SENSOR_ASPECT_RATIO);
        assert_relative_eq!(w, 8.0, epsilon = 1e-12);
        assert_relative_eq!(h, 4.5, epsilon = 1e-12);

        // already wider than 16:9 loses width
        let (w, h) = crop_to_aspect(20.0, 9.0, SENSOR_ASPECT_RATIO);
        assert_relative_eq!(w, 16.0, epsilon = 1e-12);
        assert_relative_eq!(h, 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scale_formula() {
        let cam = CameraIntrinsics::new(10.0, 16.0, 9.0, 1600, 900, 30.0).unwrap();
        let scale = cam.scale_at(100.0);

        assert_relative_eq!(scale.horizontal, 100.0 * 16.0 / (10.0 * 1600.0), epsilon = 1e-12);
        assert_relative_eq!(scale.vertical, 100.0 * 9.0 / (10.0 * 900.0), epsilon = 1e-12);
        assert_relative_eq!(scale.horizontal, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_drone_preset() {
        let cam = CameraIntrinsics::for_drone(DroneModel::DjiAir2S, 3840, 2160, 30.0).unwrap();

        assert_relative_eq!(cam.focal_length_mm, 22.0, epsilon = 1e-12);
        assert_relative_eq!(cam.sensor_width_mm, 13.2, epsilon = 1e-12);
        assert_relative_eq!(cam.sensor_height_mm, 13.2 / SENSOR_ASPECT_RATIO, epsilon = 1e-12);

        // square pixels after the crop
        let scale = cam.scale_at(50.0);
        assert_relative_eq!(scale.horizontal, scale.vertical, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_intrinsics() {
        assert!(CameraIntrinsics::new(0.0, 8.0, 6.0, 1920, 1080, 30.0).is_err());
        assert!(CameraIntrinsics::new(6.7, 8.0, 6.0, 1920, 1080, f64::NAN).is_err());
        assert!(CameraIntrinsics::new(6.7, 8.0, 6.0, 0, 1080, 30.0).is_err());
    }

    #[test]
    fn test_to_meters() {
        let scale = Scale::new(0.05, 0.1);
        let m = scale.to_meters(na::Vector2::new(10.0, 10.0));

        assert_relative_eq!(m.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(m.y, 1.0, epsilon = 1e-12);
    }
}
