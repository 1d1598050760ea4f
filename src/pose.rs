use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

/// Oriented bounding box in pixel space: center, size and rotation in degrees.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "angle")]
    pub angle_deg: f64,
}

impl Pose {
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64, angle_deg: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            angle_deg,
        }
    }

    #[inline(always)]
    pub fn center(&self) -> na::Point2<f64> {
        na::Point2::new(self.x, self.y)
    }

    /// Same size and rotation, moved to `center`.
    #[inline]
    pub fn with_center(&self, center: na::Point2<f64>) -> Self {
        Self {
            x: center.x,
            y: center.y,
            ..*self
        }
    }

    #[inline]
    pub fn distance_to(&self, other: &Pose) -> f64 {
        na::distance(&self.center(), &other.center())
    }

    /// Box vertices, counter-clockwise starting from the bottom-left corner
    /// of the unrotated box.
    pub fn corners(&self) -> [na::Point2<f64>; 4] {
        let rot = na::Rotation2::new(self.angle_deg.to_radians());
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        let c = self.center();

        [
            c + rot * na::Vector2::new(-hw, hh),
            c + rot * na::Vector2::new(-hw, -hh),
            c + rot * na::Vector2::new(hw, -hh),
            c + rot * na::Vector2::new(hw, hh),
        ]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Small,
    Large,
}

impl VehicleClass {
    /// Maps detector class ids onto vehicle classes. Anything else is not a vehicle.
    #[inline]
    pub fn from_class_id(class_id: i32) -> Option<Self> {
        match class_id {
            9 => Some(VehicleClass::Large),
            10 => Some(VehicleClass::Small),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Small => "small",
            VehicleClass::Large => "large",
        }
    }
}

/// Raw detector output for one object.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    #[serde(flatten)]
    pub pose: Pose,
    #[serde(rename = "c")]
    pub class_id: i32,
}

impl Detection {
    #[inline]
    pub fn new(pose: Pose, class_id: i32) -> Self {
        Self { pose, class_id }
    }

    #[inline(always)]
    pub fn class(&self) -> Option<VehicleClass> {
        VehicleClass::from_class_id(self.class_id)
    }
}
