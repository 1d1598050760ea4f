//! Vehicle tracking and speed estimation for nadir drone footage.
//!
//! Oriented boxes from an external detector are associated into tracks, each
//! track's trajectory is smoothed with a quadratic motion model, and pixel
//! velocity is converted to km/h using the ground sample distance derived from
//! the drone's altitude.

pub mod altitude;
pub mod config;
pub mod error;
pub mod frame;
pub mod math;
pub mod motion;
pub mod pose;
pub mod registry;
pub mod report;
pub mod scale;
pub mod speed;
pub mod track;
pub mod tracker;

mod window;

pub use config::TrackerConfig;
pub use error::Error;
pub use frame::Frame;
pub use pose::{Detection, Pose, VehicleClass};
pub use registry::{Association, FleetSnapshot, FrameUpdate, Registry, TrackSnapshot};
pub use scale::{CameraIntrinsics, DroneModel, Scale};
pub use track::{Track, TrackState};
pub use tracker::{FrameOutput, SpeedTracker};

pub trait Tracking {
    fn process(&mut self, frame: &Frame) -> tracker::FrameOutput;
    fn speed_history(&self, id: u64) -> Option<Vec<f64>>;
}
