use crate::config::TrackerConfig;
use crate::error::Error;
use crate::pose::{Detection, Pose, VehicleClass};
use crate::scale::{CameraIntrinsics, Scale};
use crate::track::Track;

use nalgebra as na;
use serde_derive::Serialize;

/// Axis-aligned tracking area in pixels, bounds inclusive.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Region {
    /// Centered box covering `fraction` of each frame dimension, snapped to whole pixels.
    pub fn centered(frame_width: u32, frame_height: u32, fraction: f64) -> Self {
        let rw = (frame_width as f64 * fraction).floor() as u32;
        let rh = (frame_height as f64 * fraction).floor() as u32;
        let x1 = (frame_width - rw.min(frame_width)) / 2;
        let y1 = (frame_height - rh.min(frame_height)) / 2;

        Self {
            min: [x1 as f64, y1 as f64],
            max: [(x1 + rw) as f64, (y1 + rh) as f64],
        }
    }

    #[inline]
    pub fn contains(&self, p: na::Point2<f64>) -> bool {
        self.min[0] <= p.x && p.x <= self.max[0] && self.min[1] <= p.y && p.y <= self.max[1]
    }
}

/// What a submitted detection did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    /// Center outside the tracking region, nothing changed
    OutsideRegion,
    Matched { id: u64, confirmed_now: bool },
    Created { id: u64 },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TrackSnapshot {
    pub id: u64,
    pub pose: Pose,
    pub smoothed_speed_kmh: f64,
    pub class: VehicleClass,
    pub miss_count: u32,
    /// Smoothed trajectory, oldest first
    pub trail: Vec<[f64; 2]>,
}

impl From<&Track> for TrackSnapshot {
    fn from(t: &Track) -> TrackSnapshot {
        TrackSnapshot {
            id: t.id(),
            pose: t.pose(),
            smoothed_speed_kmh: t.smoothed_speed(),
            class: t.class(),
            miss_count: t.miss_count(),
            trail: t.trajectory().iter().map(|p| [p.x, p.y]).collect(),
        }
    }
}

/// Frame-consistent copy of the confirmed fleet.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct FleetSnapshot {
    pub tracks: Vec<TrackSnapshot>,
    /// Mean smoothed speed over confirmed tracks with more than 2 smoothed samples
    pub average_speed_kmh: f64,
    /// Tracks included in `average_speed_kmh`
    pub averaged_tracks: usize,
    /// Confirmations since start, including tracks already dropped
    pub confirmed_count: usize,
    /// Live confirmed tracks per video frame rate
    pub traffic_density: f64,
}

pub struct Registry {
    config: TrackerConfig,
    fps: f64,
    region: Region,
    tracks: Vec<Track>,
    next_id: u64,
    confirmed_count: usize,
    /// Last finite scale passed to `advance_frame`
    scale: Scale,
}

impl Registry {
    pub fn new(config: TrackerConfig, intrinsics: &CameraIntrinsics) -> Result<Self, Error> {
        config.validate()?;
        intrinsics.validate()?;

        let region = Region::centered(
            intrinsics.frame_width,
            intrinsics.frame_height,
            config.roi_fraction,
        );

        Ok(Self {
            fps: intrinsics.fps,
            region,
            tracks: Vec::with_capacity(config.max_tracks),
            next_id: 1,
            confirmed_count: 0,
            scale: Scale::default(),
            config,
        })
    }

    /// Opens a frame: every live track is charged one miss, and the returned
    /// guard is the only way to submit this frame's detections. A non-finite
    /// `scale` is replaced by the last finite one.
    pub fn advance_frame(&mut self, scale: Scale) -> FrameUpdate<'_> {
        if scale.is_finite() {
            self.scale = scale;
        } else {
            tracing::warn!(
                horizontal = scale.horizontal,
                vertical = scale.vertical,
                "non-finite scale, keeping previous scale"
            );
        }

        for t in &mut self.tracks {
            t.increment_miss();
        }

        let scale = self.scale;
        FrameUpdate {
            registry: self,
            scale,
        }
    }

    fn gate(&self, track: &Track) -> f64 {
        if track.miss_count() <= 1 && track.history_len() > self.config.settled_history_len {
            self.config.near_gate_px
        } else {
            self.config.far_gate_px
        }
    }

    fn submit_detection(&mut self, pose: Pose, class: VehicleClass, scale: &Scale) -> Association {
        if !self.region.contains(pose.center()) {
            tracing::trace!(x = pose.x, y = pose.y, "detection outside tracking region");
            return Association::OutsideRegion;
        }

        // first fit in insertion order, not nearest
        let matched = self.tracks.iter().position(|t| {
            let dist = t.predict_next().distance_to(&pose);
            dist < self.gate(t)
        });

        if let Some(idx) = matched {
            let (fps, confirm_kmh) = (self.fps, self.config.confirm_speed_kmh);
            let track = &mut self.tracks[idx];

            track.update(pose);
            let confirmed_now = track.update_speed(fps, scale, confirm_kmh);
            let id = track.id();

            if confirmed_now {
                self.confirmed_count += 1;
                tracing::debug!(
                    id,
                    speed_kmh = track.smoothed_speed(),
                    total = self.confirmed_count,
                    "track confirmed"
                );
            }

            return Association::Matched { id, confirmed_now };
        }

        let id = self.next_id;
        self.next_id += 1;
        self.tracks.push(Track::new(id, pose, class, self.config.window));

        tracing::debug!(id, class = class.as_str(), x = pose.x, y = pose.y, "track created");

        Association::Created { id }
    }

    /// Drops tracks that ran out of miss budget, after trimming the set to
    /// the `max_tracks` most recently created. Returns how many were removed.
    pub fn prune_stale(&mut self) -> usize {
        let before = self.tracks.len();

        if self.tracks.len() > self.config.max_tracks {
            let excess = self.tracks.len() - self.config.max_tracks;
            self.tracks.drain(..excess);
            tracing::debug!(excess, "evicted oldest tracks over capacity");
        }

        let budget = self.config.max_miss_budget;
        self.tracks.retain(|t| {
            let keep = t.miss_count() < budget;
            if !keep {
                tracing::debug!(id = t.id(), misses = t.miss_count(), "track lost");
            }
            keep
        });

        before - self.tracks.len()
    }

    pub fn fleet_snapshot(&self) -> FleetSnapshot {
        let confirmed: Vec<&Track> = self.tracks.iter().filter(|t| t.is_confirmed()).collect();

        let averaged: Vec<f64> = confirmed
            .iter()
            .filter(|t| t.speed_history().len() > 2)
            .map(|t| t.smoothed_speed())
            .collect();

        let average_speed_kmh = if averaged.is_empty() {
            0.0
        } else {
            averaged.iter().sum::<f64>() / averaged.len() as f64
        };

        FleetSnapshot {
            traffic_density: confirmed.len() as f64 / self.fps.max(1.0),
            tracks: confirmed.into_iter().map(Into::into).collect(),
            average_speed_kmh,
            averaged_tracks: averaged.len(),
            confirmed_count: self.confirmed_count,
        }
    }

    /// Smoothed speed history of a confirmed track, `None` for unknown or
    /// unconfirmed ids.
    pub fn speed_history(&self, id: u64) -> Option<Vec<f64>> {
        self.tracks
            .iter()
            .find(|t| t.id() == id && t.is_confirmed())
            .map(|t| t.speed_history().to_vec())
    }

    #[inline]
    pub fn track(&self, id: u64) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id() == id)
    }

    #[inline]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[inline]
    pub fn confirmed_count(&self) -> usize {
        self.confirmed_count
    }

    #[inline]
    pub fn region(&self) -> &Region {
        &self.region
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}

/// One frame in progress. Misses are already charged; dropping the guard
/// without `finish` skips pruning for this frame.
pub struct FrameUpdate<'a> {
    registry: &'a mut Registry,
    scale: Scale,
}

impl<'a> FrameUpdate<'a> {
    /// Matches `pose` against live tracks or starts a new one.
    #[inline]
    pub fn submit_detection(&mut self, pose: Pose, class: VehicleClass) -> Association {
        self.registry.submit_detection(pose, class, &self.scale)
    }

    /// Like `submit_detection`, for raw detector output. Detections of
    /// non-vehicle classes are ignored and yield `None`.
    pub fn submit(&mut self, det: &Detection) -> Option<Association> {
        let class = det.class()?;

        Some(self.submit_detection(det.pose, class))
    }

    #[inline]
    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    /// Closes the frame: prunes stale tracks and returns the fleet snapshot.
    pub fn finish(self) -> FleetSnapshot {
        self.registry.prune_stale();
        self.registry.fleet_snapshot()
    }
}
