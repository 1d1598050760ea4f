use crate::motion;
use crate::pose::{Pose, VehicleClass};
use crate::scale::Scale;
use crate::speed::{self, SpeedEstimator};
use crate::window::SlidingWindow;
use nalgebra as na;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Smoothed speed has never exceeded the confirmation threshold
    #[default]
    Unconfirmed,
    /// Counted as a moving vehicle, terminal
    Confirmed,
}

/// One vehicle followed across frames.
#[derive(Debug, Clone)]
pub struct Track {
    id: u64,
    class: VehicleClass,
    window: usize,
    pose: Pose,
    history: SlidingWindow<Pose>,
    trajectory: Vec<na::Point2<f64>>,
    miss_count: u32,
    speed: SpeedEstimator,
    state: TrackState,
}

impl Track {
    pub fn new(id: u64, pose: Pose, class: VehicleClass, window: usize) -> Self {
        let mut history = SlidingWindow::with_capacity(window);
        history.push(pose);

        Self {
            id,
            class,
            window,
            pose,
            trajectory: vec![pose.center()],
            history,
            miss_count: 0,
            speed: SpeedEstimator::new(window),
            state: TrackState::Unconfirmed,
        }
    }

    /// Records a matched detection.
    ///
    /// A track returning from more than one missed frame with a full history
    /// gets its gap filled: points of the smoothed trajectory are spliced in
    /// before the new pose and push the oldest raw samples out, so the window
    /// describes continuous motion instead of a jump.
    pub fn update(&mut self, pose: Pose) {
        self.pose = pose;
        self.history.push(pose);

        let history = self.history.to_vec();
        self.trajectory = motion::smooth(&history, self.miss_count);

        if self.miss_count > 1 && self.history.is_full() {
            self.reconcile_gap(pose);
        }

        self.miss_count = 0;
    }

    fn reconcile_gap(&mut self, pose: Pose) {
        self.history.pop_newest();

        // the two newest smoothed points belong to the new pose and the one
        // before it, the fill comes from the rest
        let usable = self.trajectory.len().saturating_sub(2);
        let missed = (self.miss_count - 1) as usize;
        let fill = &self.trajectory[usable.saturating_sub(missed)..usable];

        tracing::trace!(id = self.id, missed, filled = fill.len(), "reconciling occlusion gap");

        self.history.extend(fill.iter().map(|c| pose.with_center(*c)));
        self.history.push(pose);
    }

    /// Where the next detection is expected, accounting for frames missed so far.
    #[inline]
    pub fn predict_next(&self) -> Pose {
        let history = self.history.to_vec();

        motion::predict(&history, self.miss_count).unwrap_or(self.pose)
    }

    /// Refreshes the speed estimate from the smoothed trajectory.
    ///
    /// Returns `true` on the call that moves the track to `Confirmed`.
    pub fn update_speed(&mut self, fps: f64, scale: &Scale, confirm_kmh: f64) -> bool {
        let velocity = speed::average_velocity(&self.trajectory, self.window);
        let kmh = speed::to_kmh(velocity, scale, fps);

        if let Some(smoothed) = self.speed.push(kmh) {
            tracing::trace!(id = self.id, smoothed, "smoothed speed updated");
        }

        if self.state == TrackState::Unconfirmed && self.speed.smoothed() > confirm_kmh {
            self.state = TrackState::Confirmed;
            return true;
        }

        false
    }

    #[inline]
    pub fn increment_miss(&mut self) {
        self.miss_count += 1;
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn class(&self) -> VehicleClass {
        self.class
    }

    /// Last recorded pose.
    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn history(&self) -> impl Iterator<Item = &Pose> {
        self.history.iter()
    }

    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn trajectory(&self) -> &[na::Point2<f64>] {
        &self.trajectory
    }

    #[inline]
    pub fn miss_count(&self) -> u32 {
        self.miss_count
    }

    #[inline]
    pub fn speed_kmh(&self) -> f64 {
        self.speed.current()
    }

    #[inline]
    pub fn smoothed_speed(&self) -> f64 {
        self.speed.smoothed()
    }

    #[inline]
    pub fn speed_history(&self) -> &[f64] {
        self.speed.history()
    }

    #[inline]
    pub fn state(&self) -> TrackState {
        self.state
    }

    #[inline]
    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }
}
