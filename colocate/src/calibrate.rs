use glam::{Quat, Vec3};

use crate::anchor::{AnchorProvider, SharedAnchor};

/// The transform applied to the local user's whole tracked play space.
/// Mutated only by the calibrator: position and yaw, never pitch or roll,
/// so the floor plane stays level no matter how tilted an anchor's tracking
/// pose is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigFrame {
    pub position: Vec3,
    pub rotation: Quat,
}

impl RigFrame {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };
}

impl Default for RigFrame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Tuning for the calibration trigger policy.
#[derive(Clone, Debug)]
pub struct CalibratorConfig {
    /// Ignore anchors farther than this from the head (meters).
    pub max_anchor_distance: f32,
    /// How long a newly closest anchor must stay closest before the rig
    /// snaps to it (seconds).
    pub calibrate_delay: f32,
}

impl Default for CalibratorConfig {
    fn default() -> Self {
        Self {
            max_anchor_distance: 3.0,
            calibrate_delay: 1.0,
        }
    }
}

/// Linear scan for the localized anchor nearest the head position.
/// Unlocalized anchors are skipped; `None` when nothing is localized.
pub fn find_closest_anchor(anchors: &[SharedAnchor], head_position: Vec3) -> Option<SharedAnchor> {
    let mut closest: Option<SharedAnchor> = None;
    let mut closest_distance = f32::INFINITY;

    for anchor in anchors {
        let Some(tracking) = anchor.tracking_pose else {
            continue;
        };
        let distance = tracking.position.distance(head_position);
        if distance < closest_distance {
            closest = Some(*anchor);
            closest_distance = distance;
        }
    }
    closest
}

/// Keeps the rig aligned to whichever shared anchor is closest.
///
/// Calibration runs when the closest anchor changes identity and has stayed
/// closest for the settle delay, and again on an external recentre event.
/// The recentre re-run is deferred to `late_update` so it cannot race other
/// transform writes in the same tick.
pub struct Calibrator {
    provider: Box<dyn AnchorProvider>,
    config: CalibratorConfig,
    last_anchor: Option<SharedAnchor>,
    calibrate_timer: f32,
    colocated_to_last: bool,
    colocated_to_any: bool,
    recalibrate_pending: bool,
}

impl Calibrator {
    pub fn new(provider: Box<dyn AnchorProvider>, config: CalibratorConfig) -> Self {
        let calibrate_timer = config.calibrate_delay;
        Self {
            provider,
            config,
            last_anchor: None,
            calibrate_timer,
            colocated_to_last: false,
            colocated_to_any: false,
            recalibrate_pending: false,
        }
    }

    /// Whether the rig has been aligned to some anchor since anchors were
    /// last available.
    pub fn is_colocated(&self) -> bool {
        self.colocated_to_any
    }

    /// Handle a device-level pose reset. The recalibration itself runs at
    /// `late_update`.
    pub fn on_recenter(&mut self) {
        self.recalibrate_pending = true;
        log::info!("recenter detected, recalibrating to the last anchor");
    }

    /// Run the trigger policy once per simulation tick.
    ///
    /// `head_position` is the user's camera position in world space; `dt` is
    /// the tick duration in seconds.
    pub fn update(&mut self, rig: &mut RigFrame, head_position: Vec3, dt: f32) {
        let anchors = self.provider.anchors();
        if !anchors.iter().any(SharedAnchor::is_localized) {
            self.colocated_to_any = false;
        }

        let Some(found) = find_closest_anchor(&anchors, head_position) else {
            if self.last_anchor.is_some() {
                self.last_anchor = None;
                self.calibrate_timer = self.config.calibrate_delay;
                self.colocated_to_last = false;
            }
            return;
        };

        if self.last_anchor.map(|a| a.id) != Some(found.id) {
            self.calibrate_timer = self.config.calibrate_delay;
            self.colocated_to_last = false;
        }
        // keep the freshest localization of the same anchor
        self.last_anchor = Some(found);

        let within_range = found
            .tracking_pose
            .is_some_and(|t| t.position.distance(head_position) < self.config.max_anchor_distance);

        if within_range && !self.colocated_to_last {
            self.calibrate_timer = (self.calibrate_timer - dt).max(0.0);
            if self.calibrate_timer == 0.0 {
                self.calibrate(rig, &found);
                self.colocated_to_last = true;
            }
        }
    }

    /// Service a deferred recentre at the end of the tick.
    pub fn late_update(&mut self, rig: &mut RigFrame) {
        if self.recalibrate_pending {
            if let Some(anchor) = self.last_anchor {
                self.calibrate(rig, &anchor);
            }
            self.recalibrate_pending = false;
        }
    }

    /// Move the rig so its pose relative to the anchor's localized position
    /// becomes that same pose relative to the anchor's agreed world pose.
    ///
    /// Skipped when the anchor cannot currently be localized; that is an
    /// expected, recoverable condition retried next tick.
    pub fn calibrate(&mut self, rig: &mut RigFrame, anchor: &SharedAnchor) {
        let Some(tracking) = anchor.tracking_pose else {
            return;
        };

        let rig_mat = glam::Mat4::from_rotation_translation(rig.rotation, rig.position);
        let desired_mat = anchor.shared_pose.to_matrix();
        let anchor_mat = tracking.to_matrix();

        // the rig relative to the anchor
        let rig_local_to_anchor = anchor_mat.inverse() * rig_mat;
        // that relative pose re-expressed against the agreed pose
        let relative_to_desired = desired_mat * rig_local_to_anchor;

        let target_position = relative_to_desired.w_axis.truncate();

        let forward = relative_to_desired.transform_vector3(Vec3::Z);
        let flat_forward = Vec3::new(forward.x, 0.0, forward.z);
        if flat_forward.length_squared() < 1e-8 {
            // anchor pitched to a pole; nothing sane to face, retry next tick
            log::warn!("calibration skipped: anchor forward is degenerate");
            return;
        }

        // yaw-only look rotation keeps the rig level with gravity
        let yaw = flat_forward.x.atan2(flat_forward.z);
        rig.position = target_position;
        rig.rotation = Quat::from_rotation_y(yaw);

        self.colocated_to_any = true;
    }
}

// Tests
