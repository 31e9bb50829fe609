use crate::pose::Pose;

/// Identifies one shared anchor instance.
///
/// A replaced anchor (user recalibration, re-share) carries a new id; the
/// calibrator keys its "anchor changed" trigger off identity, not pose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnchorId(pub u64);

/// A physical-world reference point shared across the group.
///
/// `shared_pose` is the world pose the group agreed on for this anchor.
/// `tracking_pose` is where the device localizes the anchor right now,
/// expressed in current world coordinates (device tracking mapped through
/// the rig, the frame the provider renders anchors in); absent while
/// tracking is lost. Anchors are never mutated once obtained; a new instance
/// replaces the old wholesale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SharedAnchor {
    pub id: AnchorId,
    pub tracking_pose: Option<Pose>,
    pub shared_pose: Pose,
}

impl SharedAnchor {
    /// An anchor is usable only once the device has localized it.
    pub fn is_localized(&self) -> bool {
        self.tracking_pose.is_some()
    }
}

/// Supplies the currently known shared anchors.
///
/// The implementation (platform anchor SDK, fiducial tags, a test stub) is
/// chosen at construction; the calibrator never inspects what sits behind
/// the trait.
pub trait AnchorProvider {
    fn anchors(&self) -> Vec<SharedAnchor>;
}
