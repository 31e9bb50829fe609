//! # Roomsync Colocate
//! Keeps the local rig's world transform consistent with the shared anchor
//! frame every other participant is aligning to.

mod anchor;
mod calibrate;
mod pose;

pub use anchor::{AnchorId, AnchorProvider, SharedAnchor};
pub use calibrate::{find_closest_anchor, Calibrator, CalibratorConfig, RigFrame};
pub use pose::Pose;
