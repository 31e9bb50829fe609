use roomsync_shared::{PeerId, SessionRole};

/// Host-supplied session parameters, fixed at session start.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Grid width in cells.
    pub grid_width: usize,
    /// Grid height in cells.
    pub grid_height: usize,
    /// This participant's replication role.
    pub role: SessionRole,
    /// This participant's id, assigned by the external session layer.
    pub local_id: PeerId,
    /// Where a non-authority participant sends its deltas.
    pub authority_id: PeerId,
    /// Whether the authority sends a one-time full-state snapshot to each
    /// newly joined peer. Off, a late joiner only ever sees cells that
    /// change after it joined.
    pub snapshot_on_join: bool,
}

impl SessionConfig {
    pub fn new(grid_width: usize, grid_height: usize, role: SessionRole, local_id: PeerId) -> Self {
        Self {
            grid_width,
            grid_height,
            role,
            local_id,
            authority_id: PeerId(0),
            snapshot_on_join: true,
        }
    }
}
