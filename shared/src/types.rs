use std::fmt;

/// Identifies one participant in a replication session. Assigned by the
/// external session/matchmaking layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}

/// The participant's replication role. Exactly one authority exists per
/// session, and the role is fixed for the session lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionRole {
    /// Holds the canonical room state and relays every message to all other
    /// participants.
    Authority,
    /// Consumes replicated state and sends its own deltas to the authority
    /// only; never relays.
    Peer,
}

impl SessionRole {
    pub fn is_authority(self) -> bool {
        matches!(self, SessionRole::Authority)
    }
}
