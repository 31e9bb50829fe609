use std::sync::Arc;

use crate::types::PeerId;

/// An inbound or outbound message payload.
///
/// Reference-counted and immutable, so the authority can relay the exact
/// bytes it received without copying or re-encoding them.
pub type Payload = Arc<[u8]>;

/// The delivery layer the replication session sends through.
///
/// Implementations must deliver payloads reliably and in order per
/// connection, fragmenting and reassembling large payloads as needed.
pub trait Transport {
    /// Queue a payload for delivery to a single peer.
    fn send(&mut self, peer: PeerId, payload: Payload);

    /// Drain every payload that has arrived since the last call, in
    /// per-connection delivery order.
    fn receive(&mut self) -> Vec<(PeerId, Payload)>;

    /// Ids of every currently connected remote peer.
    fn peers(&self) -> Vec<PeerId>;
}
