use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use roomsync_shared::{Payload, PeerId, Transport};

type Registry = Arc<Mutex<HashMap<PeerId, Sender<(PeerId, Payload)>>>>;

/// An in-process message hub standing in for the real network layer.
///
/// Every endpoint sees every other registered endpoint as a connected peer,
/// and each sender-receiver pair preserves delivery order, matching the
/// reliable-sequenced transport the session assumes.
#[derive(Clone)]
pub struct MemoryHub {
    registry: Registry,
}

impl MemoryHub {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create and register the endpoint for one participant.
    pub fn endpoint(&self, local_id: PeerId) -> MemoryTransport {
        let (tx, rx) = mpsc::channel();
        self.registry.lock().unwrap().insert(local_id, tx);
        MemoryTransport {
            local_id,
            registry: Arc::clone(&self.registry),
            inbound: rx,
        }
    }

    /// Remove a participant, as if its connection dropped.
    pub fn disconnect(&self, id: PeerId) {
        self.registry.lock().unwrap().remove(&id);
    }
}

impl Default for MemoryHub {
    fn default() -> Self {
        Self::new()
    }
}

/// One participant's view of the hub.
pub struct MemoryTransport {
    local_id: PeerId,
    registry: Registry,
    inbound: Receiver<(PeerId, Payload)>,
}

impl Transport for MemoryTransport {
    fn send(&mut self, peer: PeerId, payload: Payload) {
        let registry = self.registry.lock().unwrap();
        if let Some(tx) = registry.get(&peer) {
            let _ = tx.send((self.local_id, payload));
        }
    }

    fn receive(&mut self) -> Vec<(PeerId, Payload)> {
        self.inbound.try_iter().collect()
    }

    fn peers(&self) -> Vec<PeerId> {
        let registry = self.registry.lock().unwrap();
        let mut peers: Vec<PeerId> = registry
            .keys()
            .copied()
            .filter(|&id| id != self.local_id)
            .collect();
        peers.sort();
        peers
    }
}
