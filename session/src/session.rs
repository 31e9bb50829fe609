use std::collections::HashSet;

use roomsync_shared::{
    decode_records, encode_records, GridModel, Payload, PeerId, SessionRole, Transport,
};

use crate::config::SessionConfig;
use crate::pipeline::DeltaPipeline;

/// Per-connection lifecycle. Replication is only active in `Connected`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// Replicates the local grid across the session and merges everyone else's
/// deltas into it.
///
/// Fan-out is asymmetric: the authority broadcasts its own deltas to every
/// peer and relays received messages to every peer except the sender, while
/// a non-authority participant only ever sends to the authority and never
/// relays. Relayed messages are the original byte buffers, so every peer
/// sees bit-identical payloads.
pub struct ReplicationSession {
    role: SessionRole,
    local_id: PeerId,
    authority_id: PeerId,
    snapshot_on_join: bool,
    status: ConnectionStatus,
    grid: GridModel,
    transport: Box<dyn Transport>,
    pipeline: DeltaPipeline,
    known_peers: HashSet<PeerId>,
}

impl ReplicationSession {
    pub fn new(config: SessionConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            role: config.role,
            local_id: config.local_id,
            authority_id: config.authority_id,
            snapshot_on_join: config.snapshot_on_join,
            status: ConnectionStatus::Disconnected,
            grid: GridModel::new(config.grid_width, config.grid_height),
            transport,
            pipeline: DeltaPipeline::spawn(),
            known_peers: HashSet::new(),
        }
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn local_id(&self) -> PeerId {
        self.local_id
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut GridModel {
        &mut self.grid
    }

    /// Drive the connection state machine.
    ///
    /// Entering `Connected` resets the grid and discards anything queued on
    /// the transport, so no participant merges deltas that straddle a
    /// reconnect.
    pub fn set_status(&mut self, status: ConnectionStatus) {
        if self.status == status {
            return;
        }
        if status == ConnectionStatus::Connected {
            self.grid.reset();
            let stale = self.transport.receive().len();
            if stale > 0 {
                log::info!("discarded {stale} stale message(s) queued before connect");
            }
            self.known_peers = self.transport.peers().into_iter().collect();
        }
        log::info!("{} replication: {:?} -> {:?}", self.local_id, self.status, status);
        self.status = status;
    }

    /// Feed this frame's scan into the background pipeline and clear the
    /// per-frame buffer.
    ///
    /// The clear only happens once the snapshot is accepted; a failed
    /// hand-off keeps the changes for the next attempt.
    pub fn on_scan(&mut self) {
        if self.status != ConnectionStatus::Connected {
            return;
        }
        let snapshot = self.grid.snapshot_per_frame();
        match self.pipeline.submit(snapshot) {
            Ok(()) => self.grid.clear_per_frame(),
            Err(err) => log::error!("scan not submitted: {err}"),
        }
    }

    /// One simulation tick: greet joiners, flush finished encodes, drain the
    /// network. Never blocks on the background pipeline.
    pub fn tick(&mut self) {
        if self.status != ConnectionStatus::Connected {
            // inbound processing is uninstalled outside Connected
            let _ = self.transport.receive();
            return;
        }
        self.greet_new_peers();
        self.flush_outbound();
        self.pump_inbound();
    }

    /// Authority only: send one full-state snapshot to each peer that joined
    /// since the last tick, so late joiners see the already-scanned room.
    fn greet_new_peers(&mut self) {
        let current: HashSet<PeerId> = self.transport.peers().into_iter().collect();

        if self.role.is_authority() && self.snapshot_on_join {
            for &peer in current.difference(&self.known_peers) {
                let records = self.grid.non_default_records();
                if records.is_empty() {
                    continue;
                }
                let payload: Payload = encode_records(&records).into();
                log::info!("{}: sending {} snapshot record(s) to {peer}", self.local_id, records.len());
                self.transport.send(peer, payload);
            }
        }
        self.known_peers = current;
    }

    fn flush_outbound(&mut self) {
        while let Some(scan) = self.pipeline.try_poll() {
            // a scan with no changes sends nothing
            if scan.record_count == 0 {
                continue;
            }
            let payload: Payload = scan.payload.into();
            if self.role.is_authority() {
                self.broadcast_except(None, &payload);
            } else {
                self.transport.send(self.authority_id, payload);
            }
        }
    }

    fn pump_inbound(&mut self) {
        for (sender, payload) in self.transport.receive() {
            self.handle_message(sender, payload);
        }
    }

    /// Merge one inbound message and, on the authority, relay the original
    /// bytes to every other peer. Malformed messages are dropped, never
    /// fatal.
    fn handle_message(&mut self, sender: PeerId, payload: Payload) {
        let records = match decode_records(&payload) {
            Ok(records) => records,
            Err(err) => {
                log::warn!("dropping malformed message from {sender}: {err}");
                return;
            }
        };
        if records.is_empty() {
            return;
        }
        if let Err(err) = self.grid.apply(&records) {
            log::warn!("dropping message from {sender}: {err}");
            return;
        }
        if self.role.is_authority() {
            self.broadcast_except(Some(sender), &payload);
        }
    }

    fn broadcast_except(&mut self, excluded: Option<PeerId>, payload: &Payload) {
        debug_assert!(self.role.is_authority(), "only the authority relays");
        for peer in self.transport.peers() {
            if Some(peer) == excluded || peer == self.local_id {
                continue;
            }
            self.transport.send(peer, Payload::clone(payload));
        }
    }
}

// Tests
