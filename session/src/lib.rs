//! # Roomsync Session
//! Owns the replication decisions: when to send, to whom, and how inbound
//! data is merged and relayed. Also hosts the background pipeline that turns
//! per-frame scans into encoded delta messages off the simulation tick.

mod config;
mod pipeline;
mod session;

pub use config::SessionConfig;
pub use pipeline::{DeltaPipeline, EncodedScan, PipelineError};
pub use session::{ConnectionStatus, ReplicationSession};
