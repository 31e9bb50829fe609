//! # Roomsync Shared
//! Common functionality shared between the roomsync session & colocation
//! crates: the grid model, the delta wire format, and the transport seam.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use roomsync_serde::{
    read_varint, write_varint, zigzag_decode, zigzag_encode, ByteReader, ByteWriter, Serde,
    SerdeErr, MAX_VARINT32_BYTES,
};

mod delta;
mod grid;
mod transport;
mod types;

pub use delta::{
    collect_span, collect_updates, decode_records, encode_records, DeltaRecord, WireError,
    MAX_RECORD_BYTES,
};
pub use grid::{GridModel, UNWRITTEN};
pub use transport::{Payload, Transport};
pub use types::{PeerId, SessionRole};
