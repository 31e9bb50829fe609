//! # Roomsync Serde
//! Byte-level serialization primitives shared between the roomsync crates.

mod error;
mod reader;
mod serde;
mod varint;
mod writer;

pub use error::SerdeErr;
pub use reader::ByteReader;
pub use serde::Serde;
pub use varint::{
    read_varint, write_varint, zigzag_decode, zigzag_encode, MAX_VARINT32_BYTES,
};
pub use writer::ByteWriter;
