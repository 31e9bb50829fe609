use crate::{error::SerdeErr, reader::ByteReader, writer::ByteWriter};

/// A type that can write itself to, and read itself from, the wire.
pub trait Serde: Sized {
    fn ser(&self, writer: &mut ByteWriter);

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;
}
