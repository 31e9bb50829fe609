use roomsync_serde::{
    read_varint, write_varint, zigzag_decode, zigzag_encode, ByteReader, ByteWriter, Serde,
    SerdeErr, MAX_VARINT32_BYTES,
};
use thiserror::Error;

use crate::grid::UNWRITTEN;

/// Upper bound on one encoded record: a full-width index varint plus a
/// full-width zigzagged value varint.
pub const MAX_RECORD_BYTES: usize = MAX_VARINT32_BYTES * 2;

/// A single changed-cell update.
///
/// `value` is the cell's scan value narrowed to the wire width; most deltas
/// cluster near zero, which is what the varint encoding is tuned for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeltaRecord {
    pub index: u32,
    pub value: i16,
}

impl Serde for DeltaRecord {
    fn ser(&self, writer: &mut ByteWriter) {
        write_varint(writer, self.index);
        write_varint(writer, zigzag_encode(i32::from(self.value)));
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let index = read_varint(reader)?;
        let value_offset = reader.offset();
        let wide = zigzag_decode(read_varint(reader)?);
        let value = i16::try_from(wide).map_err(|_| SerdeErr::ValueOutOfRange {
            offset: value_offset,
        })?;
        Ok(Self { index, value })
    }
}

/// Errors in the delta message layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WireError {
    /// Wire primitive error
    #[error("Wire error: {0}")]
    Serde(#[from] SerdeErr),

    /// The message ends partway through a record
    #[error("Message ends with a partial record after {records_decoded} complete record(s), at offset {offset}. The message is malformed")]
    TrailingRecord {
        records_decoded: usize,
        offset: usize,
    },

    /// A record addresses a cell outside the local grid
    #[error("Record index {index} is outside the grid of {len} cells")]
    IndexOutOfRange { index: u32, len: usize },
}

/// Scan a per-frame buffer and emit one record for every written cell.
///
/// Single forward pass: output is ordered by ascending index with no
/// duplicate indices, and an empty result is valid. The buffer itself is not
/// touched; clearing it is the caller's explicit step once the records have
/// actually been handed off.
///
/// Values outside the i16 wire range are clamped, and one warning per scan
/// reports how many cells were affected.
pub fn collect_updates(per_frame: &[i32]) -> Vec<DeltaRecord> {
    let (records, clamped) = collect_span(per_frame, 0);
    if clamped > 0 {
        log::warn!("clamped {clamped} cell value(s) to the i16 wire range this scan");
    }
    records
}

/// Scan one span of a per-frame buffer.
///
/// `index_base` offsets the emitted indices, so chunked scans can run over
/// subslices and concatenate their outputs in slice order. Returns the
/// records plus the count of clamped cells; reporting is the caller's job so
/// a chunked scan still warns once.
pub fn collect_span(per_frame: &[i32], index_base: u32) -> (Vec<DeltaRecord>, usize) {
    let mut records = Vec::new();
    let mut clamped: usize = 0;

    for (offset, &value) in per_frame.iter().enumerate() {
        if value == UNWRITTEN {
            continue;
        }
        records.push(DeltaRecord {
            index: index_base + offset as u32,
            value: narrow_value(value, &mut clamped),
        });
    }
    (records, clamped)
}

/// Narrow a cell value to the wire width, clamping deterministically at the
/// range ends. Wrapping is never acceptable here: a wrapped value would
/// corrupt remote cells with a plausible-looking number.
pub(crate) fn narrow_value(value: i32, clamped: &mut usize) -> i16 {
    match i16::try_from(value) {
        Ok(narrow) => narrow,
        Err(_) => {
            *clamped += 1;
            if value < 0 {
                i16::MIN
            } else {
                i16::MAX
            }
        }
    }
}

/// Serialize a collected record list into one message buffer.
///
/// Runs after collection so the buffer can be sized from the known record
/// count in a single fill pass.
pub fn encode_records(records: &[DeltaRecord]) -> Vec<u8> {
    let mut writer = ByteWriter::with_capacity(records.len() * MAX_RECORD_BYTES);
    for record in records {
        record.ser(&mut writer);
    }
    writer.to_bytes()
}

/// Decode a message buffer back into its record list.
///
/// The buffer must hold a whole number of records: a message that ends
/// partway through a record is rejected outright, never partially applied.
/// An empty buffer decodes to an empty list.
pub fn decode_records(payload: &[u8]) -> Result<Vec<DeltaRecord>, WireError> {
    let mut reader = ByteReader::new(payload);
    let mut records = Vec::new();

    while !reader.is_empty() {
        match DeltaRecord::de(&mut reader) {
            Ok(record) => records.push(record),
            Err(SerdeErr::UnexpectedEnd { offset }) => {
                return Err(WireError::TrailingRecord {
                    records_decoded: records.len(),
                    offset,
                });
            }
            Err(err) => return Err(WireError::Serde(err)),
        }
    }
    Ok(records)
}

// Tests
