use crate::delta::{narrow_value, DeltaRecord, WireError};

/// Sentinel marking a per-frame cell the scanner did not touch this frame.
///
/// Matches the depth mapper's unwritten marker; it sits inside the i16 wire
/// range, so the sentinel itself survives narrowing.
pub const UNWRITTEN: i32 = -32000;

/// The locally-owned scan of the room surface.
///
/// One i32 height/occupancy value per cell in flat row-major layout
/// (`row * width + col`), with a parallel per-frame buffer marking which
/// cells the sensor wrote this frame. Allocated once when the scan source
/// comes up; lives for the session.
pub struct GridModel {
    width: usize,
    height: usize,
    cells: Vec<i32>,
    per_frame: Vec<i32>,
}

impl GridModel {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        debug_assert!(size <= u32::MAX as usize, "cell index must fit the wire's u32");
        Self {
            width,
            height,
            cells: vec![0; size],
            per_frame: vec![UNWRITTEN; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn index_of(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.height && col < self.width);
        row * self.width + col
    }

    pub fn cell(&self, index: usize) -> i32 {
        self.cells[index]
    }

    pub fn cells(&self) -> &[i32] {
        &self.cells
    }

    /// Record a scan sample. Producer (simulation thread) only.
    pub fn write_cell(&mut self, index: usize, value: i32) {
        debug_assert_eq!(self.cells.len(), self.per_frame.len());
        self.cells[index] = value;
        self.per_frame[index] = value;
    }

    /// Clone the per-frame buffer for the encoder.
    ///
    /// The encoder must never read the live buffer: the next tick's scan may
    /// already be rewriting it while the background pass runs.
    pub fn snapshot_per_frame(&self) -> Vec<i32> {
        self.per_frame.clone()
    }

    /// Refill the per-frame buffer with `UNWRITTEN`.
    ///
    /// Separate from collection on purpose: the session clears only after a
    /// successful hand-off, so an encoding failure cannot silently drop
    /// unsent changes.
    pub fn clear_per_frame(&mut self) {
        self.per_frame.fill(UNWRITTEN);
    }

    /// Merge a decoded message into the grid, last write wins per index.
    ///
    /// The whole message is validated before any cell is touched, so a
    /// message carrying an out-of-range index (a peer with mismatched grid
    /// dimensions) leaves the grid exactly as it was.
    pub fn apply(&mut self, records: &[DeltaRecord]) -> Result<(), WireError> {
        let len = self.cells.len();
        for record in records {
            if record.index as usize >= len {
                return Err(WireError::IndexOutOfRange {
                    index: record.index,
                    len,
                });
            }
        }
        for record in records {
            self.cells[record.index as usize] = i32::from(record.value);
        }
        Ok(())
    }

    /// Clear everything back to the initial state. Runs when a connection is
    /// (re)established so no participant inherits stale local deltas.
    pub fn reset(&mut self) {
        self.cells.fill(0);
        self.per_frame.fill(UNWRITTEN);
    }

    /// Every non-default cell as a record list: the full-state snapshot a
    /// late joiner receives. Rides the ordinary delta wire format.
    pub fn non_default_records(&self) -> Vec<DeltaRecord> {
        let mut records = Vec::new();
        let mut clamped: usize = 0;

        for (index, &value) in self.cells.iter().enumerate() {
            if value == 0 {
                continue;
            }
            records.push(DeltaRecord {
                index: index as u32,
                value: narrow_value(value, &mut clamped),
            });
        }

        if clamped > 0 {
            log::warn!("clamped {clamped} cell value(s) while snapshotting the grid");
        }
        records
    }
}

// Tests
