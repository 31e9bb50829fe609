use crate::error::SerdeErr;

/// A cursor over a borrowed byte buffer for decoding inbound messages.
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let Some(&byte) = self.buffer.get(self.cursor) else {
            return Err(SerdeErr::UnexpectedEnd {
                offset: self.cursor,
            });
        };
        self.cursor += 1;
        Ok(byte)
    }

    /// Current read position, in bytes from the start of the buffer.
    pub fn offset(&self) -> usize {
        self.cursor
    }

    pub fn bytes_remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor >= self.buffer.len()
    }
}
