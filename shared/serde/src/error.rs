use thiserror::Error;

/// Errors that can occur while reading wire data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The reader ran out of bytes in the middle of a value
    #[error("Unexpected end of buffer at offset {offset}. The message is truncated")]
    UnexpectedEnd { offset: usize },

    /// A variable-length integer did not terminate within its maximum width
    #[error("Variable-length integer at offset {offset} exceeds {max_bytes} bytes. The message is malformed")]
    VarIntOverflow { offset: usize, max_bytes: usize },

    /// A decoded value does not fit the range of its target type
    #[error("Value decoded at offset {offset} is outside the range of its target type. The message is malformed")]
    ValueOutOfRange { offset: usize },
}
