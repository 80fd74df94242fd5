use thiserror::Error;

/// Errors produced when a byte sequence does not follow the codec grammar.
/// Every variant means the message is malformed and the bytes that follow
/// cannot be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// Buffer ended before a value could be read
    #[error("Unexpected end of buffer: needed {needed} bytes but only {remaining} remain")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// A length prefix was negative
    #[error("Negative length prefix {length} encountered")]
    NegativeLength { length: i32 },

    /// A length prefix exceeded the maximum the reader allows
    #[error("Length prefix {length} exceeds the maximum of {max}")]
    LengthExceeded { length: usize, max: usize },

    /// String bytes were not valid UTF-8
    #[error("String payload is not valid UTF-8")]
    InvalidUtf8,

    /// Boolean byte was neither 0 nor 1
    #[error("Invalid boolean byte {value}, expected 0 or 1")]
    InvalidBool { value: u8 },
}
