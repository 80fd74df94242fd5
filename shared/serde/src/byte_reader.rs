use crate::{error::SerdeErr, DEFAULT_MAX_ARRAY_LENGTH, DEFAULT_MAX_STRING_LENGTH};

/// Consumes the [`ByteWriter`](crate::ByteWriter) grammar from an owned byte
/// sequence with an internal cursor.
///
/// A failed read never panics. Fixed-width reads leave the cursor where it
/// was; length-prefixed reads consume the prefix and nothing after it.
#[derive(Debug, Clone)]
pub struct ByteReader {
    bytes: Box<[u8]>,
    cursor: usize,
}

impl ByteReader {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
            cursor: 0,
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }

    /// Current cursor position, in bytes from the start
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Total length of the underlying buffer
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn take(&mut self, needed: usize) -> Result<&[u8], SerdeErr> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(SerdeErr::UnexpectedEnd { needed, remaining });
        }
        let start = self.cursor;
        self.cursor += needed;
        Ok(&self.bytes[start..self.cursor])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], SerdeErr> {
        let mut output = [0_u8; N];
        output.copy_from_slice(self.take(N)?);
        Ok(output)
    }

    pub fn read_u8(&mut self) -> Result<u8, SerdeErr> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, SerdeErr> {
        let remaining = self.remaining();
        if remaining == 0 {
            return Err(SerdeErr::UnexpectedEnd {
                needed: 1,
                remaining,
            });
        }
        match self.bytes[self.cursor] {
            0 => {
                self.cursor += 1;
                Ok(false)
            }
            1 => {
                self.cursor += 1;
                Ok(true)
            }
            value => Err(SerdeErr::InvalidBool { value }),
        }
    }

    pub fn read_u16(&mut self) -> Result<u16, SerdeErr> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, SerdeErr> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, SerdeErr> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, SerdeErr> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, SerdeErr> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    /// Reads a 4-byte length prefix and validates it against `max`
    fn read_length(&mut self, max: usize) -> Result<usize, SerdeErr> {
        let length = self.read_i32()?;
        if length < 0 {
            return Err(SerdeErr::NegativeLength { length });
        }
        let length = length as usize;
        if length > max {
            return Err(SerdeErr::LengthExceeded { length, max });
        }
        Ok(length)
    }

    /// Reads a length-prefixed UTF-8 string of at most
    /// [`DEFAULT_MAX_STRING_LENGTH`] bytes
    pub fn read_string(&mut self) -> Result<String, SerdeErr> {
        self.read_string_max(DEFAULT_MAX_STRING_LENGTH)
    }

    /// Reads a length-prefixed UTF-8 string of at most `max_length` bytes
    pub fn read_string_max(&mut self, max_length: usize) -> Result<String, SerdeErr> {
        let length = self.read_length(max_length)?;
        let bytes = self.take(length)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| SerdeErr::InvalidUtf8)
    }

    pub fn read_u32_array(&mut self) -> Result<Vec<u32>, SerdeErr> {
        self.read_u32_array_max(DEFAULT_MAX_ARRAY_LENGTH)
    }

    pub fn read_u32_array_max(&mut self, max_length: usize) -> Result<Vec<u32>, SerdeErr> {
        let length = self.read_length(max_length)?;
        self.ensure_remaining(length, 4)?;
        let mut output = Vec::with_capacity(length);
        for _ in 0..length {
            output.push(self.read_u32()?);
        }
        Ok(output)
    }

    pub fn read_i32_array(&mut self) -> Result<Vec<i32>, SerdeErr> {
        self.read_i32_array_max(DEFAULT_MAX_ARRAY_LENGTH)
    }

    pub fn read_i32_array_max(&mut self, max_length: usize) -> Result<Vec<i32>, SerdeErr> {
        let length = self.read_length(max_length)?;
        self.ensure_remaining(length, 4)?;
        let mut output = Vec::with_capacity(length);
        for _ in 0..length {
            output.push(self.read_i32()?);
        }
        Ok(output)
    }

    /// Reads a length-prefixed byte blob of at most `max_length` bytes
    pub fn read_prefixed_bytes(&mut self, max_length: usize) -> Result<Vec<u8>, SerdeErr> {
        let length = self.read_length(max_length)?;
        Ok(self.take(length)?.to_vec())
    }

    /// Reads exactly `length` raw bytes
    pub fn read_raw(&mut self, length: usize) -> Result<&[u8], SerdeErr> {
        self.take(length)
    }

    /// Returns everything after the cursor and moves it to the end
    pub fn read_to_end(&mut self) -> &[u8] {
        let start = self.cursor;
        self.cursor = self.bytes.len();
        &self.bytes[start..]
    }

    // A declared element count must fit in what is left, so a hostile prefix
    // can't make us allocate before the short read is noticed.
    fn ensure_remaining(&self, count: usize, width: usize) -> Result<(), SerdeErr> {
        let needed = count.saturating_mul(width);
        let remaining = self.remaining();
        if needed > remaining {
            return Err(SerdeErr::UnexpectedEnd { needed, remaining });
        }
        Ok(())
    }
}
