/// Accumulates primitives into a growable little-endian buffer.
///
/// Strings and arrays carry a 4-byte signed length prefix, matching what
/// [`ByteReader`](crate::ByteReader) expects.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(256),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a length prefix. Lengths beyond `i32::MAX` cannot be expressed
    /// on the wire and are clamped, which any reader will then reject.
    fn write_length(&mut self, length: usize) {
        let length = i32::try_from(length).unwrap_or(i32::MAX);
        self.write_i32(length);
    }

    /// Writes a UTF-8 string with a 4-byte byte-length prefix
    pub fn write_string(&mut self, value: &str) {
        self.write_length(value.len());
        self.buffer.extend_from_slice(value.as_bytes());
    }

    pub fn write_u32_array(&mut self, values: &[u32]) {
        self.write_length(values.len());
        for value in values {
            self.write_u32(*value);
        }
    }

    pub fn write_i32_array(&mut self, values: &[i32]) {
        self.write_length(values.len());
        for value in values {
            self.write_i32(*value);
        }
    }

    /// Writes a length-prefixed byte blob
    pub fn write_prefixed_bytes(&mut self, bytes: &[u8]) {
        self.write_length(bytes.len());
        self.buffer.extend_from_slice(bytes);
    }

    /// Writes raw bytes with no prefix
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn to_bytes(self) -> Box<[u8]> {
        self.buffer.into_boxed_slice()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buffer
    }
}
