use crate::{ByteReader, ByteWriter, SerdeErr};

/// A type that can be written to and read back from the byte codec
pub trait Serde: Sized {
    fn ser(&self, writer: &mut ByteWriter);

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;
}

macro_rules! impl_serde_primitive {
    ($ty:ty, $write:ident, $read:ident) => {
        impl Serde for $ty {
            fn ser(&self, writer: &mut ByteWriter) {
                writer.$write(*self);
            }

            fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                reader.$read()
            }
        }
    };
}

impl_serde_primitive!(u8, write_u8, read_u8);
impl_serde_primitive!(bool, write_bool, read_bool);
impl_serde_primitive!(u16, write_u16, read_u16);
impl_serde_primitive!(i32, write_i32, read_i32);
impl_serde_primitive!(u32, write_u32, read_u32);
impl_serde_primitive!(i64, write_i64, read_i64);
impl_serde_primitive!(u64, write_u64, read_u64);

impl Serde for String {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_string(self);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_string()
    }
}

impl Serde for Vec<u32> {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_u32_array(self);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_u32_array()
    }
}

impl Serde for Vec<i32> {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_i32_array(self);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        reader.read_i32_array()
    }
}
