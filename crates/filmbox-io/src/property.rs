//! Typed property values for FBX node records.
//!
//! Each property is tagged on the wire with a one-character code:
//!
//! | Code | Payload |
//! |------|---------|
//! | `C`  | 1-byte boolean (0x00 or 0x01) |
//! | `Y`  | 2-byte int16 |
//! | `I`  | 4-byte int32 |
//! | `F`  | 4-byte float |
//! | `D`  | 8-byte double |
//! | `L`  | 8-byte int64 |
//! | `S`  | u4 length + bytes |
//! | `R`  | u4 length + raw bytes |
//! | `i`/`f`/`d`/`l` | u4 count + u4 encoding + u4 byte length + elements |
//!
//! Construction goes through `From` impls for exactly the carrier types
//! listed below; anything else does not compile, so a value can never be
//! smuggled into the wrong variant by an implicit conversion. Arrays are
//! always emitted with encoding 0 (uncompressed).

use std::io;

use crate::stream_writer::StreamWriterLE;
use std::io::{Seek, Write};

/// A single typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Bool(bool),
    I16(i16),
    I32(i32),
    F32(f32),
    F64(f64),
    I64(i64),
    String(String),
    Raw(Vec<u8>),
    I32Array(Vec<i32>),
    F32Array(Vec<f32>),
    F64Array(Vec<f64>),
    I64Array(Vec<i64>),
}

impl Property {
    /// The one-byte wire code for this property.
    pub fn type_code(&self) -> u8 {
        match self {
            Property::Bool(_) => b'C',
            Property::I16(_) => b'Y',
            Property::I32(_) => b'I',
            Property::F32(_) => b'F',
            Property::F64(_) => b'D',
            Property::I64(_) => b'L',
            Property::String(_) => b'S',
            Property::Raw(_) => b'R',
            Property::I32Array(_) => b'i',
            Property::F32Array(_) => b'f',
            Property::F64Array(_) => b'd',
            Property::I64Array(_) => b'l',
        }
    }

    /// Full on-wire size in bytes: the type code plus the payload,
    /// including length prefixes and array headers.
    pub fn size(&self) -> u64 {
        let payload = match self {
            Property::Bool(_) => 1,
            Property::I16(_) => 2,
            Property::I32(_) | Property::F32(_) => 4,
            Property::F64(_) | Property::I64(_) => 8,
            Property::String(s) => 4 + s.len() as u64,
            Property::Raw(r) => 4 + r.len() as u64,
            Property::I32Array(a) => 12 + 4 * a.len() as u64,
            Property::F32Array(a) => 12 + 4 * a.len() as u64,
            Property::F64Array(a) => 12 + 8 * a.len() as u64,
            Property::I64Array(a) => 12 + 8 * a.len() as u64,
        };
        1 + payload
    }

    /// Serialize the type code and payload to the stream.
    pub fn dump<W: Write + Seek>(&self, s: &mut StreamWriterLE<W>) -> io::Result<()> {
        s.put_u1(self.type_code())?;
        match self {
            Property::Bool(v) => s.put_u1(u8::from(*v)),
            Property::I16(v) => s.put_i2(*v),
            Property::I32(v) => s.put_i4(*v),
            Property::F32(v) => s.put_f4(*v),
            Property::F64(v) => s.put_f8(*v),
            Property::I64(v) => s.put_i8(*v),
            Property::String(v) => {
                s.put_u4(v.len() as u32)?;
                s.put_string(v)
            }
            Property::Raw(v) => {
                s.put_u4(v.len() as u32)?;
                s.put_bytes(v)
            }
            Property::I32Array(a) => {
                dump_array_header(s, a.len(), 4)?;
                a.iter().try_for_each(|v| s.put_i4(*v))
            }
            Property::F32Array(a) => {
                dump_array_header(s, a.len(), 4)?;
                a.iter().try_for_each(|v| s.put_f4(*v))
            }
            Property::F64Array(a) => {
                dump_array_header(s, a.len(), 8)?;
                a.iter().try_for_each(|v| s.put_f8(*v))
            }
            Property::I64Array(a) => {
                dump_array_header(s, a.len(), 8)?;
                a.iter().try_for_each(|v| s.put_i8(*v))
            }
        }
    }
}

/// Count, encoding (always 0, uncompressed), and payload byte length.
fn dump_array_header<W: Write + Seek>(
    s: &mut StreamWriterLE<W>,
    count: usize,
    elem_size: usize,
) -> io::Result<()> {
    s.put_u4(count as u32)?;
    s.put_u4(0)?;
    s.put_u4((count * elem_size) as u32)
}

impl From<bool> for Property {
    fn from(v: bool) -> Self {
        Property::Bool(v)
    }
}

impl From<i16> for Property {
    fn from(v: i16) -> Self {
        Property::I16(v)
    }
}

impl From<i32> for Property {
    fn from(v: i32) -> Self {
        Property::I32(v)
    }
}

impl From<f32> for Property {
    fn from(v: f32) -> Self {
        Property::F32(v)
    }
}

impl From<f64> for Property {
    fn from(v: f64) -> Self {
        Property::F64(v)
    }
}

impl From<i64> for Property {
    fn from(v: i64) -> Self {
        Property::I64(v)
    }
}

impl From<&str> for Property {
    fn from(v: &str) -> Self {
        Property::String(v.to_string())
    }
}

impl From<String> for Property {
    fn from(v: String) -> Self {
        Property::String(v)
    }
}

impl From<Vec<u8>> for Property {
    fn from(v: Vec<u8>) -> Self {
        Property::Raw(v)
    }
}

impl From<Vec<i32>> for Property {
    fn from(v: Vec<i32>) -> Self {
        Property::I32Array(v)
    }
}

impl From<Vec<f32>> for Property {
    fn from(v: Vec<f32>) -> Self {
        Property::F32Array(v)
    }
}

impl From<Vec<f64>> for Property {
    fn from(v: Vec<f64>) -> Self {
        Property::F64Array(v)
    }
}

impl From<Vec<i64>> for Property {
    fn from(v: Vec<i64>) -> Self {
        Property::I64Array(v)
    }
}
