//! Minimal record-level parser for written FBX bytes.
//!
//! Test tooling only: walks the binary container and re-checks the
//! structural invariants the writer must uphold (end offsets, null
//! records, array headers). Panics on any malformed structure so test
//! failures point at the writer.

/// A parsed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    Raw(Vec<u8>),
    I32Arr(Vec<i32>),
    I64Arr(Vec<i64>),
    F32Arr(Vec<f32>),
    F64Arr(Vec<f64>),
}

impl Value {
    pub fn as_i64(&self) -> i64 {
        match self {
            Value::I64(v) => *v,
            other => panic!("expected I64, got {:?}", other),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Value::Str(s) => s,
            other => panic!("expected Str, got {:?}", other),
        }
    }
}

/// A parsed node record.
#[derive(Debug, Clone)]
pub struct Record {
    pub name: String,
    pub properties: Vec<Value>,
    pub children: Vec<Record>,
}

impl Record {
    pub fn child(&self, name: &str) -> Option<&Record> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Record> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// The parsed file: header version, top-level records, and the byte
/// position just after the terminating null record (where the footer
/// starts).
pub struct ParsedFile {
    pub version: u32,
    pub records: Vec<Record>,
    pub footer_start: usize,
}

impl ParsedFile {
    pub fn top(&self, name: &str) -> &Record {
        self.records
            .iter()
            .find(|r| r.name == name)
            .unwrap_or_else(|| panic!("no top-level record {}", name))
    }
}

pub fn parse_fbx(data: &[u8]) -> ParsedFile {
    assert!(data.len() > 27, "file too short");
    assert_eq!(&data[0..20], b"Kaydara FBX Binary  ", "bad magic");
    assert_eq!(&data[20..23], &[0x00, 0x1A, 0x00], "bad magic tail");
    let version = u32::from_le_bytes(data[23..27].try_into().unwrap());

    let mut parser = Parser { data, pos: 27 };
    let mut records = Vec::new();
    while let Some(record) = parser.parse_record() {
        records.push(record);
    }

    ParsedFile {
        version,
        records,
        footer_start: parser.pos,
    }
}

struct Parser<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn u8(&mut self) -> u8 {
        let v = self.data[self.pos];
        self.pos += 1;
        v
    }

    fn u32(&mut self) -> u32 {
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        v
    }

    fn bytes(&mut self, n: usize) -> &[u8] {
        let v = &self.data[self.pos..self.pos + n];
        self.pos += n;
        v
    }

    /// Parse one record; `None` for a 13-byte null record.
    fn parse_record(&mut self) -> Option<Record> {
        let start = self.pos;
        let end_offset = self.u32();
        let num_properties = self.u32();
        let property_list_len = self.u32();
        let name_len = self.u8();

        if end_offset == 0 {
            assert_eq!(num_properties, 0, "null record must be all zero");
            assert_eq!(property_list_len, 0, "null record must be all zero");
            assert_eq!(name_len, 0, "null record must be all zero");
            return None;
        }

        let name = String::from_utf8(self.bytes(name_len as usize).to_vec()).unwrap();

        let properties_start = self.pos;
        let properties: Vec<Value> = (0..num_properties).map(|_| self.parse_value()).collect();
        assert_eq!(
            self.pos - properties_start,
            property_list_len as usize,
            "property section length mismatch in {}",
            name
        );

        let mut children = Vec::new();
        if self.pos < end_offset as usize {
            // the null record preceding end_offset terminates the children
            assert!(
                end_offset as usize - self.pos >= 13,
                "trailing bytes too short for a null record in {}",
                name
            );
            while let Some(child) = self.parse_record() {
                children.push(child);
            }
        }

        assert_eq!(
            self.pos, end_offset as usize,
            "end offset of {} (started at {}) does not match record end",
            name, start
        );

        Some(Record {
            name,
            properties,
            children,
        })
    }

    fn parse_value(&mut self) -> Value {
        let code = self.u8();
        match code {
            b'C' => Value::Bool(self.u8() != 0),
            b'Y' => {
                let v = i16::from_le_bytes(self.bytes(2).try_into().unwrap());
                Value::I16(v)
            }
            b'I' => {
                let v = i32::from_le_bytes(self.bytes(4).try_into().unwrap());
                Value::I32(v)
            }
            b'L' => {
                let v = i64::from_le_bytes(self.bytes(8).try_into().unwrap());
                Value::I64(v)
            }
            b'F' => {
                let v = f32::from_le_bytes(self.bytes(4).try_into().unwrap());
                Value::F32(v)
            }
            b'D' => {
                let v = f64::from_le_bytes(self.bytes(8).try_into().unwrap());
                Value::F64(v)
            }
            b'S' => {
                let len = self.u32() as usize;
                Value::Str(String::from_utf8_lossy(self.bytes(len)).to_string())
            }
            b'R' => {
                let len = self.u32() as usize;
                Value::Raw(self.bytes(len).to_vec())
            }
            b'i' => Value::I32Arr(
                self.array_payload(4)
                    .chunks_exact(4)
                    .map(|c| i32::from_le_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            b'l' => Value::I64Arr(
                self.array_payload(8)
                    .chunks_exact(8)
                    .map(|c| i64::from_le_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            b'f' => Value::F32Arr(
                self.array_payload(4)
                    .chunks_exact(4)
                    .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            b'd' => Value::F64Arr(
                self.array_payload(8)
                    .chunks_exact(8)
                    .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            other => panic!("unknown property type code {:?}", other as char),
        }
    }

    /// Array header invariant: byte length == count * element size,
    /// encoding always 0.
    fn array_payload(&mut self, elem_size: usize) -> Vec<u8> {
        let count = self.u32() as usize;
        let encoding = self.u32();
        let byte_len = self.u32() as usize;
        assert_eq!(encoding, 0, "arrays must be uncompressed");
        assert_eq!(byte_len, count * elem_size, "array byte length mismatch");
        self.bytes(byte_len).to_vec()
    }
}
