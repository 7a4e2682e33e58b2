//! FBX node records: named, property-carrying, nested, self-sized.
//!
//! On the wire every record starts with a u4 `end_offset` holding the
//! absolute position of the first byte after the record. That offset is only
//! known once the body and all children have been serialized, so emission
//! writes placeholders, remembers the start position, and seeks back to patch
//! them afterwards. A record that carried children is terminated by a 13-byte
//! null record before the end offset.
//!
//! Two emission styles are available:
//!
//! * [`Node::dump`] writes a fully built node in one call.
//! * [`Node::begin`] returns a [`NodeHandle`]; the caller then writes
//!   properties (or child records) straight to the stream, calls
//!   [`NodeHandle::end_properties`] with the number written, and finishes
//!   with [`NodeHandle::end`]. This is how callers interleave data that was
//!   never materialized as [`Property`] values.

use std::io::{Seek, Write};

use crate::error::{FbxWriteError, Result};
use crate::property::Property;
use crate::stream_writer::StreamWriterLE;

/// Terminates the child list of a record.
pub const NULL_RECORD: [u8; 13] = [0; 13];

/// Joins the name and class parts of an object name, e.g.
/// `"Cube" + NAME_SEPARATOR + "Geometry"`.
pub const NAME_SEPARATOR: &str = "\x00\x01";

/// Compose an object's on-wire "name + class" string.
pub fn name_class(name: &str, class: &str) -> String {
    format!("{}{}{}", name, NAME_SEPARATOR, class)
}

/// A named record carrying ordered properties and ordered child records.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub name: String,
    pub properties: Vec<Property>,
    pub children: Vec<Node>,
}

/// Stream positions remembered between [`Node::begin`] and
/// [`NodeHandle::end`], used to patch the header placeholders.
#[derive(Debug, Clone, Copy)]
pub struct NodeHandle {
    start_pos: u64,
    property_start: u64,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A node holding a single property.
    pub fn scalar(name: impl Into<String>, value: impl Into<Property>) -> Self {
        let mut node = Self::new(name);
        node.properties.push(value.into());
        node
    }

    pub fn with_property(mut self, value: impl Into<Property>) -> Self {
        self.properties.push(value.into());
        self
    }

    pub fn add_property(&mut self, value: impl Into<Property>) {
        self.properties.push(value.into());
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Add a child node holding a single property.
    pub fn add_child_scalar(&mut self, name: impl Into<String>, value: impl Into<Property>) {
        self.children.push(Node::scalar(name, value));
    }

    // ------------------------------------------------------------------
    // Properties70 helpers
    //
    // Each adds a child node named "P" whose first four properties are
    // (name, primary type, secondary type, flags), followed by the values.
    // ------------------------------------------------------------------

    pub fn add_p70(
        &mut self,
        name: &str,
        type1: &str,
        type2: &str,
        flags: &str,
        values: impl IntoIterator<Item = Property>,
    ) {
        let mut p = Node::new("P");
        p.add_property(name);
        p.add_property(type1);
        p.add_property(type2);
        p.add_property(flags);
        p.properties.extend(values);
        self.add_child(p);
    }

    pub fn add_p70_int(&mut self, name: &str, value: i32) {
        self.add_p70(name, "int", "Integer", "", [value.into()]);
    }

    /// Boolean P70 entries carry their value as an int32.
    pub fn add_p70_bool(&mut self, name: &str, value: bool) {
        self.add_p70(name, "bool", "", "", [i32::from(value).into()]);
    }

    pub fn add_p70_double(&mut self, name: &str, value: f64) {
        self.add_p70(name, "double", "Number", "", [value.into()]);
    }

    pub fn add_p70_number_a(&mut self, name: &str, value: f64) {
        self.add_p70(name, "Number", "", "A", [value.into()]);
    }

    pub fn add_p70_color(&mut self, name: &str, r: f64, g: f64, b: f64) {
        self.add_p70(name, "ColorRGB", "Color", "", [r.into(), g.into(), b.into()]);
    }

    pub fn add_p70_color_a(&mut self, name: &str, r: f64, g: f64, b: f64) {
        self.add_p70(name, "Color", "", "A", [r.into(), g.into(), b.into()]);
    }

    pub fn add_p70_vector(&mut self, name: &str, x: f64, y: f64, z: f64) {
        self.add_p70(name, "Vector3D", "Vector", "", [x.into(), y.into(), z.into()]);
    }

    pub fn add_p70_string(&mut self, name: &str, value: &str) {
        self.add_p70(name, "KString", "", "", [value.into()]);
    }

    pub fn add_p70_enum(&mut self, name: &str, value: i32) {
        self.add_p70(name, "enum", "", "", [value.into()]);
    }

    pub fn add_p70_time(&mut self, name: &str, value: i64) {
        self.add_p70(name, "KTime", "Time", "", [value.into()]);
    }

    // ------------------------------------------------------------------
    // Emission
    // ------------------------------------------------------------------

    /// Emit this node and everything below it.
    pub fn dump<W: Write + Seek>(&self, s: &mut StreamWriterLE<W>) -> Result<()> {
        let handle = self.begin(s)?;
        self.dump_properties(s)?;
        handle.end_properties(s, self.properties.len())?;
        self.dump_children(s)?;
        handle.end(s, !self.children.is_empty())
    }

    /// Write the record header with placeholders, then the name.
    ///
    /// After this the caller owns the stream until
    /// [`NodeHandle::end_properties`] / [`NodeHandle::end`] are called.
    pub fn begin<W: Write + Seek>(&self, s: &mut StreamWriterLE<W>) -> Result<NodeHandle> {
        if self.name.len() > 255 {
            return Err(FbxWriteError::NameTooLong {
                name: self.name.clone(),
                len: self.name.len(),
            });
        }

        let start_pos = s.tell()?;

        // placeholders: end offset, property count, property section length
        s.put_u4(0)?;
        s.put_u4(0)?;
        s.put_u4(0)?;

        s.put_u1(self.name.len() as u8)?;
        s.put_string(&self.name)?;

        let property_start = s.tell()?;
        Ok(NodeHandle {
            start_pos,
            property_start,
        })
    }

    pub fn dump_properties<W: Write + Seek>(&self, s: &mut StreamWriterLE<W>) -> Result<()> {
        for p in &self.properties {
            p.dump(s)?;
        }
        Ok(())
    }

    pub fn dump_children<W: Write + Seek>(&self, s: &mut StreamWriterLE<W>) -> Result<()> {
        for child in &self.children {
            child.dump(s)?;
        }
        Ok(())
    }
}

impl NodeHandle {
    /// Patch the property count and property-section length placeholders.
    ///
    /// Must be called after all properties are written and before any child
    /// record or [`NodeHandle::end`]. A count of zero leaves the placeholders
    /// as written (zero).
    pub fn end_properties<W: Write + Seek>(
        &self,
        s: &mut StreamWriterLE<W>,
        num_properties: usize,
    ) -> Result<()> {
        if num_properties == 0 {
            return Ok(());
        }
        let pos = s.tell()?;
        debug_assert!(pos > self.property_start);
        let property_section_size = pos - self.property_start;
        s.seek(self.start_pos + 4)?;
        s.put_u4(num_properties as u32)?;
        s.put_u4(property_section_size as u32)?;
        s.seek(pos)?;
        Ok(())
    }

    /// Terminate the record: null record if children were written, then
    /// patch the end offset.
    pub fn end<W: Write + Seek>(&self, s: &mut StreamWriterLE<W>, has_children: bool) -> Result<()> {
        if has_children {
            s.put_bytes(&NULL_RECORD)?;
        }
        let end_pos = s.tell()?;
        s.seek(self.start_pos)?;
        s.put_u4(end_pos as u32)?;
        s.seek(end_pos)?;
        Ok(())
    }
}
