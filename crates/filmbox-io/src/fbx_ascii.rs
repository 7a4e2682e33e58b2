//! ASCII transcription of the FBX record tree.
//!
//! The ASCII form is the same logical tree as the binary container, rendered
//! as indented `Name: value, value { children }` text. Object name+class
//! composites are stored as `Name\x00\x01Class` in binary properties and
//! render as `"Class::Name"` in ASCII. Array properties render as
//! `*N { a: ... }` blocks. Bit-exactness does not apply to this path.

use std::io::Write;

use crate::error::Result;
use crate::node::{Node, NAME_SEPARATOR};
use crate::property::Property;

/// Write the standard header comment block followed by all top-level nodes.
pub fn write_ascii_document<W: Write>(
    w: &mut W,
    nodes: &[Node],
    version: &str,
    creator: &str,
) -> Result<()> {
    writeln!(w, "; FBX {} project file", version)?;
    writeln!(w, "; Created by {}", creator)?;
    writeln!(w, "; ----------------------------------------------------")?;
    writeln!(w)?;

    for node in nodes {
        write_node(w, node, 0)?;
    }
    Ok(())
}

fn write_node<W: Write>(w: &mut W, node: &Node, depth: usize) -> Result<()> {
    let indent = "\t".repeat(depth);

    // An array node renders its single property as a counted block.
    if node.properties.len() == 1 {
        if let Some(block) = array_block(&node.properties[0], depth) {
            writeln!(w, "{}{}: {}", indent, node.name, block)?;
            return Ok(());
        }
    }

    let values: Vec<String> = node.properties.iter().map(format_property).collect();
    let has_block = !node.children.is_empty() || node.properties.is_empty();

    if has_block {
        if values.is_empty() {
            writeln!(w, "{}{}:  {{", indent, node.name)?;
        } else {
            writeln!(w, "{}{}: {} {{", indent, node.name, values.join(", "))?;
        }
        for child in &node.children {
            write_node(w, child, depth + 1)?;
        }
        writeln!(w, "{}}}", indent)?;
    } else {
        writeln!(w, "{}{}: {}", indent, node.name, values.join(", "))?;
    }
    Ok(())
}

/// Render an array property as `*N { a: v,v,v }`, or `None` for scalars.
fn array_block(property: &Property, depth: usize) -> Option<String> {
    let (count, joined) = match property {
        Property::I32Array(a) => (a.len(), join(a.iter())),
        Property::I64Array(a) => (a.len(), join(a.iter())),
        Property::F32Array(a) => (a.len(), join(a.iter())),
        Property::F64Array(a) => (a.len(), join(a.iter())),
        _ => return None,
    };
    let indent = "\t".repeat(depth + 1);
    let closing = "\t".repeat(depth);
    Some(format!(
        "*{} {{\n{}a: {}\n{}}}",
        count, indent, joined, closing
    ))
}

fn join<T: ToString>(values: impl Iterator<Item = T>) -> String {
    values
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn format_property(property: &Property) -> String {
    match property {
        Property::Bool(v) => (if *v { "T" } else { "F" }).to_string(),
        Property::I16(v) => v.to_string(),
        Property::I32(v) => v.to_string(),
        Property::I64(v) => v.to_string(),
        Property::F32(v) => v.to_string(),
        Property::F64(v) => v.to_string(),
        Property::String(s) => format!("\"{}\"", ascii_string(s)),
        Property::Raw(bytes) => join(bytes.iter()),
        // arrays outside the single-property case degrade to a flat list
        Property::I32Array(a) => join(a.iter()),
        Property::I64Array(a) => join(a.iter()),
        Property::F32Array(a) => join(a.iter()),
        Property::F64Array(a) => join(a.iter()),
    }
}

/// `Name\x00\x01Class` renders as `Class::Name` in ASCII files.
fn ascii_string(s: &str) -> String {
    match s.split_once(NAME_SEPARATOR) {
        Some((name, class)) => format!("{}::{}", class, name),
        None => s.to_string(),
    }
}
