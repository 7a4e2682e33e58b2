//! Common trait for scene exporters.
//!
//! Import the trait to access its methods:
//!
//! ```ignore
//! use filmbox_io::{FbxWriter, SceneWriter};
//!
//! let mut writer = FbxWriter::new();
//! writer.add_scene(&scene)?;
//! writer.write("output.fbx")?;
//! ```
//!
//! This enables generic functions:
//!
//! ```ignore
//! fn save<W: SceneWriter>(mut w: W, scene: &Scene) -> Result<()> {
//!     w.add_scene(scene)?;
//!     w.write("output.ext")
//! }
//! ```

use std::path::Path;

use filmbox_core::Scene;

use crate::error::Result;

/// Common interface for writers that serialize a full scene graph.
pub trait SceneWriter: Sized {
    /// Create a new writer instance.
    fn new() -> Self;

    /// Set the scene to be written.
    fn add_scene(&mut self, scene: &Scene) -> Result<()>;

    /// Write the scene to a file in the format's primary (binary) form.
    fn write<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Write the scene in the format's text form, if it has one.
    fn write_ascii<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Total number of vertices across the scene's meshes.
    fn vertex_count(&self) -> usize;

    /// Total number of faces across the scene's meshes.
    fn face_count(&self) -> usize {
        0
    }
}
