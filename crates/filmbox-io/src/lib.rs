//! Filmbox I/O library: writes 3D scenes to FBX 7.4 asset files.
//!
//! The writer produces either the binary container or the ASCII
//! transcription of the same logical tree:
//!
//! | Form   | Entry point |
//! |--------|-------------|
//! | Binary | [`FbxWriter::write`] / [`FbxWriter::write_to`] |
//! | ASCII  | [`FbxWriter::write_ascii`] / [`FbxWriter::write_ascii_to`] |
//!
//! # Example
//!
//! ```ignore
//! use filmbox_core::{Material, Mesh, Scene, SceneNode, Vec3};
//! use filmbox_io::{FbxWriter, SceneWriter};
//!
//! let mut scene = Scene::new("Demo");
//! let mut mesh = Mesh::new("Triangle");
//! mesh.positions = vec![
//!     Vec3::new(0.0, 0.0, 0.0),
//!     Vec3::new(1.0, 0.0, 0.0),
//!     Vec3::new(0.0, 1.0, 0.0),
//! ];
//! mesh.faces = vec![vec![0, 1, 2]];
//! let mesh_index = scene.add_mesh(mesh);
//! scene.add_material(Material::new("Default"));
//! scene.root.add_child(SceneNode::new("Triangle").with_mesh(mesh_index));
//!
//! let mut writer = FbxWriter::new();
//! writer.add_scene(&scene)?;
//! writer.write("triangle.fbx")?;
//! ```
//!
//! The layers, leaves first: [`stream_writer`] puts little-endian
//! primitives, [`property`] serializes tagged values, [`node`] emits
//! self-sized records with back-patched offsets, [`fbx_writer`] assembles
//! the document skeleton, and [`fbx_objects`] translates the scene graph
//! into FBX's flat Objects + Connections form.

pub mod error;
pub mod fbx_ascii;
pub mod fbx_objects;
pub mod fbx_writer;
pub mod node;
pub mod property;
pub mod stream_writer;
pub mod traits;

pub use error::{FbxWriteError, Result};
pub use fbx_objects::{Connection, ObjectGraph, UidAllocator};
pub use fbx_writer::{FbxWriter, FBX_VERSION};
pub use node::{Node, NodeHandle, NAME_SEPARATOR, NULL_RECORD};
pub use property::Property;
pub use stream_writer::StreamWriterLE;
pub use traits::SceneWriter;
