//! Mesh data: vertex positions, faces, normals, and UV channels.

use crate::math::Vec3;

/// A polygon face as an ordered list of vertex indices.
///
/// Faces may have any arity >= 2; triangles and quads are the common cases
/// but the exporter does not triangulate.
pub type Face = Vec<u32>;

/// One UV coordinate channel.
///
/// Coordinates are stored per vertex position (same indexing as
/// [`Mesh::positions`]) and carry up to three components; FBX only defines
/// two, so a third component is dropped at export time.
#[derive(Debug, Clone)]
pub struct UvChannel {
    pub num_components: usize,
    pub coords: Vec<[f32; 3]>,
}

impl UvChannel {
    pub fn new(num_components: usize, coords: Vec<[f32; 3]>) -> Self {
        Self {
            num_components,
            coords,
        }
    }
}

/// A polygon mesh.
///
/// `normals`, when present, are per vertex position and must have the same
/// length as `positions`. An empty `normals` vector means the mesh carries
/// no normals.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    /// Index into [`crate::Scene::materials`].
    pub material_index: usize,
    pub positions: Vec<Vec3>,
    pub faces: Vec<Face>,
    pub normals: Vec<Vec3>,
    pub uv_channels: Vec<UvChannel>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    /// Total number of polygon-vertex slots across all faces.
    pub fn num_polygon_vertices(&self) -> usize {
        self.faces.iter().map(|f| f.len()).sum()
    }
}
