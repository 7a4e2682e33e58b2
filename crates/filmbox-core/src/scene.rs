//! Scene graph: a node hierarchy referencing meshes and materials.

use crate::material::Material;
use crate::math::Mat4;
use crate::mesh::Mesh;

/// A node in the scene hierarchy.
#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    pub name: String,
    /// Transform relative to the parent node.
    pub transform: Mat4,
    /// Indices into [`Scene::meshes`].
    pub mesh_indices: Vec<usize>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::IDENTITY,
            mesh_indices: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh_index: usize) -> Self {
        self.mesh_indices.push(mesh_index);
        self
    }

    pub fn add_child(&mut self, child: SceneNode) -> &mut Self {
        self.children.push(child);
        self
    }
}

/// A complete scene: flat mesh and material arrays plus a node tree whose
/// nodes reference meshes by index. The root node itself never becomes an
/// FBX Model; its children hang off the implicit document root.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub root: SceneNode,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meshes: Vec::new(),
            materials: Vec::new(),
            root: SceneNode::new("RootNode"),
        }
    }

    /// Add a mesh, returning its index for node references.
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    /// Add a material, returning its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_indices() {
        let mut scene = Scene::new("Test");
        let m0 = scene.add_mesh(Mesh::new("A"));
        let m1 = scene.add_mesh(Mesh::new("B"));
        assert_eq!((m0, m1), (0, 1));
        assert_eq!(scene.add_material(Material::new("Mat")), 0);
    }

    #[test]
    fn test_node_builder() {
        let node = SceneNode::new("Cube").with_mesh(0);
        assert_eq!(node.mesh_indices, vec![0]);
        assert!(node.transform.is_identity());
    }
}
