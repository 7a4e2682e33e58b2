//! Scene translation: from the scene graph to FBX's flat object graph.
//!
//! FBX stores objects (Geometry, Material, Texture, Model) in a flat
//! `Objects` section and expresses the hierarchy separately as a list of
//! typed `Connections` between 64-bit UIDs. This module walks the input
//! scene once and produces both: the object records in emission order and
//! the accumulated connection list, plus the per-type counts the
//! `Definitions` header must declare.

use std::collections::HashMap;
use std::path::Path;

use filmbox_core::{Material, Mesh, Scene, SceneNode, TextureChannel, Vec3};

use crate::error::{FbxWriteError, Result};
use crate::node::{name_class, Node};

/// Marker embedded in the names of synthetic pivot nodes produced by FBX
/// import, e.g. `Cube_$AssimpFbx$_Translation`.
pub const MAGIC_NODE_TAG: &str = "_$AssimpFbx$";

/// An edge in the FBX object graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Connection {
    /// Object-to-object: `child` plugs into `parent`.
    ObjectObject { child: i64, parent: i64 },
    /// Object-to-property: `child` drives the named property of `parent`.
    ObjectProperty {
        child: i64,
        parent: i64,
        property: String,
    },
}

impl Connection {
    /// The `C` record for the Connections section.
    pub fn to_node(&self) -> Node {
        let mut c = Node::new("C");
        match self {
            Connection::ObjectObject { child, parent } => {
                c.add_property("OO");
                c.add_property(*child);
                c.add_property(*parent);
            }
            Connection::ObjectProperty {
                child,
                parent,
                property,
            } => {
                c.add_property("OP");
                c.add_property(*child);
                c.add_property(*parent);
                c.add_property(property.as_str());
            }
        }
        c
    }
}

/// Monotonic UID source, one per export.
///
/// Seeded below 1,000,000 and pre-incremented, so the first UID handed out
/// is exactly 1,000,000. UID 0 is reserved for the implicit scene root.
#[derive(Debug)]
pub struct UidAllocator {
    last: i64,
}

impl UidAllocator {
    pub fn new() -> Self {
        Self { last: 999_999 }
    }

    pub fn next(&mut self) -> i64 {
        self.last += 1;
        self.last
    }
}

impl Default for UidAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// The translated object graph: Objects-section records in emission order,
/// the connection list, and the counts Definitions must declare.
#[derive(Debug, Default)]
pub struct ObjectGraph {
    pub objects: Vec<Node>,
    pub connections: Vec<Connection>,
    pub model_count: usize,
    pub geometry_count: usize,
    pub material_count: usize,
    pub texture_count: usize,
    /// True if any material uses the phong shading model; decides the
    /// surface PropertyTemplate declared in Definitions.
    pub any_phong: bool,
}

/// Translate a scene into its FBX object graph.
///
/// UID allocation order is fixed: geometries, materials, textures (in path
/// discovery order), models in tree order, then the animation stack and
/// base layer. This keeps exports deterministic.
pub fn translate_scene(scene: &Scene, uids: &mut UidAllocator) -> Result<ObjectGraph> {
    let mut graph = ObjectGraph::default();

    // geometries
    let mut mesh_uids = Vec::with_capacity(scene.meshes.len());
    for mesh in &scene.meshes {
        let uid = uids.next();
        mesh_uids.push(uid);
        graph.objects.push(geometry_node(mesh, uid));
        graph.geometry_count += 1;
    }

    // materials
    let mut material_uids = Vec::with_capacity(scene.materials.len());
    for material in &scene.materials {
        let uid = uids.next();
        material_uids.push(uid);
        graph.objects.push(material_node(material, uid));
        graph.material_count += 1;
        graph.any_phong |= material.is_phong();
    }

    // textures, de-duplicated across materials by source path
    translate_textures(scene, uids, &material_uids, &mut graph)?;

    // models
    let walker = ModelWalker {
        scene,
        mesh_uids: &mesh_uids,
        material_uids: &material_uids,
    };
    walker.walk(&scene.root, 0, Vec::new(), true, uids, &mut graph)?;

    // one empty animation stack and base layer so the Definitions counts
    // hold even for static scenes
    let stack_uid = uids.next();
    graph.objects.push(anim_stack_node(&scene.name, stack_uid));
    let layer_uid = uids.next();
    graph.objects.push(anim_layer_node(layer_uid));
    graph.connections.push(Connection::ObjectObject {
        child: layer_uid,
        parent: stack_uid,
    });

    Ok(graph)
}

// ----------------------------------------------------------------------
// Geometry
// ----------------------------------------------------------------------

fn geometry_node(mesh: &Mesh, uid: i64) -> Node {
    let mut geometry = Node::new("Geometry");
    geometry.add_property(uid);
    geometry.add_property(name_class(&mesh.name, "Geometry"));
    geometry.add_property("Mesh");

    // De-duplicated vertex table: hash by exact component bit pattern,
    // preserve first-seen order. vertex_indices maps each source vertex to
    // its slot in the table.
    let mut slot_by_pos: HashMap<[u32; 3], i32> = HashMap::new();
    let mut vertices: Vec<f64> = Vec::new();
    let mut vertex_indices: Vec<i32> = Vec::with_capacity(mesh.positions.len());
    for v in &mesh.positions {
        let key = [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()];
        let slot = match slot_by_pos.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = (vertices.len() / 3) as i32;
                vertices.extend([f64::from(v.x), f64::from(v.y), f64::from(v.z)]);
                slot_by_pos.insert(key, slot);
                slot
            }
        };
        vertex_indices.push(slot);
    }

    // Polygon stream: each face contributes its dedup indices in order,
    // with the last one flipped to `-1 - idx` to mark the face end.
    let mut polygon_indices: Vec<i32> = Vec::with_capacity(mesh.num_polygon_vertices());
    for face in &mesh.faces {
        for (i, &vi) in face.iter().enumerate() {
            let idx = vertex_indices[vi as usize];
            polygon_indices.push(if i + 1 == face.len() { -1 - idx } else { idx });
        }
    }

    geometry.add_child(Node::scalar("Vertices", vertices));
    geometry.add_child(Node::scalar("PolygonVertexIndex", polygon_indices));
    geometry.add_child_scalar("GeometryVersion", 124i32);

    // Normals go out per polygon vertex, not per unique vertex.
    if mesh.has_normals() {
        let mut normals: Vec<f64> = Vec::with_capacity(3 * mesh.num_polygon_vertices());
        for face in &mesh.faces {
            for &vi in face {
                let n = mesh.normals[vi as usize];
                normals.extend([f64::from(n.x), f64::from(n.y), f64::from(n.z)]);
            }
        }
        let mut normal_layer = Node::new("LayerElementNormal");
        normal_layer.add_property(0i32);
        normal_layer.add_child_scalar("Version", 102i32);
        normal_layer.add_child_scalar("Name", "");
        normal_layer.add_child_scalar("MappingInformationType", "ByPolygonVertex");
        normal_layer.add_child_scalar("ReferenceInformationType", "Direct");
        normal_layer.add_child(Node::scalar("Normals", normals));
        geometry.add_child(normal_layer);
    }

    // UV channels: each gets its own dedup table plus an index stream.
    for (ci, channel) in mesh.uv_channels.iter().enumerate() {
        if channel.coords.is_empty() {
            continue;
        }
        if channel.num_components > 2 {
            log::warn!(
                "mesh '{}' UV channel {} has {} components; FBX defines 2, extra components dropped",
                mesh.name,
                ci,
                channel.num_components
            );
        }

        let mut slot_by_uv: HashMap<[u32; 2], i32> = HashMap::new();
        let mut uv: Vec<f64> = Vec::new();
        let mut uv_slot_of_vertex: Vec<i32> = Vec::with_capacity(channel.coords.len());
        for c in &channel.coords {
            let u = c[0];
            let v = if channel.num_components > 1 { c[1] } else { 0.0 };
            let key = [u.to_bits(), v.to_bits()];
            let slot = match slot_by_uv.get(&key) {
                Some(&slot) => slot,
                None => {
                    let slot = (uv.len() / 2) as i32;
                    uv.extend([f64::from(u), f64::from(v)]);
                    slot_by_uv.insert(key, slot);
                    slot
                }
            };
            uv_slot_of_vertex.push(slot);
        }

        let mut uv_indices: Vec<i32> = Vec::with_capacity(mesh.num_polygon_vertices());
        for face in &mesh.faces {
            for &vi in face {
                uv_indices.push(uv_slot_of_vertex[vi as usize]);
            }
        }

        let mut uv_layer = Node::new("LayerElementUV");
        uv_layer.add_property(ci as i32);
        uv_layer.add_child_scalar("Version", 101i32);
        uv_layer.add_child_scalar("Name", format!("UVChannel_{}", ci));
        uv_layer.add_child_scalar("MappingInformationType", "ByPolygonVertex");
        uv_layer.add_child_scalar("ReferenceInformationType", "IndexToDirect");
        uv_layer.add_child(Node::scalar("UV", uv));
        uv_layer.add_child(Node::scalar("UVIndex", uv_indices));
        geometry.add_child(uv_layer);
    }

    // Whole mesh uses one material.
    let mut material_layer = Node::new("LayerElementMaterial");
    material_layer.add_property(0i32);
    material_layer.add_child_scalar("Version", 101i32);
    material_layer.add_child_scalar("Name", "");
    material_layer.add_child_scalar("MappingInformationType", "AllSame");
    material_layer.add_child_scalar("ReferenceInformationType", "IndexToDirect");
    material_layer.add_child(Node::scalar("Materials", vec![0i32]));
    geometry.add_child(material_layer);

    // Layer descriptor tying the element tables together.
    let mut layer = Node::new("Layer");
    layer.add_property(0i32);
    layer.add_child_scalar("Version", 100i32);
    if mesh.has_normals() {
        layer.add_child(layer_element("LayerElementNormal", 0));
    }
    layer.add_child(layer_element("LayerElementMaterial", 0));
    if mesh.uv_channels.iter().any(|c| !c.coords.is_empty()) {
        layer.add_child(layer_element("LayerElementUV", 0));
    }
    geometry.add_child(layer);

    // Extra UV channels get their own layer records.
    for ci in 1..mesh.uv_channels.len() {
        if mesh.uv_channels[ci].coords.is_empty() {
            continue;
        }
        let mut extra = Node::new("Layer");
        extra.add_property(ci as i32);
        extra.add_child_scalar("Version", 100i32);
        extra.add_child(layer_element("LayerElementUV", ci as i32));
        geometry.add_child(extra);
    }

    geometry
}

fn layer_element(type_name: &str, typed_index: i32) -> Node {
    let mut le = Node::new("LayerElement");
    le.add_child_scalar("Type", type_name);
    le.add_child_scalar("TypedIndex", typed_index);
    le
}

// ----------------------------------------------------------------------
// Materials
// ----------------------------------------------------------------------

fn material_node(material: &Material, uid: i64) -> Node {
    let phong = material.is_phong();
    let shading = if phong { "phong" } else { "lambert" };

    let mut m = Node::new("Material");
    m.add_property(uid);
    m.add_property(name_class(&material.name, "Material"));
    m.add_property("");

    m.add_child_scalar("Version", 102i32);
    m.add_child_scalar("ShadingModel", shading);
    m.add_child_scalar("MultiLayer", 0i32);

    let mut p = Node::new("Properties70");

    // modern, animatable channels
    let e = material.emissive;
    p.add_p70_color_a("EmissiveColor", f64::from(e.r), f64::from(e.g), f64::from(e.b));
    let d = material.diffuse;
    p.add_p70_color_a("DiffuseColor", f64::from(d.r), f64::from(d.g), f64::from(d.b));
    if let Some(t) = material.transparent {
        p.add_p70_color_a("TransparentColor", f64::from(t.r), f64::from(t.g), f64::from(t.b));
        p.add_p70_number_a("TransparencyFactor", 1.0);
    }
    if phong {
        let s = material.specular;
        p.add_p70_color_a("SpecularColor", f64::from(s.r), f64::from(s.g), f64::from(s.b));
        p.add_p70_number_a("ShininessExponent", f64::from(material.shininess));
        p.add_p70_number_a("ReflectionFactor", f64::from(material.reflectivity));
    }

    // legacy duplicates, still read by older tooling
    p.add_p70_vector("Emissive", f64::from(e.r), f64::from(e.g), f64::from(e.b));
    let a = material.ambient;
    p.add_p70_vector("Ambient", f64::from(a.r), f64::from(a.g), f64::from(a.b));
    p.add_p70_vector("Diffuse", f64::from(d.r), f64::from(d.g), f64::from(d.b));
    p.add_p70_double("Opacity", f64::from(effective_opacity(material)));
    if phong {
        let s = material.specular;
        p.add_p70_vector("Specular", f64::from(s.r), f64::from(s.g), f64::from(s.b));
        p.add_p70_double("Shininess", f64::from(material.shininess));
        // Maya's reflectivity convention
        let r = f64::from(material.reflectivity);
        p.add_p70_double("Reflectivity", r * r * 0.25479);
    }

    m.add_child(p);
    m
}

/// Opacity defaults to 1.0, overridden by the material's explicit opacity
/// or, failing that, by `1 - mean(transparent rgb)`.
fn effective_opacity(material: &Material) -> f32 {
    if let Some(opacity) = material.opacity {
        return opacity;
    }
    match material.transparent {
        Some(t) => 1.0 - t.mean(),
        None => 1.0,
    }
}

// ----------------------------------------------------------------------
// Textures
// ----------------------------------------------------------------------

const TEXTURE_CHANNELS: [TextureChannel; 6] = [
    TextureChannel::Diffuse,
    TextureChannel::Specular,
    TextureChannel::Ambient,
    TextureChannel::Emissive,
    TextureChannel::Normals,
    TextureChannel::Opacity,
];

fn translate_textures(
    scene: &Scene,
    uids: &mut UidAllocator,
    material_uids: &[i64],
    graph: &mut ObjectGraph,
) -> Result<()> {
    let mut uid_by_path: HashMap<String, i64> = HashMap::new();

    for (mi, material) in scene.materials.iter().enumerate() {
        for channel in TEXTURE_CHANNELS {
            if material.textures_for(channel).count() > 1 {
                return Err(FbxWriteError::UnsupportedMultiLayerTexture {
                    material_index: mi,
                    channel,
                });
            }
        }

        let Some(path) = material.textures_for(TextureChannel::Diffuse).next() else {
            continue;
        };

        let uid = match uid_by_path.get(path) {
            Some(&uid) => uid,
            None => {
                let uid = uids.next();
                graph.objects.push(texture_node(path, uid));
                graph.texture_count += 1;
                uid_by_path.insert(path.to_string(), uid);
                uid
            }
        };

        graph.connections.push(Connection::ObjectProperty {
            child: uid,
            parent: material_uids[mi],
            property: "DiffuseColor".to_string(),
        });
    }

    Ok(())
}

fn texture_node(path: &str, uid: i64) -> Node {
    let name = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path);

    let mut t = Node::new("Texture");
    t.add_property(uid);
    t.add_property(name_class(name, "Texture"));
    t.add_property("");

    t.add_child_scalar("Type", "TextureVideoClip");
    t.add_child_scalar("Version", 202i32);
    t.add_child_scalar("TextureName", name_class(name, "Texture"));

    let mut p = Node::new("Properties70");
    p.add_p70_enum("CurrentTextureBlendMode", 0);
    p.add_p70_string("UVSet", "default");
    p.add_p70_bool("UseMaterial", true);
    t.add_child(p);

    t.add_child_scalar("Media", name_class(name, "Video"));
    t.add_child_scalar("FileName", path);
    t.add_child_scalar("RelativeFilename", "");

    let mut uv_translation = Node::new("ModelUVTranslation");
    uv_translation.add_property(0.0f64);
    uv_translation.add_property(0.0f64);
    t.add_child(uv_translation);

    let mut uv_scaling = Node::new("ModelUVScaling");
    uv_scaling.add_property(1.0f64);
    uv_scaling.add_property(1.0f64);
    t.add_child(uv_scaling);

    t.add_child_scalar("Texture_Alpha_Source", "None");

    let mut cropping = Node::new("Cropping");
    for _ in 0..4 {
        cropping.add_property(0i32);
    }
    t.add_child(cropping);

    t
}

// ----------------------------------------------------------------------
// Models and the pivot chain
// ----------------------------------------------------------------------

/// Which part of the FBX transform chain a pivot marker encodes:
/// translation-like, rotation-like, scaling-like, or an inverse that the
/// surrounding transforms already account for.
fn pivot_part(marker: &str) -> Option<char> {
    match marker {
        "Translation" | "RotationOffset" | "RotationPivot" | "ScalingOffset" | "ScalingPivot"
        | "GeometricTranslation" => Some('t'),
        "PreRotation" | "Rotation" | "PostRotation" | "GeometricRotation" => Some('r'),
        "Scaling" | "GeometricScaling" => Some('s'),
        "RotationPivotInverse" | "ScalingPivotInverse" => Some('i'),
        _ => None,
    }
}

/// FBX property name for a pivot marker. The three primary parts map to the
/// animatable `Lcl` names; everything else keeps its marker name.
fn chain_property_name(marker: &str) -> &str {
    match marker {
        "Translation" => "Lcl Translation",
        "Rotation" => "Lcl Rotation",
        "Scaling" => "Lcl Scaling",
        other => other,
    }
}

struct ModelWalker<'a> {
    scene: &'a Scene,
    mesh_uids: &'a [i64],
    material_uids: &'a [i64],
}

impl ModelWalker<'_> {
    fn walk(
        &self,
        node: &SceneNode,
        parent_uid: i64,
        mut chain: Vec<(String, Vec3)>,
        is_root: bool,
        uids: &mut UidAllocator,
        graph: &mut ObjectGraph,
    ) -> Result<()> {
        if let Some(tag_pos) = node.name.find(MAGIC_NODE_TAG) {
            // A synthetic pivot node: absorb its transform into the chain
            // and continue with its single child in its place.
            if node.children.len() != 1 {
                return Err(FbxWriteError::MalformedPivotChain {
                    name: node.name.clone(),
                    children: node.children.len(),
                });
            }
            if !node.mesh_indices.is_empty() {
                log::warn!(
                    "pivot node '{}' carries {} mesh(es); ignored",
                    node.name,
                    node.mesh_indices.len()
                );
            }

            let marker = node
                .name
                .get(tag_pos + MAGIC_NODE_TAG.len() + 1..)
                .unwrap_or("");
            let Some(kind) = pivot_part(marker) else {
                return Err(FbxWriteError::UnknownPivotMarker(marker.to_string()));
            };

            let trs = node.transform.decompose();
            match kind {
                't' => chain.push((chain_property_name(marker).to_string(), trs.translation)),
                'r' => chain.push((
                    chain_property_name(marker).to_string(),
                    trs.rotation.to_degrees(),
                )),
                's' => chain.push((chain_property_name(marker).to_string(), trs.scaling)),
                // inverse pivots are already accounted for by the pivots
                // they undo
                _ => {}
            }
            return self.walk(&node.children[0], parent_uid, chain, false, uids, graph);
        }

        let node_uid = if is_root {
            0
        } else {
            let uid = uids.next();
            graph.connections.push(Connection::ObjectObject {
                child: uid,
                parent: parent_uid,
            });
            uid
        };

        if node.mesh_indices.is_empty() {
            if !is_root {
                graph
                    .objects
                    .push(self.model_node(&node.name, node_uid, "Null", node, &chain, false));
                graph.model_count += 1;
            }
        } else if node.mesh_indices.len() == 1 && !is_root {
            let mesh_index = node.mesh_indices[0];
            self.connect_mesh(mesh_index, node_uid, graph);
            graph
                .objects
                .push(self.model_node(&node.name, node_uid, "Mesh", node, &chain, true));
            graph.model_count += 1;
        } else {
            // Multiple meshes, or meshes directly on the root: the node
            // itself becomes a Null parent and each mesh gets its own
            // child Model.
            if !is_root {
                graph
                    .objects
                    .push(self.model_node(&node.name, node_uid, "Null", node, &chain, false));
                graph.model_count += 1;
            }
            for &mesh_index in &node.mesh_indices {
                let mesh_uid = uids.next();
                graph.connections.push(Connection::ObjectObject {
                    child: mesh_uid,
                    parent: node_uid,
                });
                self.connect_mesh(mesh_index, mesh_uid, graph);
                let mesh_name = self
                    .scene
                    .meshes
                    .get(mesh_index)
                    .map(|m| m.name.as_str())
                    .unwrap_or(&node.name);
                graph.objects.push(self.model_node(
                    mesh_name,
                    mesh_uid,
                    "Mesh",
                    &SceneNode::new(mesh_name),
                    &[],
                    true,
                ));
                graph.model_count += 1;
            }
        }

        for child in &node.children {
            self.walk(child, node_uid, Vec::new(), false, uids, graph)?;
        }
        Ok(())
    }

    fn connect_mesh(&self, mesh_index: usize, model_uid: i64, graph: &mut ObjectGraph) {
        if let Some(&geometry_uid) = self.mesh_uids.get(mesh_index) {
            graph.connections.push(Connection::ObjectObject {
                child: geometry_uid,
                parent: model_uid,
            });
        }
        let material_index = self
            .scene
            .meshes
            .get(mesh_index)
            .map(|m| m.material_index)
            .unwrap_or(0);
        if let Some(&material_uid) = self.material_uids.get(material_index) {
            graph.connections.push(Connection::ObjectObject {
                child: material_uid,
                parent: model_uid,
            });
        }
    }

    fn model_node(
        &self,
        name: &str,
        uid: i64,
        model_type: &str,
        node: &SceneNode,
        chain: &[(String, Vec3)],
        has_mesh: bool,
    ) -> Node {
        let mut model = Node::new("Model");
        model.add_property(uid);
        model.add_property(name_class(name, "Model"));
        model.add_property(model_type);

        model.add_child_scalar("Version", 232i32);

        let mut p = Node::new("Properties70");
        p.add_p70_bool("RotationActive", true);
        if has_mesh {
            p.add_p70_int("DefaultAttributeIndex", 0);
        }
        // RSrs transform inheritance
        p.add_p70_enum("InheritType", 1);

        if chain.is_empty() {
            let trs = node.transform.decompose();
            let t = trs.translation;
            if t != Vec3::ZERO {
                add_p70_lcl(&mut p, "Lcl Translation", t);
            }
            let r = trs.rotation.to_degrees();
            if r != Vec3::ZERO {
                add_p70_lcl(&mut p, "Lcl Rotation", r);
            }
            let s = trs.scaling;
            if s != Vec3::ONE {
                add_p70_lcl(&mut p, "Lcl Scaling", s);
            }
        } else {
            for (property, v) in chain {
                if property.starts_with("Lcl ") {
                    add_p70_lcl(&mut p, property, *v);
                } else {
                    p.add_p70_vector(property, f64::from(v.x), f64::from(v.y), f64::from(v.z));
                }
            }
        }
        model.add_child(p);

        model.add_child_scalar("Shading", true);
        model.add_child_scalar("Culling", "CullingOff");

        model
    }
}

/// Animatable transform entry: type tags repeat the property name and the
/// flags carry `A`.
fn add_p70_lcl(p: &mut Node, name: &str, v: Vec3) {
    p.add_p70(
        name,
        name,
        "",
        "A",
        [
            f64::from(v.x).into(),
            f64::from(v.y).into(),
            f64::from(v.z).into(),
        ],
    );
}

// ----------------------------------------------------------------------
// Animation stack / base layer
// ----------------------------------------------------------------------

fn anim_stack_node(scene_name: &str, uid: i64) -> Node {
    let name = if scene_name.is_empty() {
        "Take 001"
    } else {
        scene_name
    };
    let mut stack = Node::new("AnimationStack");
    stack.add_property(uid);
    stack.add_property(name_class(name, "AnimStack"));
    stack.add_property("");
    stack.add_child(Node::new("Properties70"));
    stack
}

fn anim_layer_node(uid: i64) -> Node {
    let mut layer = Node::new("AnimationLayer");
    layer.add_property(uid);
    layer.add_property(name_class("BaseLayer", "AnimLayer"));
    layer.add_property("");
    layer.add_child(Node::new("Properties70"));
    layer
}
