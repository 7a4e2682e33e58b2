//! Scenario-level checks: written files carry the expected geometry,
//! transform, and texture records.

mod common;

use std::f32::consts::FRAC_PI_2;
use std::io::Cursor;

use filmbox_core::{Mat4, Material, Mesh, Scene, SceneNode, TextureChannel, Vec3};
use filmbox_io::FbxWriter;

use common::{parse_fbx, ParsedFile, Value};

fn write_and_parse(scene: &Scene) -> (Vec<u8>, ParsedFile) {
    let mut writer = FbxWriter::new();
    writer.add_scene(scene).unwrap();
    let mut cursor = Cursor::new(Vec::new());
    writer.write_to(&mut cursor).unwrap();
    let data = cursor.into_inner();
    let parsed = parse_fbx(&data);
    (data, parsed)
}

fn triangle_mesh() -> Mesh {
    let mut mesh = Mesh::new("Triangle");
    mesh.positions = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];
    mesh.faces = vec![vec![0, 1, 2]];
    mesh
}

#[test]
fn single_triangle_geometry() {
    let mut scene = Scene::new("Tri");
    scene.add_mesh(triangle_mesh());
    scene.add_material(Material::new("Default"));
    scene.root.add_child(SceneNode::new("Triangle").with_mesh(0));

    let (_, parsed) = write_and_parse(&scene);
    let geometry = parsed
        .top("Objects")
        .children_named("Geometry")
        .next()
        .unwrap();

    match &geometry.child("Vertices").unwrap().properties[0] {
        Value::F64Arr(v) => {
            assert_eq!(v.len(), 9);
            assert_eq!(v[..3], [0.0, 0.0, 0.0]);
        }
        other => panic!("unexpected Vertices {:?}", other),
    }
    match &geometry.child("PolygonVertexIndex").unwrap().properties[0] {
        Value::I32Arr(v) => assert_eq!(v, &vec![0, 1, -3]),
        other => panic!("unexpected PolygonVertexIndex {:?}", other),
    }
    match geometry.child("GeometryVersion").unwrap().properties[0] {
        Value::I32(v) => assert_eq!(v, 124),
        ref other => panic!("unexpected GeometryVersion {:?}", other),
    }
}

#[test]
fn degenerate_vertices_deduplicated() {
    let mut mesh = Mesh::new("Dedup");
    mesh.positions = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
    ];
    mesh.faces = vec![vec![0, 1, 2], vec![1, 2, 3]];
    let mut scene = Scene::new("Dedup");
    scene.add_mesh(mesh);
    scene.add_material(Material::new("Default"));
    scene.root.add_child(SceneNode::new("Dedup").with_mesh(0));

    let (_, parsed) = write_and_parse(&scene);
    let geometry = parsed
        .top("Objects")
        .children_named("Geometry")
        .next()
        .unwrap();
    match &geometry.child("Vertices").unwrap().properties[0] {
        Value::F64Arr(v) => assert_eq!(v.len(), 6, "dedup table must keep 2 positions"),
        other => panic!("unexpected Vertices {:?}", other),
    }
}

#[test]
fn empty_mesh_emits_empty_arrays() {
    let mut scene = Scene::new("Empty");
    scene.add_mesh(Mesh::new("Empty"));
    scene.add_material(Material::new("Default"));
    scene.root.add_child(SceneNode::new("Empty").with_mesh(0));

    let (_, parsed) = write_and_parse(&scene);
    let geometry = parsed
        .top("Objects")
        .children_named("Geometry")
        .next()
        .unwrap();
    match &geometry.child("Vertices").unwrap().properties[0] {
        Value::F64Arr(v) => assert!(v.is_empty()),
        other => panic!("unexpected Vertices {:?}", other),
    }
    assert!(geometry.child("LayerElementNormal").is_none());
    assert!(geometry.child("LayerElementUV").is_none());
}

#[test]
fn pivot_chain_collapses_into_one_model() {
    let mut scene = Scene::new("Pivot");
    scene.add_mesh(triangle_mesh());
    scene.add_material(Material::new("Default"));

    let cube = SceneNode::new("Cube").with_mesh(0);
    let mut rotation = SceneNode::new("Cube_$AssimpFbx$_Rotation")
        .with_transform(Mat4::from_euler_xyz(Vec3::new(0.0, FRAC_PI_2, 0.0)));
    rotation.add_child(cube);
    let mut translation = SceneNode::new("Cube_$AssimpFbx$_Translation")
        .with_transform(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
    translation.add_child(rotation);
    scene.root.add_child(translation);

    let (_, parsed) = write_and_parse(&scene);
    let models: Vec<_> = parsed.top("Objects").children_named("Model").collect();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].properties[1].as_str(), "Cube\u{0}\u{1}Model");

    let p70 = models[0].child("Properties70").unwrap();
    let transform = |name: &str| -> Vec<f64> {
        p70.children
            .iter()
            .find(|p| p.properties.first().map(|v| v.as_str()) == Some(name))
            .unwrap_or_else(|| panic!("no P70 entry {}", name))
            .properties[4..]
            .iter()
            .map(|v| match v {
                Value::F64(f) => *f,
                other => panic!("unexpected {:?}", other),
            })
            .collect()
    };

    assert_eq!(transform("Lcl Translation"), vec![1.0, 2.0, 3.0]);
    let rotation = transform("Lcl Rotation");
    assert!((rotation[0]).abs() < 1e-3);
    assert!((rotation[1] - 90.0).abs() < 1e-3);
    assert!((rotation[2]).abs() < 1e-3);
}

#[test]
fn texture_deduplicated_across_materials() {
    let mut scene = Scene::new("Tex");
    let mut mesh_a = triangle_mesh();
    mesh_a.name = "A".to_string();
    mesh_a.material_index = 0;
    let mut mesh_b = triangle_mesh();
    mesh_b.name = "B".to_string();
    mesh_b.material_index = 1;
    scene.add_mesh(mesh_a);
    scene.add_mesh(mesh_b);
    for name in ["MatA", "MatB"] {
        let mut material = Material::new(name);
        material
            .textures
            .push((TextureChannel::Diffuse, "brick.png".to_string()));
        scene.add_material(material);
    }
    scene.root.add_child(SceneNode::new("A").with_mesh(0));
    scene.root.add_child(SceneNode::new("B").with_mesh(1));

    let (_, parsed) = write_and_parse(&scene);

    let textures: Vec<_> = parsed.top("Objects").children_named("Texture").collect();
    assert_eq!(textures.len(), 1, "one Texture record for a shared path");
    let texture_uid = textures[0].properties[0].as_i64();
    assert_eq!(
        textures[0].child("FileName").unwrap().properties[0].as_str(),
        "brick.png"
    );

    let op: Vec<_> = parsed
        .top("Connections")
        .children
        .iter()
        .filter(|c| c.properties[0].as_str() == "OP")
        .collect();
    assert_eq!(op.len(), 2);
    for c in &op {
        assert_eq!(c.properties[1].as_i64(), texture_uid);
        assert_eq!(c.properties[3].as_str(), "DiffuseColor");
    }
    assert_ne!(
        op[0].properties[2].as_i64(),
        op[1].properties[2].as_i64(),
        "connections must target distinct materials"
    );
}

#[test]
fn normals_and_uvs_emitted_with_layer() {
    let mut mesh = triangle_mesh();
    mesh.normals = vec![Vec3::new(0.0, 0.0, 1.0); 3];
    mesh.uv_channels.push(filmbox_core::UvChannel::new(
        2,
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    ));
    let mut scene = Scene::new("Layers");
    scene.add_mesh(mesh);
    scene.add_material(Material::new("Default"));
    scene.root.add_child(SceneNode::new("Tri").with_mesh(0));

    let (_, parsed) = write_and_parse(&scene);
    let geometry = parsed
        .top("Objects")
        .children_named("Geometry")
        .next()
        .unwrap();

    let normal_layer = geometry.child("LayerElementNormal").unwrap();
    assert_eq!(
        normal_layer
            .child("MappingInformationType")
            .unwrap()
            .properties[0]
            .as_str(),
        "ByPolygonVertex"
    );
    match &normal_layer.child("Normals").unwrap().properties[0] {
        Value::F64Arr(v) => assert_eq!(v.len(), 9),
        other => panic!("unexpected Normals {:?}", other),
    }

    let uv_layer = geometry.child("LayerElementUV").unwrap();
    assert_eq!(
        uv_layer
            .child("ReferenceInformationType")
            .unwrap()
            .properties[0]
            .as_str(),
        "IndexToDirect"
    );

    let layer = geometry.child("Layer").unwrap();
    let element_types: Vec<String> = layer
        .children_named("LayerElement")
        .map(|le| le.child("Type").unwrap().properties[0].as_str().to_string())
        .collect();
    assert_eq!(
        element_types,
        vec![
            "LayerElementNormal",
            "LayerElementMaterial",
            "LayerElementUV"
        ]
    );
}

#[test]
fn two_vertex_face_valid_stream() {
    let mut mesh = Mesh::new("Edge");
    mesh.positions = vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)];
    mesh.faces = vec![vec![0, 1]];
    let mut scene = Scene::new("Edge");
    scene.add_mesh(mesh);
    scene.add_material(Material::new("Default"));
    scene.root.add_child(SceneNode::new("Edge").with_mesh(0));

    let (_, parsed) = write_and_parse(&scene);
    let geometry = parsed
        .top("Objects")
        .children_named("Geometry")
        .next()
        .unwrap();
    match &geometry.child("PolygonVertexIndex").unwrap().properties[0] {
        Value::I32Arr(v) => assert_eq!(v, &vec![0, -2]),
        other => panic!("unexpected PolygonVertexIndex {:?}", other),
    }
}

#[test]
fn ascii_transcription_contains_logical_tree() {
    let mut scene = Scene::new("Ascii");
    scene.add_mesh(triangle_mesh());
    scene.add_material(Material::new("Default"));
    scene.root.add_child(SceneNode::new("Triangle").with_mesh(0));

    let mut writer = FbxWriter::new();
    writer.add_scene(&scene).unwrap();
    let mut out = Vec::new();
    writer.write_ascii_to(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("; FBX 7.4.0 project file\n"));
    assert!(text.contains("FBXHeaderExtension:  {"));
    assert!(text.contains("Vertices: *9 {"));
    assert!(text.contains("\"Model::Triangle\""));
    assert!(text.contains("Culling: \"CullingOff\""));
    // binary-only records stay out of the text form
    assert!(!text.contains("FileId"));
}

#[test]
fn ascii_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene_ascii.fbx");
    let mut scene = Scene::new("Ascii");
    scene.add_mesh(triangle_mesh());
    scene.add_material(Material::new("Default"));
    scene.root.add_child(SceneNode::new("Triangle").with_mesh(0));

    let mut writer = FbxWriter::new();
    writer.add_scene(&scene).unwrap();
    writer.write_ascii(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("; FBX 7.4.0 project file"));
}
