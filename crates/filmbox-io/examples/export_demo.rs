//! Example building a small textured-cube scene and writing it to FBX.
//!
//! Run with: cargo run --example export_demo

use filmbox_core::{Material, Mat4, Mesh, Scene, SceneNode, TextureChannel, UvChannel, Vec3};
use filmbox_io::{FbxWriter, SceneWriter};

fn create_cube_mesh() -> Mesh {
    let mut mesh = Mesh::new("Cube");
    let corners = [
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        [1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [1.0, 1.0, 1.0],
        [-1.0, 1.0, 1.0],
    ];
    mesh.positions = corners
        .iter()
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect();
    mesh.faces = vec![
        vec![0, 3, 2, 1],
        vec![4, 5, 6, 7],
        vec![0, 1, 5, 4],
        vec![1, 2, 6, 5],
        vec![2, 3, 7, 6],
        vec![3, 0, 4, 7],
    ];
    mesh.normals = mesh
        .positions
        .iter()
        .map(|p| {
            let len = p.length();
            Vec3::new(p.x / len, p.y / len, p.z / len)
        })
        .collect();
    mesh.uv_channels.push(UvChannel::new(
        2,
        corners
            .iter()
            .map(|c| [(c[0] as f32 + 1.0) / 2.0, (c[1] as f32 + 1.0) / 2.0, 0.0])
            .collect(),
    ));
    mesh
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Building cube scene...");
    let mut scene = Scene::new("CubeScene");
    let mesh_index = scene.add_mesh(create_cube_mesh());

    let mut material = Material::new("BrickMaterial");
    material.shininess = 20.0;
    material.textures
        .push((TextureChannel::Diffuse, "textures/brick.png".to_string()));
    scene.add_material(material);

    let cube = SceneNode::new("Cube")
        .with_transform(Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)))
        .with_mesh(mesh_index);
    scene.root.add_child(cube);

    let out_dir = std::path::Path::new("output");
    std::fs::create_dir_all(out_dir)?;

    let mut writer = FbxWriter::new();
    writer.add_scene(&scene)?;
    println!("  Vertices: {}", writer.vertex_count());
    println!("  Faces: {}", writer.face_count());

    let binary_path = out_dir.join("cube.fbx");
    println!("Writing binary FBX to {}...", binary_path.display());
    writer.write(&binary_path)?;
    println!("  File size: {} bytes", std::fs::metadata(&binary_path)?.len());

    let ascii_path = out_dir.join("cube_ascii.fbx");
    println!("Writing ASCII FBX to {}...", ascii_path.display());
    writer.write_ascii(&ascii_path)?;
    println!("  File size: {} bytes", std::fs::metadata(&ascii_path)?.len());

    println!("FBX export successful");
    Ok(())
}
