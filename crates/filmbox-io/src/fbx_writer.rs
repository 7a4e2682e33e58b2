//! FBX 7.4 document assembly and the public writer API.
//!
//! Supports writing:
//! - Binary FBX 7.4 (7400, 32-bit record headers)
//! - ASCII FBX (same logical tree, text transcription)
//! - Scene hierarchies with meshes, materials, and diffuse textures
//!
//! # Example
//!
//! ```ignore
//! use filmbox_io::{FbxWriter, SceneWriter};
//! use filmbox_core::Scene;
//!
//! let scene: Scene = /* ... */;
//! let mut writer = FbxWriter::new();
//! writer.add_scene(&scene)?;
//! writer.write("output.fbx")?;
//! writer.write_ascii("output_ascii.fbx")?;
//! ```
//!
//! The binary container is a sequence of node records between a fixed
//! 27-byte header and a footer whose padding rules are inherited from the
//! reference files every consumer was tested against. Some header fields
//! (FileId, CreationTime) are hashed values with an unpublished algorithm;
//! known-good constants are written instead, which all tested consumers
//! accept.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use chrono::{Datelike, Local, Timelike};

use filmbox_core::Scene;

use crate::error::{FbxWriteError, Result};
use crate::fbx_ascii;
use crate::fbx_objects::{translate_scene, ObjectGraph, UidAllocator};
use crate::node::{Node, NULL_RECORD};
use crate::stream_writer::StreamWriterLE;
use crate::traits::SceneWriter;

/// First 20 bytes of the binary magic; `0x00 0x1A 0x00` follows.
const FBX_MAGIC: &[u8; 20] = b"Kaydara FBX Binary  ";

/// FBX 7.4 (2014/2015), 32-bit record headers.
pub const FBX_VERSION: u32 = 7400;

const FBX_VERSION_STR: &str = "7.4.0";

/// Written for the Creator fields and the ASCII header comment.
const CREATOR: &str = concat!("filmbox ", env!("CARGO_PKG_VERSION"));

/// Known-good placeholder for the CreationTime field. The real value is
/// hashed into FileId by an unpublished algorithm, so both stay fixed.
const GENERIC_CTIME: &str = "1970-01-01 10:00:00:000";

/// Known-good FileId payload matching [`GENERIC_CTIME`].
const GENERIC_FILEID: [u8; 16] = [
    0x28, 0xB3, 0x2A, 0xEB, 0xB6, 0x24, 0xCC, 0xC2, 0xBF, 0xC8, 0xB0, 0x2A, 0xA9, 0x2B, 0xFC, 0xF1,
];

/// Footer signature written directly after the top-level null record.
const GENERIC_FOOT_MAGIC: [u8; 16] = [
    0xFA, 0xBC, 0xAB, 0x09, 0xD0, 0xC8, 0xD4, 0x66, 0xB1, 0x76, 0xFB, 0x83, 0x1C, 0xF7, 0x26, 0x7E,
];

/// Fixed 16 bytes closing every binary FBX file.
const FOOTER_TAIL_MAGIC: [u8; 16] = [
    0xF8, 0x5A, 0x8C, 0x6A, 0xDE, 0xF5, 0xD9, 0x7E, 0xEC, 0xE9, 0x0C, 0xE3, 0x75, 0x8F, 0x29, 0x0B,
];

/// FBX binary/ASCII scene writer.
///
/// Builder-style API: add a scene with [`FbxWriter::add_scene`], then write
/// with [`FbxWriter::write`] (binary) or [`FbxWriter::write_ascii`].
#[derive(Debug, Clone, Default)]
pub struct FbxWriter {
    scene: Option<Scene>,
}

impl FbxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scene to export. FBX assets written here are
    /// single-document; a second call replaces the scene.
    pub fn add_scene(&mut self, scene: &Scene) -> Result<()> {
        self.scene = Some(scene.clone());
        Ok(())
    }

    /// Write the binary FBX file to the given path.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(&path).map_err(|e| FbxWriteError::OpenFailed {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
    }

    /// Write the binary FBX data to a seekable sink.
    pub fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        let mut s = StreamWriterLE::new(writer);

        write_binary_header(&mut s)?;
        for node in self.build_document(true)? {
            node.dump(&mut s)?;
        }
        write_binary_footer(&mut s)?;

        s.flush()?;
        Ok(())
    }

    /// Write the ASCII FBX file to the given path.
    pub fn write_ascii<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(&path).map_err(|e| FbxWriteError::OpenFailed {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        self.write_ascii_to(&mut writer)
    }

    /// Write the ASCII FBX text to any sink.
    pub fn write_ascii_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let nodes = self.build_document(false)?;
        fbx_ascii::write_ascii_document(writer, &nodes, FBX_VERSION_STR, CREATOR)
    }

    /// Assemble the top-level record tree. `binary` controls the three
    /// binary-only records (FileId, CreationTime, Creator) that ASCII
    /// output omits.
    fn build_document(&self, binary: bool) -> Result<Vec<Node>> {
        let default_scene;
        let scene = match &self.scene {
            Some(scene) => scene,
            None => {
                default_scene = Scene::default();
                &default_scene
            }
        };

        let mut uids = UidAllocator::new();
        let document_uid = uids.next();
        let graph = translate_scene(scene, &mut uids)?;

        let mut nodes = Vec::new();
        nodes.push(header_extension_node());
        if binary {
            nodes.push(Node::scalar("FileId", GENERIC_FILEID.to_vec()));
            nodes.push(Node::scalar("CreationTime", GENERIC_CTIME));
            nodes.push(Node::scalar("Creator", CREATOR));
        }
        nodes.push(global_settings_node());
        nodes.push(documents_node(document_uid));
        nodes.push(Node::new("References"));
        nodes.push(definitions_node(&graph));

        let mut objects = Node::new("Objects");
        objects.children = graph.objects;
        nodes.push(objects);

        let mut connections = Node::new("Connections");
        for connection in &graph.connections {
            connections.add_child(connection.to_node());
        }
        nodes.push(connections);

        Ok(nodes)
    }
}

impl SceneWriter for FbxWriter {
    fn new() -> Self {
        Self::default()
    }

    fn add_scene(&mut self, scene: &Scene) -> Result<()> {
        FbxWriter::add_scene(self, scene)
    }

    fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        FbxWriter::write(self, path)
    }

    fn write_ascii<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        FbxWriter::write_ascii(self, path)
    }

    fn vertex_count(&self) -> usize {
        self.scene
            .as_ref()
            .map(|s| s.meshes.iter().map(|m| m.num_vertices()).sum())
            .unwrap_or(0)
    }

    fn face_count(&self) -> usize {
        self.scene
            .as_ref()
            .map(|s| s.meshes.iter().map(|m| m.num_faces()).sum())
            .unwrap_or(0)
    }
}

// ============================================================================
// Binary header and footer
// ============================================================================

fn write_binary_header<W: Write + Seek>(s: &mut StreamWriterLE<W>) -> Result<()> {
    // 23 fixed bytes, then the version "multiplied" by 1000 (7.4 -> 7400)
    s.put_bytes(FBX_MAGIC)?;
    s.put_bytes(&[0x00, 0x1A, 0x00])?;
    s.put_u4(FBX_VERSION)?;
    Ok(())
}

fn write_binary_footer<W: Write + Seek>(s: &mut StreamWriterLE<W>) -> Result<()> {
    // terminate the top-level record list
    s.put_bytes(&NULL_RECORD)?;

    s.put_bytes(&GENERIC_FOOT_MAGIC)?;
    s.put_bytes(&[0u8; 4])?;

    // pad to the next 16-byte boundary; a full 16 bytes if already aligned
    let pos = s.tell()?;
    let pad = 16 - (pos % 16) as usize;
    s.put_bytes(&vec![0u8; pad])?;

    s.put_u4(FBX_VERSION)?;
    s.put_bytes(&[0u8; 120])?;
    s.put_bytes(&FOOTER_TAIL_MAGIC)?;
    Ok(())
}

// ============================================================================
// Top-level sections
// ============================================================================

fn header_extension_node() -> Node {
    let mut header = Node::new("FBXHeaderExtension");
    header.add_child_scalar("FBXHeaderVersion", 1003i32);
    header.add_child_scalar("FBXVersion", FBX_VERSION as i32);
    header.add_child_scalar("EncryptionType", 0i32);

    let now = Local::now();
    let mut timestamp = Node::new("CreationTimeStamp");
    timestamp.add_child_scalar("Version", 1000i32);
    timestamp.add_child_scalar("Year", now.year());
    timestamp.add_child_scalar("Month", now.month() as i32);
    timestamp.add_child_scalar("Day", now.day() as i32);
    timestamp.add_child_scalar("Hour", now.hour() as i32);
    timestamp.add_child_scalar("Minute", now.minute() as i32);
    timestamp.add_child_scalar("Second", now.second() as i32);
    timestamp.add_child_scalar("Millisecond", (now.nanosecond() / 1_000_000) as i32);
    header.add_child(timestamp);

    header.add_child_scalar("Creator", CREATOR);
    header.add_child(Node::new("SceneInfo"));
    header
}

fn global_settings_node() -> Node {
    let mut settings = Node::new("GlobalSettings");
    settings.add_child_scalar("Version", 1000i32);

    let mut p = Node::new("Properties70");
    p.add_p70_int("UpAxis", 1);
    p.add_p70_int("UpAxisSign", 1);
    p.add_p70_int("FrontAxis", 2);
    p.add_p70_int("FrontAxisSign", 1);
    p.add_p70_int("CoordAxis", 0);
    p.add_p70_int("CoordAxisSign", 1);
    p.add_p70_int("OriginalUpAxis", 1);
    p.add_p70_int("OriginalUpAxisSign", 1);
    p.add_p70_double("UnitScaleFactor", 1.0);
    p.add_p70_double("OriginalUnitScaleFactor", 1.0);
    p.add_p70_color("AmbientColor", 0.0, 0.0, 0.0);
    p.add_p70_string("DefaultCamera", "Producer Perspective");
    p.add_p70_enum("TimeMode", 11);
    p.add_p70_enum("TimeProtocol", 2);
    p.add_p70_enum("SnapOnFrameMode", 0);
    p.add_p70_time("TimeSpanStart", 0);
    p.add_p70_time("TimeSpanStop", 46_186_158_000);
    p.add_p70_double("CustomFrameRate", -1.0);
    settings.add_child(p);

    settings
}

fn documents_node(document_uid: i64) -> Node {
    let mut documents = Node::new("Documents");
    documents.add_child_scalar("Count", 1i32);

    let mut document = Node::new("Document");
    document.add_property(document_uid);
    document.add_property("");
    document.add_property("Scene");

    let mut p = Node::new("Properties70");
    p.add_p70("SourceObject", "object", "", "", []);
    p.add_p70_string("ActiveAnimStackName", "");
    document.add_child(p);

    document.add_child_scalar("RootNode", 0i64);
    documents.add_child(document);
    documents
}

// ============================================================================
// Definitions
// ============================================================================

fn definitions_node(graph: &ObjectGraph) -> Node {
    let mut definitions = Node::new("Definitions");
    definitions.add_child_scalar("Version", 100i32);

    let total = 3 // GlobalSettings + AnimationStack + AnimationLayer
        + graph.model_count
        + graph.geometry_count
        + graph.material_count
        + graph.texture_count;
    definitions.add_child_scalar("Count", total as i32);

    definitions.add_child(object_type_node("GlobalSettings", 1, None));
    definitions.add_child(object_type_node(
        "AnimationStack",
        1,
        Some(anim_stack_template()),
    ));
    definitions.add_child(object_type_node(
        "AnimationLayer",
        1,
        Some(anim_layer_template()),
    ));
    definitions.add_child(object_type_node(
        "Model",
        graph.model_count as i32,
        Some(model_template()),
    ));
    definitions.add_child(object_type_node(
        "Geometry",
        graph.geometry_count as i32,
        Some(geometry_template()),
    ));
    definitions.add_child(object_type_node(
        "Material",
        graph.material_count as i32,
        Some(surface_template(graph.any_phong)),
    ));
    definitions.add_child(object_type_node(
        "Texture",
        graph.texture_count as i32,
        Some(texture_template()),
    ));

    definitions
}

fn object_type_node(type_name: &str, count: i32, template: Option<Node>) -> Node {
    let mut ot = Node::new("ObjectType");
    ot.add_property(type_name);
    ot.add_child_scalar("Count", count);
    if let Some(template) = template {
        ot.add_child(template);
    }
    ot
}

fn property_template(class: &str, p70: Node) -> Node {
    let mut template = Node::new("PropertyTemplate");
    template.add_property(class);
    template.add_child(p70);
    template
}

fn anim_stack_template() -> Node {
    let mut p = Node::new("Properties70");
    p.add_p70_string("Description", "");
    p.add_p70_time("LocalStart", 0);
    p.add_p70_time("LocalStop", 0);
    p.add_p70_time("ReferenceStart", 0);
    p.add_p70_time("ReferenceStop", 0);
    property_template("FbxAnimStack", p)
}

fn anim_layer_template() -> Node {
    let mut p = Node::new("Properties70");
    p.add_p70_number_a("Weight", 100.0);
    p.add_p70_bool("Mute", false);
    p.add_p70_bool("Solo", false);
    p.add_p70_bool("Lock", false);
    p.add_p70_color("Color", 0.8, 0.8, 0.8);
    p.add_p70_enum("BlendMode", 0);
    p.add_p70_enum("RotationAccumulationMode", 0);
    p.add_p70_enum("ScaleAccumulationMode", 0);
    p.add_p70("BlendModeBypass", "ULongLong", "", "", [0i64.into()]);
    property_template("FbxAnimLayer", p)
}

/// The stock FbxNode property template. Defaults are the FBX SDK values;
/// the `H` flag on LimbLength is undocumented and preserved verbatim.
fn model_template() -> Node {
    let mut p = Node::new("Properties70");
    p.add_p70_enum("QuaternionInterpolate", 0);
    p.add_p70_vector("RotationOffset", 0.0, 0.0, 0.0);
    p.add_p70_vector("RotationPivot", 0.0, 0.0, 0.0);
    p.add_p70_vector("ScalingOffset", 0.0, 0.0, 0.0);
    p.add_p70_vector("ScalingPivot", 0.0, 0.0, 0.0);
    p.add_p70_bool("TranslationActive", false);
    p.add_p70_vector("TranslationMin", 0.0, 0.0, 0.0);
    p.add_p70_vector("TranslationMax", 0.0, 0.0, 0.0);
    p.add_p70_bool("TranslationMinX", false);
    p.add_p70_bool("TranslationMinY", false);
    p.add_p70_bool("TranslationMinZ", false);
    p.add_p70_bool("TranslationMaxX", false);
    p.add_p70_bool("TranslationMaxY", false);
    p.add_p70_bool("TranslationMaxZ", false);
    p.add_p70_enum("RotationOrder", 0);
    p.add_p70_bool("RotationSpaceForLimitOnly", false);
    p.add_p70_double("RotationStiffnessX", 0.0);
    p.add_p70_double("RotationStiffnessY", 0.0);
    p.add_p70_double("RotationStiffnessZ", 0.0);
    p.add_p70_double("AxisLen", 10.0);
    p.add_p70_vector("PreRotation", 0.0, 0.0, 0.0);
    p.add_p70_vector("PostRotation", 0.0, 0.0, 0.0);
    p.add_p70_bool("RotationActive", false);
    p.add_p70_vector("RotationMin", 0.0, 0.0, 0.0);
    p.add_p70_vector("RotationMax", 0.0, 0.0, 0.0);
    p.add_p70_bool("RotationMinX", false);
    p.add_p70_bool("RotationMinY", false);
    p.add_p70_bool("RotationMinZ", false);
    p.add_p70_bool("RotationMaxX", false);
    p.add_p70_bool("RotationMaxY", false);
    p.add_p70_bool("RotationMaxZ", false);
    p.add_p70_enum("InheritType", 0);
    p.add_p70_bool("ScalingActive", false);
    p.add_p70_vector("ScalingMin", 0.0, 0.0, 0.0);
    p.add_p70_vector("ScalingMax", 1.0, 1.0, 1.0);
    p.add_p70_bool("ScalingMinX", false);
    p.add_p70_bool("ScalingMinY", false);
    p.add_p70_bool("ScalingMinZ", false);
    p.add_p70_bool("ScalingMaxX", false);
    p.add_p70_bool("ScalingMaxY", false);
    p.add_p70_bool("ScalingMaxZ", false);
    p.add_p70_vector("GeometricTranslation", 0.0, 0.0, 0.0);
    p.add_p70_vector("GeometricRotation", 0.0, 0.0, 0.0);
    p.add_p70_vector("GeometricScaling", 1.0, 1.0, 1.0);
    p.add_p70_double("MinDampRangeX", 0.0);
    p.add_p70_double("MinDampRangeY", 0.0);
    p.add_p70_double("MinDampRangeZ", 0.0);
    p.add_p70_double("MaxDampRangeX", 0.0);
    p.add_p70_double("MaxDampRangeY", 0.0);
    p.add_p70_double("MaxDampRangeZ", 0.0);
    p.add_p70_double("MinDampStrengthX", 0.0);
    p.add_p70_double("MinDampStrengthY", 0.0);
    p.add_p70_double("MinDampStrengthZ", 0.0);
    p.add_p70_double("MaxDampStrengthX", 0.0);
    p.add_p70_double("MaxDampStrengthY", 0.0);
    p.add_p70_double("MaxDampStrengthZ", 0.0);
    p.add_p70_double("PreferedAngleX", 0.0);
    p.add_p70_double("PreferedAngleY", 0.0);
    p.add_p70_double("PreferedAngleZ", 0.0);
    p.add_p70("LookAtProperty", "object", "", "", []);
    p.add_p70("UpVectorProperty", "object", "", "", []);
    p.add_p70_bool("Show", true);
    p.add_p70_bool("NegativePercentShapeSupport", true);
    p.add_p70_int("DefaultAttributeIndex", -1);
    p.add_p70_bool("Freeze", false);
    p.add_p70_bool("LODBox", false);
    p.add_p70("LimbLength", "double", "Number", "H", [1.0f64.into()]);
    p.add_p70("Lcl Translation", "Lcl Translation", "", "A", [0.0f64.into(), 0.0f64.into(), 0.0f64.into()]);
    p.add_p70("Lcl Rotation", "Lcl Rotation", "", "A", [0.0f64.into(), 0.0f64.into(), 0.0f64.into()]);
    p.add_p70("Lcl Scaling", "Lcl Scaling", "", "A", [1.0f64.into(), 1.0f64.into(), 1.0f64.into()]);
    p.add_p70("Visibility", "Visibility", "", "A", [1.0f64.into()]);
    p.add_p70("Visibility Inheritance", "Visibility Inheritance", "", "", [1i32.into()]);
    property_template("FbxNode", p)
}

fn geometry_template() -> Node {
    let mut p = Node::new("Properties70");
    p.add_p70_color("Color", 0.8, 0.8, 0.8);
    p.add_p70_vector("BBoxMin", 0.0, 0.0, 0.0);
    p.add_p70_vector("BBoxMax", 0.0, 0.0, 0.0);
    p.add_p70_bool("Primary Visibility", true);
    p.add_p70_bool("Casts Shadows", true);
    p.add_p70_bool("Receive Shadows", true);
    property_template("FbxMesh", p)
}

/// Surface material template. The class must agree with the shading models
/// written in Objects: phong when any material in the scene is phong,
/// lambert otherwise.
fn surface_template(any_phong: bool) -> Node {
    let mut p = Node::new("Properties70");
    p.add_p70_string("ShadingModel", if any_phong { "Phong" } else { "Lambert" });
    p.add_p70_bool("MultiLayer", false);
    p.add_p70_color_a("EmissiveColor", 0.0, 0.0, 0.0);
    p.add_p70_number_a("EmissiveFactor", 1.0);
    p.add_p70_color_a("AmbientColor", 0.2, 0.2, 0.2);
    p.add_p70_number_a("AmbientFactor", 1.0);
    p.add_p70_color_a("DiffuseColor", 0.8, 0.8, 0.8);
    p.add_p70_number_a("DiffuseFactor", 1.0);
    p.add_p70_vector("Bump", 0.0, 0.0, 0.0);
    p.add_p70_vector("NormalMap", 0.0, 0.0, 0.0);
    p.add_p70_double("BumpFactor", 1.0);
    p.add_p70_color_a("TransparentColor", 0.0, 0.0, 0.0);
    p.add_p70_number_a("TransparencyFactor", 0.0);
    p.add_p70_color("DisplacementColor", 0.0, 0.0, 0.0);
    p.add_p70_double("DisplacementFactor", 1.0);
    p.add_p70_color("VectorDisplacementColor", 0.0, 0.0, 0.0);
    p.add_p70_double("VectorDisplacementFactor", 1.0);
    if any_phong {
        p.add_p70_color_a("SpecularColor", 0.2, 0.2, 0.2);
        p.add_p70_number_a("SpecularFactor", 1.0);
        p.add_p70_number_a("ShininessExponent", 20.0);
        p.add_p70_color_a("ReflectionColor", 0.0, 0.0, 0.0);
        p.add_p70_number_a("ReflectionFactor", 1.0);
    }
    property_template(
        if any_phong {
            "FbxSurfacePhong"
        } else {
            "FbxSurfaceLambert"
        },
        p,
    )
}

fn texture_template() -> Node {
    let mut p = Node::new("Properties70");
    p.add_p70_enum("TextureTypeUse", 0);
    p.add_p70_number_a("Texture alpha", 1.0);
    p.add_p70_enum("CurrentMappingType", 0);
    p.add_p70_enum("WrapModeU", 0);
    p.add_p70_enum("WrapModeV", 0);
    p.add_p70_bool("UVSwap", false);
    p.add_p70_bool("PremultiplyAlpha", true);
    p.add_p70("Translation", "Vector", "", "A", [0.0f64.into(), 0.0f64.into(), 0.0f64.into()]);
    p.add_p70("Rotation", "Vector", "", "A", [0.0f64.into(), 0.0f64.into(), 0.0f64.into()]);
    p.add_p70("Scaling", "Vector", "", "A", [1.0f64.into(), 1.0f64.into(), 1.0f64.into()]);
    p.add_p70_vector("TextureRotationPivot", 0.0, 0.0, 0.0);
    p.add_p70_vector("TextureScalingPivot", 0.0, 0.0, 0.0);
    p.add_p70_enum("CurrentTextureBlendMode", 1);
    p.add_p70_string("UVSet", "default");
    p.add_p70_bool("UseMaterial", false);
    p.add_p70_bool("UseMipMap", false);
    property_template("FbxFileTexture", p)
}
