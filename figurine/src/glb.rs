//! Binary glTF (GLB) export.
//!
//! The glTF document and container framing are delegated to the `gltf`
//! crate; this module only lays out the vertex/index buffer and wires up the
//! accessors. Output is deterministic: the same mesh always serializes to
//! the same bytes.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::mem;

use gltf::binary;
use gltf::json;
use json::validation::Checked::Valid;
use json::validation::USize64;
use thiserror::Error;

use crate::mesh::TriMesh;

/// Size of one position record in the binary buffer (three f32s).
const POSITION_STRIDE: usize = 3 * mem::size_of::<f32>();

#[derive(Debug, Error)]
pub enum GlbError {
    /// Export of an empty mesh is refused rather than emitting a degenerate
    /// document some viewers reject.
    #[error("cannot export an empty mesh")]
    EmptyMesh,

    /// glTF JSON serialization failed.
    #[error("glTF JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// GLB container framing failed.
    #[error("GLB container error: {0}")]
    Container(String),
}

fn align_to_multiple_of_four(n: usize) -> usize {
    (n + 3) & !3
}

/// Export a mesh as a single-primitive GLB document.
///
/// The document holds one buffer (positions then indices), one mesh with a
/// triangles primitive, one node, and one scene.
pub fn export_glb(mesh: &TriMesh, name: &str) -> Result<Vec<u8>, GlbError> {
    if mesh.is_empty() {
        return Err(GlbError::EmptyMesh);
    }

    let (min, max) = mesh.bounds().ok_or(GlbError::EmptyMesh)?;

    // Positions first, then indices. The position block is a whole number of
    // 4-byte words, so the index view needs no extra alignment padding.
    let position_bytes = mesh.vertex_count() * POSITION_STRIDE;
    let index_count = mesh.face_count() * 3;
    let index_bytes = index_count * mem::size_of::<u32>();

    let mut bin = Vec::with_capacity(position_bytes + index_bytes);
    for position in &mesh.positions {
        for coordinate in [position.x, position.y, position.z] {
            bin.extend_from_slice(&(coordinate as f32).to_le_bytes());
        }
    }
    for face in &mesh.faces {
        for &index in face {
            bin.extend_from_slice(&index.to_le_bytes());
        }
    }

    let mut root = json::Root::default();

    let buffer = root.push(json::Buffer {
        byte_length: USize64::from(bin.len()),
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        uri: None,
    });

    let position_view = root.push(json::buffer::View {
        buffer,
        byte_length: USize64::from(position_bytes),
        byte_offset: None,
        byte_stride: Some(json::buffer::Stride(POSITION_STRIDE)),
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        target: Some(Valid(json::buffer::Target::ArrayBuffer)),
    });

    let index_view = root.push(json::buffer::View {
        buffer,
        byte_length: USize64::from(index_bytes),
        byte_offset: Some(USize64::from(position_bytes)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        target: Some(Valid(json::buffer::Target::ElementArrayBuffer)),
    });

    let positions = root.push(json::Accessor {
        buffer_view: Some(position_view),
        byte_offset: Some(USize64(0)),
        count: USize64::from(mesh.vertex_count()),
        component_type: Valid(json::accessor::GenericComponentType(
            json::accessor::ComponentType::F32,
        )),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(json::accessor::Type::Vec3),
        min: Some(json::Value::from(vec![min.x as f32, min.y as f32, min.z as f32])),
        max: Some(json::Value::from(vec![max.x as f32, max.y as f32, max.z as f32])),
        name: None,
        normalized: false,
        sparse: None,
    });

    let indices = root.push(json::Accessor {
        buffer_view: Some(index_view),
        byte_offset: Some(USize64(0)),
        count: USize64::from(index_count),
        component_type: Valid(json::accessor::GenericComponentType(
            json::accessor::ComponentType::U32,
        )),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(json::accessor::Type::Scalar),
        min: None,
        max: None,
        name: None,
        normalized: false,
        sparse: None,
    });

    let primitive = json::mesh::Primitive {
        attributes: {
            let mut map = BTreeMap::new();
            map.insert(Valid(json::mesh::Semantic::Positions), positions);
            map
        },
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(indices),
        material: None,
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    };

    let gltf_mesh = root.push(json::Mesh {
        extensions: Default::default(),
        extras: Default::default(),
        name: Some(name.to_owned()),
        primitives: vec![primitive],
        weights: None,
    });

    let node = root.push(json::Node {
        mesh: Some(gltf_mesh),
        name: Some(name.to_owned()),
        ..Default::default()
    });

    let scene = root.push(json::Scene {
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        nodes: vec![node],
    });
    root.scene = Some(scene);

    let json_string = serde_json::to_string(&root)?;
    let json_len = align_to_multiple_of_four(json_string.len());
    let bin_len = align_to_multiple_of_four(bin.len());

    let header_len = 12 + 8 + json_len + 8 + bin_len;
    let glb = binary::Glb {
        header: binary::Header {
            magic: *b"glTF",
            version: 2,
            length: header_len
                .try_into()
                .map_err(|_| GlbError::Container("document exceeds the binary glTF size limit".into()))?,
        },
        json: Cow::Owned(json_string.into_bytes()),
        bin: Some(Cow::Owned(bin)),
    };

    glb.to_vec().map_err(|e| GlbError::Container(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::humanoid_figure;
    use crate::mesh::primitives::cylinder;

    #[test]
    fn rejects_empty_mesh() {
        assert!(matches!(export_glb(&TriMesh::new(), "empty"), Err(GlbError::EmptyMesh)));
    }

    #[test]
    fn container_header_is_valid() {
        let bytes = export_glb(&cylinder(1.0, 1.0, 8), "part").expect("export");

        assert_eq!(&bytes[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 2);
        let declared = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
        assert_eq!(declared as usize, bytes.len());
        // First chunk must be JSON.
        assert_eq!(&bytes[16..20], b"JSON");
    }

    #[test]
    fn document_reimports() {
        let mesh = humanoid_figure();
        let bytes = export_glb(&mesh, "figure").expect("export");

        let document = gltf::Gltf::from_slice(&bytes).expect("GLB must reimport");
        assert_eq!(document.meshes().count(), 1);
        assert_eq!(document.nodes().count(), 1);

        let primitive = document
            .meshes()
            .next()
            .unwrap()
            .primitives()
            .next()
            .expect("one primitive");
        let positions = primitive.get(&gltf::Semantic::Positions).expect("positions accessor");
        assert_eq!(positions.count(), mesh.vertex_count());
        let indices = primitive.indices().expect("index accessor");
        assert_eq!(indices.count(), mesh.face_count() * 3);
    }

    #[test]
    fn export_is_deterministic() {
        let a = export_glb(&humanoid_figure(), "figure").expect("export");
        let b = export_glb(&humanoid_figure(), "figure").expect("export");
        assert_eq!(a, b);
    }
}
