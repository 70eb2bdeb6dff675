// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! GLTF/GLB exporter

use crate::geometry::Mesh;
use anyhow::{Context, Result};
use serde_json::json;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

/// Export mesh to GLB when the path ends in `.glb`, otherwise to a `.gltf`
/// document with a sibling `.bin` buffer
pub fn export(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let glb = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("glb"));

    if glb {
        export_glb(mesh, path)
    } else {
        export_gltf_separate(mesh, path)
    }
}

fn export_glb(mesh: &Mesh, path: &Path) -> Result<()> {
    let (document, buffer) = build_document(mesh, None);

    let json = serde_json::to_string(&document)?;
    let json_length = align4(json.len());
    let buffer_length = align4(buffer.len());
    let total_length = 12 + 8 + json_length + 8 + buffer_length;

    let file = File::create(path)
        .with_context(|| format!("Failed to create GLB file: {}", path.display()))?;
    let mut out = BufWriter::new(file);

    out.write_all(&GLB_MAGIC.to_le_bytes())?;
    out.write_all(&2u32.to_le_bytes())?;
    out.write_all(&(total_length as u32).to_le_bytes())?;

    out.write_all(&(json_length as u32).to_le_bytes())?;
    out.write_all(&CHUNK_JSON.to_le_bytes())?;
    out.write_all(json.as_bytes())?;
    out.write_all(&vec![b' '; json_length - json.len()])?;

    out.write_all(&(buffer_length as u32).to_le_bytes())?;
    out.write_all(&CHUNK_BIN.to_le_bytes())?;
    out.write_all(&buffer)?;
    out.write_all(&vec![0u8; buffer_length - buffer.len()])?;

    out.flush()?;
    Ok(())
}

fn export_gltf_separate(mesh: &Mesh, path: &Path) -> Result<()> {
    let bin_path = path.with_extension("bin");
    let bin_name = bin_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("stock.bin")
        .to_string();

    let (document, buffer) = build_document(mesh, Some(&bin_name));

    std::fs::write(path, serde_json::to_string_pretty(&document)?)
        .with_context(|| format!("Failed to write GLTF file: {}", path.display()))?;
    std::fs::write(&bin_path, buffer)
        .with_context(|| format!("Failed to write buffer: {}", bin_path.display()))?;

    Ok(())
}

/// JSON document plus the binary buffer it describes
///
/// Positions and normals are written as f32, indices as u32.
fn build_document(mesh: &Mesh, uri: Option<&str>) -> (serde_json::Value, Vec<u8>) {
    let vertex_count = mesh.vertices.len();
    let mut buffer = Vec::with_capacity(vertex_count * 24 + mesh.triangles.len() * 12);

    let position_offset = buffer.len();
    for vertex in &mesh.vertices {
        for c in vertex.position.iter() {
            buffer.extend_from_slice(&(*c as f32).to_le_bytes());
        }
    }
    let position_length = buffer.len() - position_offset;

    let normal_offset = buffer.len();
    for vertex in &mesh.vertices {
        for c in vertex.normal.iter() {
            buffer.extend_from_slice(&(*c as f32).to_le_bytes());
        }
    }
    let normal_length = buffer.len() - normal_offset;

    let indices_offset = buffer.len();
    for triangle in &mesh.triangles {
        for index in triangle.indices {
            buffer.extend_from_slice(&(index as u32).to_le_bytes());
        }
    }
    let indices_length = buffer.len() - indices_offset;

    let (min, max) = position_bounds(mesh);

    let mut gltf_buffer = json!({ "byteLength": buffer.len() });
    if let Some(uri) = uri {
        gltf_buffer["uri"] = json!(uri);
    }

    let document = json!({
        "asset": {
            "generator": "routersim",
            "version": "2.0"
        },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0, "name": "stock" }],
        "meshes": [
            {
                "primitives": [
                    {
                        "attributes": { "POSITION": 0, "NORMAL": 1 },
                        "indices": 2,
                        "mode": 4
                    }
                ]
            }
        ],
        "accessors": [
            {
                "bufferView": 0,
                "componentType": 5126,
                "count": vertex_count,
                "type": "VEC3",
                "min": min,
                "max": max
            },
            {
                "bufferView": 1,
                "componentType": 5126,
                "count": vertex_count,
                "type": "VEC3"
            },
            {
                "bufferView": 2,
                "componentType": 5125,
                "count": mesh.triangles.len() * 3,
                "type": "SCALAR"
            }
        ],
        "bufferViews": [
            {
                "buffer": 0,
                "byteOffset": position_offset,
                "byteLength": position_length,
                "target": 34962
            },
            {
                "buffer": 0,
                "byteOffset": normal_offset,
                "byteLength": normal_length,
                "target": 34962
            },
            {
                "buffer": 0,
                "byteOffset": indices_offset,
                "byteLength": indices_length,
                "target": 34963
            }
        ],
        "buffers": [gltf_buffer]
    });

    (document, buffer)
}

fn position_bounds(mesh: &Mesh) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];

    for vertex in &mesh.vertices {
        for (axis, c) in vertex.position.iter().enumerate() {
            min[axis] = min[axis].min(*c as f32);
            max[axis] = max[axis].max(*c as f32);
        }
    }

    (min, max)
}

fn align4(n: usize) -> usize {
    (n + 3) & !3
}
