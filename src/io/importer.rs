// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! File importers for toolpaths and reference meshes

use crate::geometry::{Mesh, Triangle, Vertex};
use crate::toolpath::Path;
use anyhow::{Context, Result};
use nalgebra::{Point3, Vector3};
use std::fs::{self, File};

/// Read and parse a toolpath file
pub fn import_toolpath_file(path: impl AsRef<std::path::Path>) -> Result<Path> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read toolpath file: {}", path.display()))?;

    super::parse_toolpath(&source)
        .with_context(|| format!("Failed to parse toolpath file: {}", path.display()))
}

/// Load an STL file (binary or ASCII) into a mesh
pub fn import_stl_file(path: impl AsRef<std::path::Path>) -> Result<Mesh> {
    let path = path.as_ref();
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open STL file: {}", path.display()))?;
    let stl = stl_io::read_stl(&mut file).context("Failed to read STL file")?;

    let mut mesh = Mesh::with_capacity(stl.faces.len() * 3, stl.faces.len());
    for face in &stl.faces {
        let normal = Vector3::new(
            face.normal[0] as f64,
            face.normal[1] as f64,
            face.normal[2] as f64,
        );
        let indices = face.vertices.map(|i| {
            let v = &stl.vertices[i];
            mesh.add_vertex(Vertex::new(
                Point3::new(v[0] as f64, v[1] as f64, v[2] as f64),
                normal,
            ))
        });
        mesh.add_triangle(Triangle::new(indices));
    }

    Ok(mesh)
}
