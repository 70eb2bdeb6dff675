// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL export of the stock mesh

use crate::geometry::{Mesh, Triangle};
use anyhow::{Context, Result};
use nalgebra::Vector3;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export mesh to STL; binary for `.stl`, ASCII otherwise
pub fn export_stl(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let binary = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("stl"));

    if binary {
        export_stl_binary(mesh, path)
    } else {
        export_stl_ascii(mesh, path)
    }
}

fn facet_normal(mesh: &Mesh, tri: &Triangle) -> Vector3<f64> {
    let [v0, v1, v2] = tri.indices.map(|i| mesh.vertices[i].normal);
    (v0 + v1 + v2) / 3.0
}

fn export_stl_binary(mesh: &Mesh, path: &Path) -> Result<()> {
    use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

    let triangles: Vec<StlTriangle> = mesh
        .triangles
        .iter()
        .map(|tri| {
            let normal = facet_normal(mesh, tri);
            let [p0, p1, p2] = mesh.triangle_positions(tri);

            StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [p0, p1, p2]
                    .map(|p| StlVertex::new([p.x as f32, p.y as f32, p.z as f32])),
            }
        })
        .collect();

    let file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter()).context("Failed to write STL file")?;
    writer.flush()?;

    Ok(())
}

fn export_stl_ascii(mesh: &Mesh, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "solid stock")?;

    for tri in &mesh.triangles {
        let normal = facet_normal(mesh, tri);
        writeln!(out, "  facet normal {} {} {}", normal.x, normal.y, normal.z)?;
        writeln!(out, "    outer loop")?;
        for p in mesh.triangle_positions(tri) {
            writeln!(out, "      vertex {} {} {}", p.x, p.y, p.z)?;
        }
        writeln!(out, "    endloop")?;
        writeln!(out, "  endfacet")?;
    }

    writeln!(out, "endsolid stock")?;
    out.flush()?;

    Ok(())
}
