// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics for render meshes

use super::{BoundingBox, Mesh};
use serde::{Deserialize, Serialize};

/// Geometry statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryStats {
    /// Enclosed volume in cubic units (signed by winding)
    pub volume: f64,
    /// Total surface area in square units
    pub surface_area: f64,
    pub bbox: BoundingBox,
    pub vertex_count: usize,
    pub triangle_count: usize,
}

impl GeometryStats {
    pub fn empty() -> Self {
        Self {
            volume: 0.0,
            surface_area: 0.0,
            bbox: BoundingBox::empty(),
            vertex_count: 0,
            triangle_count: 0,
        }
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh) -> GeometryStats {
    if mesh.is_empty() {
        return GeometryStats::empty();
    }

    GeometryStats {
        volume: calculate_volume(mesh),
        surface_area: calculate_surface_area(mesh),
        bbox: mesh.bounding_box(),
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
    }
}

/// Sum of signed tetrahedra formed by each triangle and the origin
///
/// Triangles produced by fan triangulation may meet at T-junctions; the sum
/// stays exact as long as the surface is closed. Inward-wound meshes give a
/// negative result.
fn calculate_volume(mesh: &Mesh) -> f64 {
    mesh.triangles
        .iter()
        .map(|triangle| {
            let [v0, v1, v2] = mesh.triangle_positions(triangle);
            v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0
        })
        .sum()
}

fn calculate_surface_area(mesh: &Mesh) -> f64 {
    mesh.triangles
        .iter()
        .map(|triangle| {
            let [v0, v1, v2] = mesh.triangle_positions(triangle);
            (v1 - v0).cross(&(v2 - v0)).norm() / 2.0
        })
        .sum()
}
