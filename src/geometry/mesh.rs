// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Render mesh: indexed triangles derived from solid boundaries

use super::{BoundingBox, Polygon};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    /// Linear interpolation of position and normal
    pub fn interpolate(&self, other: &Vertex, t: f64) -> Self {
        Self {
            position: self.position + (other.position - self.position) * t,
            normal: self.normal.lerp(&other.normal, t),
        }
    }

    pub(crate) fn flip(&mut self) {
        self.normal = -self.normal;
    }
}

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }
}

/// Triangular mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Fan-triangulate convex polygons
    ///
    /// Each polygon contributes its own vertices so that flat shading keeps
    /// the face normal.
    pub fn from_polygons(polygons: &[Polygon]) -> Self {
        let vertex_count = polygons.iter().map(|p| p.vertices().len()).sum();
        let triangle_count = polygons.iter().map(|p| p.vertices().len() - 2).sum();
        let mut mesh = Self::with_capacity(vertex_count, triangle_count);

        for polygon in polygons {
            let base = mesh.vertices.len();
            mesh.vertices.extend_from_slice(polygon.vertices());
            for i in 1..polygon.vertices().len() - 1 {
                mesh.add_triangle(Triangle::new([base, base + i, base + i + 1]));
            }
        }

        mesh
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices.iter().map(|v| &v.position))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Positions of one triangle
    pub fn triangle_positions(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        triangle.indices.map(|i| self.vertices[i].position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_triangulation() {
        let n = Vector3::z();
        let quad = Polygon::new(vec![
            Vertex::new(Point3::new(0.0, 0.0, 0.0), n),
            Vertex::new(Point3::new(1.0, 0.0, 0.0), n),
            Vertex::new(Point3::new(1.0, 1.0, 0.0), n),
            Vertex::new(Point3::new(0.0, 1.0, 0.0), n),
        ])
        .unwrap();

        let mesh = Mesh::from_polygons(&[quad]);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles[1].indices, [0, 2, 3]);
    }

    #[test]
    fn test_interpolate_midpoint() {
        let a = Vertex::new(Point3::new(0.0, 0.0, 0.0), Vector3::x());
        let b = Vertex::new(Point3::new(2.0, 4.0, 6.0), Vector3::x());
        let mid = a.interpolate(&b, 0.5);
        assert_eq!(mid.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(mid.normal, Vector3::x());
    }
}
