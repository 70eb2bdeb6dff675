// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Hexahedral primitives

use super::Polygon;
use nalgebra::Point3;

/// Face table for an eight-corner hexahedron
///
/// ```text
///   6____5
/// 7/|__4/|           Z
/// | 2__|_1           | X
/// 3/___0/       Y ___|/
/// ```
///
/// Corners 0..4 form the bottom face counter-clockwise seen from above and
/// 4..8 repeat them on top, which makes every face wind outward.
pub const HEXAHEDRON_FACES: [[usize; 4]; 6] = [
    [3, 2, 1, 0], // bottom
    [4, 5, 6, 7], // top
    [0, 1, 5, 4],
    [2, 3, 7, 6],
    [0, 4, 7, 3],
    [1, 2, 6, 5],
];

/// Six quadrilateral faces of a hexahedron
///
/// Degenerate faces (collapsed corners) are dropped.
pub fn hexahedron(corners: &[Point3<f64>; 8]) -> Vec<Polygon> {
    HEXAHEDRON_FACES
        .iter()
        .filter_map(|face| Polygon::from_points(&face.map(|i| corners[i])))
        .collect()
}

/// Axis-aligned box between two corners
pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Vec<Polygon> {
    let corners = [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];
    hexahedron(&corners)
}
