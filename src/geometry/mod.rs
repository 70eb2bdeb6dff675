// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - solids, sweeps and render meshes

mod analytics;
mod bbox;
mod csg;
mod mesh;
pub mod primitives;
mod sweep;

pub use analytics::{analyze, GeometryStats};
pub use bbox::BoundingBox;
pub use csg::{Node, Plane, Polygon, Solid, EPSILON};
pub use mesh::{Mesh, Triangle, Vertex};
pub use sweep::{build_sweep, SweepVolumeBuilder};
