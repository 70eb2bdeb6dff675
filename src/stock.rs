// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! The workpiece: a slab solid that cutting sweeps are subtracted from
//!
//! The stock owns both its solid and the render mesh derived from it. The
//! mesh is regenerated after every removal so readers never see a mesh that
//! lags the solid.

use crate::config::SimulatorConfig;
use crate::geometry::{primitives, BoundingBox, Mesh, Solid};
use nalgebra::Point3;

#[derive(Debug, Clone)]
pub struct StockModel {
    solid: Solid,
    mesh: Mesh,
    initial_volume: f64,
    removal_count: usize,
}

impl StockModel {
    /// Slab spanning `[m, w+m] x [m, h+m] x [0, t]`
    pub fn new(config: &SimulatorConfig) -> Self {
        let margin = config.sheet_margin;
        let min = Point3::new(margin, margin, 0.0);
        let max = Point3::new(
            config.sheet_width + margin,
            config.sheet_height + margin,
            config.sheet_thickness,
        );
        Self::from_solid(Solid::from_polygons(primitives::cuboid(min, max)))
    }

    pub fn from_solid(solid: Solid) -> Self {
        let mesh = solid.to_mesh();
        let initial_volume = solid.volume();
        Self {
            solid,
            mesh,
            initial_volume,
            removal_count: 0,
        }
    }

    /// Subtract `removal` from the stock and refresh the mesh
    ///
    /// Returns false when the removal cannot touch the stock and was skipped.
    pub fn apply_removal(&mut self, removal: &Solid) -> bool {
        if removal.is_empty() || !self.bounds().intersects(&removal.bounding_box()) {
            tracing::debug!("removal misses the stock, skipped");
            return false;
        }

        let solid = std::mem::take(&mut self.solid);
        self.solid = solid.subtract(removal);
        self.mesh = self.solid.to_mesh();
        self.removal_count += 1;

        tracing::debug!(
            removals = self.removal_count,
            polygons = self.solid.polygon_count(),
            triangles = self.mesh.triangle_count(),
            "stock updated"
        );
        true
    }

    pub fn solid(&self) -> &Solid {
        &self.solid
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn volume(&self) -> f64 {
        self.solid.volume()
    }

    pub fn initial_volume(&self) -> f64 {
        self.initial_volume
    }

    pub fn removed_volume(&self) -> f64 {
        self.initial_volume - self.volume()
    }

    /// Number of removals that reached the solid
    pub fn removal_count(&self) -> usize {
        self.removal_count
    }

    pub fn polygon_count(&self) -> usize {
        self.solid.polygon_count()
    }

    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        self.solid.contains_point(point)
    }

    pub fn bounds(&self) -> BoundingBox {
        self.mesh.bounding_box()
    }
}
