// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Gantry assembly for the render surface
//!
//! Three nested frames: the fixed X rails carry the Y rails, which carry the
//! Z carriage. Each frame has a translation relative to its parent and a set
//! of box-shaped parts. World placements are resolved in one top-down pass.

use crate::config::SimulatorConfig;
use nalgebra::{Isometry3, Point3, Translation3, Vector3};

pub const X_RAILS: &str = "x_rails";
pub const Y_RAILS: &str = "y_rails";
pub const Z_CARRIAGE: &str = "z_carriage";

/// Axis-aligned box attached to a frame
#[derive(Debug, Clone, PartialEq)]
pub struct BoxPart {
    pub name: &'static str,
    /// Full extents along each axis
    pub size: Vector3<f64>,
    /// Box center in frame coordinates
    pub center: Point3<f64>,
}

impl BoxPart {
    fn new(name: &'static str, size: [f64; 3], center: [f64; 3]) -> Self {
        Self {
            name,
            size: Vector3::from(size),
            center: Point3::from(center),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub name: &'static str,
    /// Translation relative to the parent frame
    pub local: Translation3<f64>,
    pub parts: Vec<BoxPart>,
    pub children: Vec<Frame>,
}

impl Frame {
    fn new(name: &'static str, parts: Vec<BoxPart>, children: Vec<Frame>) -> Self {
        Self {
            name,
            local: Translation3::identity(),
            parts,
            children,
        }
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Frame> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(name))
    }

    fn find(&self, name: &str) -> Option<&Frame> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

/// A frame's resolved world placement
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTransform {
    pub name: &'static str,
    pub world: Isometry3<f64>,
    /// Parts with centers in world coordinates
    pub parts: Vec<BoxPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gantry {
    root: Frame,
}

impl Gantry {
    /// Machine sized around the configured sheet
    pub fn new(config: &SimulatorConfig) -> Self {
        let width = config.sheet_width;
        let height = config.sheet_height;

        let rail_height = 100.0;
        let rail_depth = 300.0;
        let rail_offset = 200.0;
        let rail_z = 50.0;

        let y_rail_x = 100.0;
        let y_rail_depth = 250.0;
        let support_z = y_rail_depth / 2.0 + rail_depth / 2.0 + rail_z;

        let carriage_width = 100.0;

        let carriage = Frame::new(
            Z_CARRIAGE,
            vec![
                BoxPart::new("carriage", [carriage_width, 200.0, 400.0], [0.0, 0.0, 350.0]),
                BoxPart::new("motor", [carriage_width, carriage_width, 120.0], [0.0, 0.0, 120.0]),
            ],
            Vec::new(),
        );

        let y_rails = Frame::new(
            Y_RAILS,
            vec![
                BoxPart::new(
                    "y_rail",
                    [100.0, height + rail_height + rail_offset * 2.0, y_rail_depth],
                    [y_rail_x, height / 2.0, support_z + 50.0],
                ),
                BoxPart::new(
                    "support_near",
                    [200.0, rail_height, 350.0],
                    [y_rail_x, -rail_offset, support_z],
                ),
                BoxPart::new(
                    "support_far",
                    [200.0, rail_height, 350.0],
                    [y_rail_x, height + rail_offset, support_z],
                ),
            ],
            vec![carriage],
        );

        let rail_size = [width + 300.0, rail_height, rail_depth];
        let x_rails = Frame::new(
            X_RAILS,
            vec![
                BoxPart::new("x_rail_near", rail_size, [width / 2.0, -rail_offset, rail_z]),
                BoxPart::new("x_rail_far", rail_size, [width / 2.0, height + rail_offset, rail_z]),
            ],
            vec![y_rails],
        );

        Self { root: x_rails }
    }

    /// Move the Y rails and carriage so the spindle sits over `tool`
    pub fn follow(&mut self, tool: &Point3<f64>) {
        if let Some(frame) = self.root.find_mut(Y_RAILS) {
            frame.local = Translation3::new(tool.x, 0.0, 0.0);
        }
        if let Some(frame) = self.root.find_mut(Z_CARRIAGE) {
            frame.local = Translation3::new(0.0, tool.y, tool.z);
        }
    }

    pub fn frame(&self, name: &str) -> Option<&Frame> {
        self.root.find(name)
    }

    /// World placement of every frame, parents before children
    pub fn world_transforms(&self) -> Vec<FrameTransform> {
        let mut out = Vec::with_capacity(3);
        let mut stack = vec![(&self.root, Isometry3::identity())];

        while let Some((frame, parent)) = stack.pop() {
            let world = parent * Isometry3::from(frame.local);
            out.push(FrameTransform {
                name: frame.name,
                world,
                parts: frame
                    .parts
                    .iter()
                    .map(|part| BoxPart {
                        center: world * part.center,
                        ..part.clone()
                    })
                    .collect(),
            });
            stack.extend(frame.children.iter().rev().map(|child| (child, world)));
        }

        out
    }
}
