// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - toolpath parsing, importing, and mesh export

mod export_gltf;
mod exporter;
mod importer;
mod parser;

pub use export_gltf::export as export_gltf;
pub use exporter::export_stl;
pub use importer::{import_stl_file, import_toolpath_file};
pub use parser::parse_toolpath;
