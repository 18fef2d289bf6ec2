// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ-Lite Geometry Processing
//!
//! Assembles parsed OBJ directive streams into deduplicated, indexed
//! triangle meshes using nalgebra for the vector math.
//!
//! ## Overview
//!
//! - **Compiler**: folds a directive sequence into meshes keyed by
//!   group and material, with per-mesh vertex deduplication, quad fan
//!   splitting, and optional tangent-space computation
//! - **Incremental driver**: the same fold as a caller-stepped state
//!   machine for responsive processing of large documents
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use obj_lite_core::parse_document;
//! use obj_lite_geometry::{compile, CompileConfig, DEFAULT_NAME};
//!
//! let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
//! let directives = parse_document(text)?;
//! let groups = compile(&CompileConfig::default(), &directives)?;
//! let mesh = &groups[DEFAULT_NAME][DEFAULT_NAME];
//! assert_eq!(mesh.triangle_count(), 1);
//! ```
//!
//! ## Incremental Driver
//!
//! For large files, step the compile a bounded number of lines at a
//! time instead of blocking on the whole document:
//!
//! ```rust,ignore
//! use obj_lite_geometry::{CompileConfig, Driver};
//!
//! let mut driver = Driver::start(&CompileConfig::default(), text);
//! loop {
//!     driver = driver.step(1024);
//!     if driver.is_finished() {
//!         break;
//!     }
//!     // yield to other scheduled work here
//! }
//! let groups = driver.into_result().unwrap()?;
//! ```

pub mod compiler;
pub mod error;
pub mod mesh;
pub mod streaming;
mod tangent;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3, Vector4};

pub use compiler::{compile, CompileConfig};
pub use error::{AttributeKind, Error, Result};
pub use mesh::{
    GroupMap, Mesh, MeshData, NormalMappedVertex, Polyline, TexturedVertex, Vertex, DEFAULT_NAME,
};
pub use streaming::{Driver, InProgress};
