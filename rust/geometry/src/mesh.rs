// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures
//!
//! A sealed [`Mesh`] carries one of three vertex layouts. The layout is
//! fixed by the first face of its group/material pair and never changes.

use nalgebra::{Point2, Point3, Vector3, Vector4};
use rustc_hash::FxHashMap;

/// Group name → material name → sealed mesh
pub type GroupMap = FxHashMap<String, FxHashMap<String, Mesh>>;

/// Group and material name in effect until the document overrides them
pub const DEFAULT_NAME: &str = "__default__";

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

/// Vertex with position, normal, and texture coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TexturedVertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub uv: Point2<f32>,
}

/// Vertex for normal-mapped shading. The tangent's xyz is the
/// orthonormalized tangent direction; w is the bitangent handedness
/// (+1 or -1).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalMappedVertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub uv: Point2<f32>,
    pub tangent: Vector4<f32>,
}

/// A polyline resolved to positions: two endpoints plus the open-ended
/// tail for polylines with more than two points
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polyline {
    pub first: Point3<f32>,
    pub second: Point3<f32>,
    pub rest: Vec<Point3<f32>>,
}

impl Polyline {
    /// Number of points, always at least 2
    #[inline]
    pub fn point_count(&self) -> usize {
        2 + self.rest.len()
    }

    /// All points in source order
    pub fn points(&self) -> impl Iterator<Item = &Point3<f32>> {
        std::iter::once(&self.first)
            .chain(std::iter::once(&self.second))
            .chain(self.rest.iter())
    }
}

/// Indexed triangle data for one vertex layout
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshData<V> {
    /// Deduplicated vertices in append order
    pub vertices: Vec<V>,
    /// Triangles as index triples into `vertices`
    pub triangles: Vec<[u32; 3]>,
    /// Polylines sealed with this mesh
    pub polylines: Vec<Polyline>,
}

impl<V> MeshData<V> {
    /// Create empty mesh data
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            polylines: Vec::new(),
        }
    }
}

impl<V> Default for MeshData<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// A sealed mesh for one (group, material) pair
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mesh {
    /// Faces of the `i//k` form: positions and normals
    Basic(MeshData<Vertex>),
    /// Faces of the `i/j/k` form: positions, normals, and texture coordinates
    Textured(MeshData<TexturedVertex>),
    /// Textured faces compiled with tangents for normal mapping
    NormalMapped(MeshData<NormalMappedVertex>),
}

impl Mesh {
    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        match self {
            Mesh::Basic(data) => data.vertices.len(),
            Mesh::Textured(data) => data.vertices.len(),
            Mesh::NormalMapped(data) => data.vertices.len(),
        }
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles().len()
    }

    /// Triangles as index triples, regardless of layout
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        match self {
            Mesh::Basic(data) => &data.triangles,
            Mesh::Textured(data) => &data.triangles,
            Mesh::NormalMapped(data) => &data.triangles,
        }
    }

    /// Polylines sealed with this mesh, regardless of layout
    #[inline]
    pub fn polylines(&self) -> &[Polyline] {
        match self {
            Mesh::Basic(data) => &data.polylines,
            Mesh::Textured(data) => &data.polylines,
            Mesh::NormalMapped(data) => &data.polylines,
        }
    }

    /// Check if the mesh has no vertices, triangles, or polylines
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0 && self.triangle_count() == 0 && self.polylines().is_empty()
    }

    /// Human-readable name of the vertex layout
    #[inline]
    pub fn layout(&self) -> &'static str {
        match self {
            Mesh::Basic(_) => crate::compiler::LAYOUT_BASIC,
            Mesh::Textured(_) => crate::compiler::LAYOUT_TEXTURED,
            Mesh::NormalMapped(_) => crate::compiler::LAYOUT_NORMAL_MAPPED,
        }
    }
}
