// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed intermediate representation of OBJ directives
//!
//! One [`Directive`] per non-blank, non-comment source line. The parser
//! produces these; the geometry crate folds them into meshes.

use nalgebra::{Point2, Point3, Vector3};

/// One parsed OBJ directive
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Directive {
    /// Vertex position: `v x y z`
    Vertex(Point3<f32>),
    /// Texture coordinate: `vt u v` (a third component is accepted and discarded)
    VertexTexture(Point2<f32>),
    /// Vertex normal: `vn x y z`, normalized at parse time
    VertexNormal(Vector3<f32>),
    /// Face: `f` with 3 or 4 corners of uniform reference form
    Face(FaceSpec),
    /// Polyline: `l` with two or more 1-based position indices
    Polyline(Vec<u32>),
    /// Object name: `o name`
    ObjectName(String),
    /// Group name: `g name` (`g` alone names the empty string)
    GroupName(String),
    /// Smoothing group: `s value` — recognized, semantically unused
    SmoothingGroup(String),
    /// Material library reference: `mtllib file.mtl` — recognized, never followed
    MaterialLib(String),
    /// Material selection: `usemtl name`
    UseMaterial(String),
}

/// The corner layout of one face directive.
///
/// Corners referencing no normal (`i` and `i/j` forms) are rejected at
/// parse time, so every variant here carries normal indices.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FaceSpec {
    /// Corners of the `i//k` form
    VertexNormal(Polygon<VertexNormalRef>),
    /// Corners of the `i/j/k` form
    VertexTextureNormal(Polygon<VertexTextureNormalRef>),
}

/// A face polygon: exactly three or exactly four corners.
/// Any other arity is a parse error, so it never reaches this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Polygon<C> {
    Triangle([C; 3]),
    Quad([C; 4]),
}

impl<C> Polygon<C> {
    /// Corners in source order
    #[inline]
    pub fn corners(&self) -> &[C] {
        match self {
            Polygon::Triangle(corners) => corners,
            Polygon::Quad(corners) => corners,
        }
    }
}

/// One `i//k` face corner: 1-based indices into the cumulative
/// position and normal tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexNormalRef {
    pub position: u32,
    pub normal: u32,
}

/// One `i/j/k` face corner: 1-based indices into the cumulative
/// position, texcoord, and normal tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexTextureNormalRef {
    pub position: u32,
    pub texture: u32,
    pub normal: u32,
}
