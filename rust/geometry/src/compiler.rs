// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Directive-stream compiler
//!
//! Folds an ordered directive sequence into sealed meshes keyed by
//! group and material name. Vertices are deduplicated per mesh by their
//! source index tuple, quads are fan-split, and referential errors
//! abort the compile instead of producing sentinel geometry.

use nalgebra::{Point2, Point3, Vector3};
use obj_lite_core::{Directive, FaceSpec, Polygon, VertexNormalRef, VertexTextureNormalRef};
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};

use crate::error::{AttributeKind, Error, Result};
use crate::mesh::{
    GroupMap, Mesh, MeshData, NormalMappedVertex, Polyline, TexturedVertex, Vertex, DEFAULT_NAME,
};
use crate::tangent;

pub(crate) const LAYOUT_BASIC: &str = "position//normal";
pub(crate) const LAYOUT_TEXTURED: &str = "position/texture/normal";
pub(crate) const LAYOUT_NORMAL_MAPPED: &str = "position/texture/normal with tangents";

/// Compiler options
#[derive(Debug, Clone, Default)]
pub struct CompileConfig {
    /// Build the tangent-bearing layout for textured faces
    pub with_tangents: bool,
}

/// Fold a directive sequence into meshes grouped by group and material.
///
/// The default group and material are both named `"__default__"`; the
/// pair in effect at end of input always appears in the result, so an
/// all-comment document compiles to one empty mesh rather than an empty
/// map. The first referential or variant error aborts the compile.
pub fn compile(config: &CompileConfig, directives: &[Directive]) -> Result<GroupMap> {
    let mut state = CompileState::new(config.clone());
    for directive in directives {
        state.apply(directive)?;
    }
    Ok(state.finish())
}

/// Everything accumulated while folding one document
#[derive(Debug)]
pub(crate) struct CompileState {
    config: CompileConfig,
    positions: Vec<Point3<f32>>,
    texcoords: Vec<Point2<f32>>,
    normals: Vec<Vector3<f32>>,
    group: String,
    material: String,
    pending: Option<PendingMesh>,
    polylines: Vec<Polyline>,
    groups: GroupMap,
}

impl CompileState {
    pub(crate) fn new(config: CompileConfig) -> Self {
        Self {
            config,
            positions: Vec::new(),
            texcoords: Vec::new(),
            normals: Vec::new(),
            group: DEFAULT_NAME.to_string(),
            material: DEFAULT_NAME.to_string(),
            pending: None,
            polylines: Vec::new(),
            groups: GroupMap::default(),
        }
    }

    /// Meshes sealed so far
    pub(crate) fn completed(&self) -> &GroupMap {
        &self.groups
    }

    /// Apply one directive's effect
    pub(crate) fn apply(&mut self, directive: &Directive) -> Result<()> {
        match directive {
            Directive::Vertex(position) => self.positions.push(*position),
            Directive::VertexTexture(uv) => self.texcoords.push(*uv),
            Directive::VertexNormal(normal) => self.normals.push(*normal),
            Directive::ObjectName(name) | Directive::GroupName(name) => {
                self.seal();
                self.group = name.clone();
            }
            Directive::UseMaterial(name) => {
                self.seal();
                self.material = name.clone();
            }
            // Recognized but inert: no smoothing-group normal
            // recalculation, no material file loading.
            Directive::SmoothingGroup(_) | Directive::MaterialLib(_) => {}
            Directive::Polyline(indices) => self.polyline(indices)?,
            Directive::Face(spec) => self.face(spec)?,
        }
        Ok(())
    }

    /// Resolve a polyline's position indices now; it seals with whatever
    /// mesh the current group/material pair ends up with
    fn polyline(&mut self, indices: &[u32]) -> Result<()> {
        let tables = Tables {
            positions: &self.positions,
            texcoords: &self.texcoords,
            normals: &self.normals,
        };
        let mut points = Vec::with_capacity(indices.len());
        for &index in indices {
            points.push(tables.position(index)?);
        }
        // The parser guarantees at least two points.
        let rest = points.split_off(2.min(points.len()));
        let mut endpoints = points.into_iter();
        let (Some(first), Some(second)) = (endpoints.next(), endpoints.next()) else {
            return Ok(());
        };
        self.polylines.push(Polyline {
            first,
            second,
            rest,
        });
        Ok(())
    }

    fn face(&mut self, spec: &FaceSpec) -> Result<()> {
        let tables = Tables {
            positions: &self.positions,
            texcoords: &self.texcoords,
            normals: &self.normals,
        };
        match spec {
            FaceSpec::VertexNormal(polygon) => {
                let pending = self
                    .pending
                    .get_or_insert_with(|| PendingMesh::Basic(BasicBuilder::default()));
                let established = pending.layout();
                let PendingMesh::Basic(builder) = pending else {
                    return Err(Error::VariantConflict {
                        group: self.group.clone(),
                        material: self.material.clone(),
                        established,
                        found: LAYOUT_BASIC,
                    });
                };
                for triangle in triangulate(polygon) {
                    builder.triangle(&tables, triangle)?;
                }
            }
            FaceSpec::VertexTextureNormal(polygon) if self.config.with_tangents => {
                let pending = self
                    .pending
                    .get_or_insert_with(|| PendingMesh::NormalMapped(NormalMappedBuilder::default()));
                let established = pending.layout();
                let PendingMesh::NormalMapped(builder) = pending else {
                    return Err(Error::VariantConflict {
                        group: self.group.clone(),
                        material: self.material.clone(),
                        established,
                        found: LAYOUT_NORMAL_MAPPED,
                    });
                };
                for triangle in triangulate(polygon) {
                    builder.triangle(&tables, triangle)?;
                }
            }
            FaceSpec::VertexTextureNormal(polygon) => {
                let pending = self
                    .pending
                    .get_or_insert_with(|| PendingMesh::Textured(TexturedBuilder::default()));
                let established = pending.layout();
                let PendingMesh::Textured(builder) = pending else {
                    return Err(Error::VariantConflict {
                        group: self.group.clone(),
                        material: self.material.clone(),
                        established,
                        found: LAYOUT_TEXTURED,
                    });
                };
                for triangle in triangulate(polygon) {
                    builder.triangle(&tables, triangle)?;
                }
            }
        }
        Ok(())
    }

    /// Move the in-progress mesh (and any pending polylines) into the
    /// output map under the current group and material names
    fn seal(&mut self) {
        if self.pending.is_none() && self.polylines.is_empty() {
            return;
        }
        let polylines = std::mem::take(&mut self.polylines);
        let mesh = match self.pending.take() {
            Some(pending) => pending.into_mesh(polylines),
            // Polylines can exist with zero faces; they seal into an
            // otherwise empty position//normal mesh.
            None => Mesh::Basic(MeshData {
                vertices: Vec::new(),
                triangles: Vec::new(),
                polylines,
            }),
        };
        tracing::debug!(
            group = %self.group,
            material = %self.material,
            layout = mesh.layout(),
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            polylines = mesh.polylines().len(),
            "sealed mesh"
        );
        self.groups
            .entry(self.group.clone())
            .or_default()
            .insert(self.material.clone(), mesh);
    }

    /// End of input: seal whatever is open. The pair in effect always
    /// appears in the output, but an empty end-of-input seal never
    /// replaces a mesh that was already sealed for the same pair.
    pub(crate) fn finish(mut self) -> GroupMap {
        if self.pending.is_some() || !self.polylines.is_empty() {
            self.seal();
        } else {
            self.groups
                .entry(self.group.clone())
                .or_default()
                .entry(self.material.clone())
                .or_insert_with(|| Mesh::Basic(MeshData::new()));
        }
        self.groups
    }
}

/// Fan-split a polygon into output triangles. Corner order is reversed
/// relative to the source to produce the downstream winding convention:
/// (a,b,c) emits (c,b,a); (a,b,c,d) emits (c,b,a) and (c,a,d).
fn triangulate<C: Copy>(polygon: &Polygon<C>) -> SmallVec<[[C; 3]; 2]> {
    match polygon {
        Polygon::Triangle([a, b, c]) => smallvec![[*c, *b, *a]],
        Polygon::Quad([a, b, c, d]) => smallvec![[*c, *b, *a], [*c, *a, *d]],
    }
}

/// Cumulative attribute tables, addressed by 1-based directive indices
struct Tables<'a> {
    positions: &'a [Point3<f32>],
    texcoords: &'a [Point2<f32>],
    normals: &'a [Vector3<f32>],
}

impl Tables<'_> {
    fn position(&self, index: u32) -> Result<Point3<f32>> {
        lookup(self.positions, index, AttributeKind::Position)
    }

    fn texture(&self, index: u32) -> Result<Point2<f32>> {
        lookup(self.texcoords, index, AttributeKind::Texture)
    }

    fn normal(&self, index: u32) -> Result<Vector3<f32>> {
        lookup(self.normals, index, AttributeKind::Normal)
    }

    fn textured_vertex(&self, corner: VertexTextureNormalRef) -> Result<TexturedVertex> {
        Ok(TexturedVertex {
            position: self.position(corner.position)?,
            normal: self.normal(corner.normal)?,
            uv: self.texture(corner.texture)?,
        })
    }
}

/// 1-based to 0-based conversion happens here, at every lookup site.
/// Index 0 and forward references are errors, never clamped.
fn lookup<T: Copy>(table: &[T], index: u32, kind: AttributeKind) -> Result<T> {
    index
        .checked_sub(1)
        .and_then(|i| table.get(i as usize))
        .copied()
        .ok_or_else(|| Error::IndexOutOfRange {
            kind,
            index,
            len: table.len(),
        })
}

/// The in-progress mesh for the current group/material pair
#[derive(Debug)]
enum PendingMesh {
    Basic(BasicBuilder),
    Textured(TexturedBuilder),
    NormalMapped(NormalMappedBuilder),
}

impl PendingMesh {
    fn layout(&self) -> &'static str {
        match self {
            PendingMesh::Basic(_) => LAYOUT_BASIC,
            PendingMesh::Textured(_) => LAYOUT_TEXTURED,
            PendingMesh::NormalMapped(_) => LAYOUT_NORMAL_MAPPED,
        }
    }

    fn into_mesh(self, polylines: Vec<Polyline>) -> Mesh {
        match self {
            PendingMesh::Basic(builder) => Mesh::Basic(MeshData {
                vertices: builder.vertices,
                triangles: builder.triangles,
                polylines,
            }),
            PendingMesh::Textured(builder) => Mesh::Textured(MeshData {
                vertices: builder.vertices,
                triangles: builder.triangles,
                polylines,
            }),
            PendingMesh::NormalMapped(builder) => builder.into_mesh(polylines),
        }
    }
}

#[derive(Debug, Default)]
struct BasicBuilder {
    vertices: Vec<Vertex>,
    triangles: Vec<[u32; 3]>,
    seen: FxHashMap<VertexNormalRef, u32>,
}

impl BasicBuilder {
    fn triangle(&mut self, tables: &Tables<'_>, corners: [VertexNormalRef; 3]) -> Result<()> {
        let mut indices = [0u32; 3];
        for (slot, corner) in indices.iter_mut().zip(corners) {
            *slot = self.corner(tables, corner)?;
        }
        self.triangles.push(indices);
        Ok(())
    }

    /// Get-or-insert: a repeated index pair reuses its output vertex
    fn corner(&mut self, tables: &Tables<'_>, corner: VertexNormalRef) -> Result<u32> {
        if let Some(&index) = self.seen.get(&corner) {
            return Ok(index);
        }
        let vertex = Vertex {
            position: tables.position(corner.position)?,
            normal: tables.normal(corner.normal)?,
        };
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        self.seen.insert(corner, index);
        Ok(index)
    }
}

#[derive(Debug, Default)]
struct TexturedBuilder {
    vertices: Vec<TexturedVertex>,
    triangles: Vec<[u32; 3]>,
    seen: FxHashMap<VertexTextureNormalRef, u32>,
}

impl TexturedBuilder {
    fn triangle(
        &mut self,
        tables: &Tables<'_>,
        corners: [VertexTextureNormalRef; 3],
    ) -> Result<()> {
        let mut indices = [0u32; 3];
        for (slot, corner) in indices.iter_mut().zip(corners) {
            *slot = self.corner(tables, corner)?;
        }
        self.triangles.push(indices);
        Ok(())
    }

    fn corner(&mut self, tables: &Tables<'_>, corner: VertexTextureNormalRef) -> Result<u32> {
        if let Some(&index) = self.seen.get(&corner) {
            return Ok(index);
        }
        let vertex = tables.textured_vertex(corner)?;
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        self.seen.insert(corner, index);
        Ok(index)
    }
}

#[derive(Debug, Default)]
struct NormalMappedBuilder {
    vertices: Vec<TexturedVertex>,
    /// Accumulated (sdir, tdir) per vertex, parallel to `vertices`;
    /// reduced to 4-component tangents when the mesh seals
    basis: Vec<(Vector3<f32>, Vector3<f32>)>,
    triangles: Vec<[u32; 3]>,
    seen: FxHashMap<VertexTextureNormalRef, u32>,
}

impl NormalMappedBuilder {
    fn triangle(
        &mut self,
        tables: &Tables<'_>,
        corners: [VertexTextureNormalRef; 3],
    ) -> Result<()> {
        // Attribute resolution comes first so the whole triangle's
        // tangent basis is known before any corner is deduplicated.
        let resolved = [
            tables.textured_vertex(corners[0])?,
            tables.textured_vertex(corners[1])?,
            tables.textured_vertex(corners[2])?,
        ];
        let (sdir, tdir) = tangent::basis(
            [
                resolved[0].position,
                resolved[1].position,
                resolved[2].position,
            ],
            [resolved[0].uv, resolved[1].uv, resolved[2].uv],
        );

        let mut indices = [0u32; 3];
        for ((slot, corner), vertex) in indices.iter_mut().zip(corners).zip(resolved) {
            *slot = match self.seen.get(&corner) {
                Some(&index) => {
                    // Shared corner: tangents smooth across adjoining faces.
                    let (s, t) = &mut self.basis[index as usize];
                    *s += sdir;
                    *t += tdir;
                    index
                }
                None => {
                    let index = self.vertices.len() as u32;
                    self.vertices.push(vertex);
                    self.basis.push((sdir, tdir));
                    self.seen.insert(corner, index);
                    index
                }
            };
        }
        self.triangles.push(indices);
        Ok(())
    }

    fn into_mesh(self, polylines: Vec<Polyline>) -> Mesh {
        let vertices = self
            .vertices
            .into_iter()
            .zip(self.basis)
            .map(|(vertex, (sdir, tdir))| NormalMappedVertex {
                position: vertex.position,
                normal: vertex.normal,
                uv: vertex.uv,
                tangent: tangent::finalize(vertex.normal, sdir, tdir),
            })
            .collect();
        Mesh::NormalMapped(MeshData {
            vertices,
            triangles: self.triangles,
            polylines,
        })
    }
}
