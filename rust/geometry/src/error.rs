// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use thiserror::Error;

/// Result type for mesh assembly operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while folding directives into meshes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A face or polyline referenced a table slot that does not exist
    /// (yet): OBJ indices are 1-based and may only point backwards.
    #[error("{kind} index {index} is out of range: {len} declared so far")]
    IndexOutOfRange {
        kind: AttributeKind,
        index: u32,
        len: usize,
    },

    /// A face's corner layout disagrees with the layout established by
    /// the first face of the same group/material mesh
    #[error(
        "group {group:?}, material {material:?}: a {found} face cannot extend a {established} mesh"
    )]
    VariantConflict {
        group: String,
        material: String,
        established: &'static str,
        found: &'static str,
    },

    /// Core parser error surfaced through the incremental driver
    #[error("parse error: {0}")]
    Parse(#[from] obj_lite_core::ParseError),
}

/// Which attribute table an index failed to resolve against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    Texture,
    Normal,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Position => write!(f, "position"),
            AttributeKind::Texture => write!(f, "texture coordinate"),
            AttributeKind::Normal => write!(f, "normal"),
        }
    }
}
