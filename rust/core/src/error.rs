// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parse error type with positional context

use thiserror::Error;

/// Result type for parsing operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// A parse failure with enough context to render a diagnostic.
///
/// Line and column are 1-based. `source_line` is the offending line
/// exactly as it appeared in the document, comment included. Any
/// stylized rendering beyond the derived `Display` is the caller's job.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, column {column}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub source_line: String,
    pub kind: ErrorKind,
}

/// What went wrong on the offending line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No directive keyword matched; lists the alternatives that were tried
    #[error("expected one of: {}", .0.join(", "))]
    ExpectedDirective(&'static [&'static str]),

    /// A directive payload token was missing or malformed
    #[error("expected {0}")]
    Expected(&'static str),

    /// `i` or `i/j` face corners: the assembler requires normals on every corner
    #[error(
        "face corner `{corner}` has no normal index; faces without precomputed normals are not supported"
    )]
    MissingNormals { corner: String },

    /// Corners of one face mix reference forms
    #[error("face corners mix reference forms")]
    MixedFaceForms,

    /// A face must have exactly 3 or exactly 4 corners
    #[error("a face needs exactly 3 or 4 corners, found {found}")]
    FaceArity { found: usize },

    /// A polyline must reference at least two points
    #[error("a polyline needs at least 2 points, found {found}")]
    PolylineArity { found: usize },

    /// Well-formed directive followed by something that is not a comment
    #[error("unexpected trailing characters")]
    TrailingContent,
}
