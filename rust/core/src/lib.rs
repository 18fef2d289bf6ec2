// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # OBJ-Lite Core Parser
//!
//! Wavefront OBJ directive parser built with [nom](https://docs.rs/nom).
//! Turns OBJ text into a typed directive stream for mesh assembly.
//!
//! ## Overview
//!
//! This crate provides the parsing half of OBJ-Lite:
//!
//! - **Line Grammar**: one typed [`Directive`] per non-blank,
//!   non-comment line
//! - **Document Parsing**: fail-fast parse of a whole document into an
//!   ordered directive sequence
//! - **Positional Errors**: line, column, source text, and the
//!   attempted alternatives for every failure
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use obj_lite_core::{parse_document, parse_line, Directive};
//!
//! let directive = parse_line("v 0.1 -0.2 0.3")?;
//! assert!(matches!(directive, Directive::Vertex(_)));
//!
//! let directives = parse_document("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n")?;
//! assert_eq!(directives.len(), 5);
//! ```
//!
//! ## Supported Directives
//!
//! `v`, `vt`, `vn`, `f` (3- or 4-corner, `i//k` and `i/j/k` forms),
//! `l`, `o`, `g`, `s`, `usemtl`, `mtllib`. Face corners without normal
//! indices are rejected: downstream assembly needs a normal per corner
//! and this parser reports that early, with a distinct error.
//!
//! Material libraries are recognized syntactically but never loaded —
//! no filesystem access happens here.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for the directive types

pub mod directive;
pub mod error;
pub mod parser;

pub use directive::{Directive, FaceSpec, Polygon, VertexNormalRef, VertexTextureNormalRef};
pub use error::{ErrorKind, ParseError, Result};
pub use parser::{
    is_skippable, parse_document, parse_line, parse_numbered_line, DIRECTIVE_KEYWORDS,
};
