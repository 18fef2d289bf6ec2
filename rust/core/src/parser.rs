// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ directive parser using nom
//!
//! One directive per line. The document-level entry point skips blank
//! and comment-only lines and fails fast on the first malformed line.

use nalgebra::{Point2, Point3, Vector3};
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit0, digit1, one_of},
    combinator::{map, map_res, opt, recognize},
    multi::fold_many1,
    sequence::{pair, preceded, tuple},
    IResult,
};
use smallvec::SmallVec;

use crate::directive::{Directive, FaceSpec, Polygon, VertexNormalRef, VertexTextureNormalRef};
use crate::error::{ErrorKind, ParseError, Result};

/// Directive keywords in the order they are tried against a line
pub const DIRECTIVE_KEYWORDS: &[&str] = &[
    "vt", "vn", "v", "f", "l", "o", "g", "s", "usemtl", "mtllib",
];

/// True for lines the document-level parse ignores: `^\s*$` and `^\s*#.*$`
#[inline]
pub fn is_skippable(line: &str) -> bool {
    let rest = line.trim_start();
    rest.is_empty() || rest.starts_with('#')
}

/// Parse a whole document into its ordered directive sequence.
///
/// Skippable lines are dropped; the first malformed line aborts the
/// parse with no partial result. Both `\n` and `\r\n` terminate lines.
pub fn parse_document(text: &str) -> Result<Vec<Directive>> {
    let mut directives = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if is_skippable(line) {
            continue;
        }
        directives.push(parse_numbered_line(line, index + 1)?);
    }
    Ok(directives)
}

/// Parse a single line into a directive.
///
/// The caller is expected to have filtered skippable lines with
/// [`is_skippable`]; a blank or comment-only line fails here.
#[inline]
pub fn parse_line(line: &str) -> Result<Directive> {
    parse_numbered_line(line, 1)
}

/// [`parse_line`] with an explicit 1-based line number for diagnostics,
/// for callers that feed lines one at a time.
pub fn parse_numbered_line(line: &str, line_number: usize) -> Result<Directive> {
    // A bare trailing '\r' appears when the caller splits CRLF input on '\n'.
    let raw = line.strip_suffix('\r').unwrap_or(line);
    let body = strip_comment(raw).trim_end();
    let body = body.trim_start();
    let keyword_end = body
        .find(|c: char| c == ' ' || c == '\t')
        .unwrap_or(body.len());
    let (keyword, payload) = body.split_at(keyword_end);

    let ctx = LineContext { raw, line_number };
    match keyword {
        "vt" => ctx.vertex_texture(payload),
        "vn" => ctx.vertex_normal(payload),
        "v" => ctx.vertex(payload),
        "f" => ctx.face(payload),
        "l" => ctx.polyline(payload),
        "o" => Ok(Directive::ObjectName(name_of(payload))),
        "g" => Ok(Directive::GroupName(name_of(payload))),
        "s" => Ok(Directive::SmoothingGroup(name_of(payload))),
        "usemtl" => Ok(Directive::UseMaterial(name_of(payload))),
        "mtllib" => Ok(Directive::MaterialLib(name_of(payload))),
        _ => Err(ctx.error(body, ErrorKind::ExpectedDirective(DIRECTIVE_KEYWORDS))),
    }
}

/// Cut the line at the first '#' — comments run to end of line
#[inline]
fn strip_comment(line: &str) -> &str {
    match memchr::memchr(b'#', line.as_bytes()) {
        Some(position) => &line[..position],
        None => line,
    }
}

/// Name directives capture everything up to end-of-line/comment, trimmed.
/// `g` with no name is valid and yields the empty string.
#[inline]
fn name_of(payload: &str) -> String {
    payload
        .trim_matches(|c: char| c == ' ' || c == '\t')
        .to_string()
}

/// 1-based column of the suffix-slice `at` within `raw`
#[inline]
fn column_in(raw: &str, at: &str) -> usize {
    (at.as_ptr() as usize).saturating_sub(raw.as_ptr() as usize) + 1
}

/// One line being parsed, with the context needed to report errors
struct LineContext<'a> {
    raw: &'a str,
    line_number: usize,
}

impl<'a> LineContext<'a> {
    fn error(&self, at: &str, kind: ErrorKind) -> ParseError {
        ParseError {
            line: self.line_number,
            column: column_in(self.raw, at),
            source_line: self.raw.to_string(),
            kind,
        }
    }

    /// Lift a nom result, mapping failure to `expected` at the failing column
    fn run<T>(&self, parsed: IResult<&'a str, T>, expected: &'static str) -> Result<(T, &'a str)> {
        match parsed {
            Ok((rest, value)) => Ok((value, rest)),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                Err(self.error(e.input, ErrorKind::Expected(expected)))
            }
            Err(nom::Err::Incomplete(_)) => Err(self.error(
                &self.raw[self.raw.len()..],
                ErrorKind::Expected(expected),
            )),
        }
    }

    /// Accept the directive if only whitespace remains on the line
    fn done(&self, rest: &str, directive: Directive) -> Result<Directive> {
        let rest = rest.trim_start_matches(|c: char| c == ' ' || c == '\t');
        if rest.is_empty() {
            Ok(directive)
        } else {
            Err(self.error(rest, ErrorKind::TrailingContent))
        }
    }

    fn vertex(&self, payload: &'a str) -> Result<Directive> {
        let (xyz, rest) = self.run(triple(payload), "three floats")?;
        self.done(rest, Directive::Vertex(Point3::from(xyz)))
    }

    fn vertex_texture(&self, payload: &'a str) -> Result<Directive> {
        let (uv, rest) = self.run(texture_payload(payload), "two floats")?;
        self.done(rest, Directive::VertexTexture(Point2::from(uv)))
    }

    fn vertex_normal(&self, payload: &'a str) -> Result<Directive> {
        let (xyz, rest) = self.run(triple(payload), "three floats")?;
        // Unit length is established here, never deferred to the assembler.
        self.done(rest, Directive::VertexNormal(Vector3::from(xyz).normalize()))
    }

    fn face(&self, payload: &'a str) -> Result<Directive> {
        let (corners, rest) = self.run(corner_list(payload), "face corner")?;
        if corners.len() < 3 || corners.len() > 4 {
            return Err(self.error(payload, ErrorKind::FaceArity { found: corners.len() }));
        }
        if corners.iter().all(|corner| corner.normal.is_none()) {
            return Err(self.error(
                payload,
                ErrorKind::MissingNormals {
                    corner: corner_text(&corners[0]),
                },
            ));
        }
        let spec = if corners[0].texture.is_some() {
            FaceSpec::VertexTextureNormal(self.textured_polygon(payload, &corners)?)
        } else {
            FaceSpec::VertexNormal(self.plain_polygon(payload, &corners)?)
        };
        self.done(rest, Directive::Face(spec))
    }

    fn plain_polygon(&self, at: &str, corners: &[RawCorner]) -> Result<Polygon<VertexNormalRef>> {
        let mut refs = SmallVec::<[VertexNormalRef; 4]>::new();
        for corner in corners {
            let Some(normal) = corner.normal else {
                return Err(self.error(at, ErrorKind::MixedFaceForms));
            };
            if corner.texture.is_some() {
                return Err(self.error(at, ErrorKind::MixedFaceForms));
            }
            refs.push(VertexNormalRef {
                position: corner.position,
                normal,
            });
        }
        self.polygon_of(at, &refs)
    }

    fn textured_polygon(
        &self,
        at: &str,
        corners: &[RawCorner],
    ) -> Result<Polygon<VertexTextureNormalRef>> {
        let mut refs = SmallVec::<[VertexTextureNormalRef; 4]>::new();
        for corner in corners {
            let (Some(texture), Some(normal)) = (corner.texture, corner.normal) else {
                return Err(self.error(at, ErrorKind::MixedFaceForms));
            };
            refs.push(VertexTextureNormalRef {
                position: corner.position,
                texture,
                normal,
            });
        }
        self.polygon_of(at, &refs)
    }

    fn polygon_of<C: Copy>(&self, at: &str, refs: &[C]) -> Result<Polygon<C>> {
        match refs {
            [a, b, c] => Ok(Polygon::Triangle([*a, *b, *c])),
            [a, b, c, d] => Ok(Polygon::Quad([*a, *b, *c, *d])),
            other => Err(self.error(at, ErrorKind::FaceArity { found: other.len() })),
        }
    }

    fn polyline(&self, payload: &'a str) -> Result<Directive> {
        let (indices, rest) = self.run(index_list(payload), "position index")?;
        if indices.len() < 2 {
            return Err(self.error(
                payload,
                ErrorKind::PolylineArity {
                    found: indices.len(),
                },
            ));
        }
        self.done(rest, Directive::Polyline(indices))
    }
}

/// One face corner as written, before the reference form is validated
#[derive(Debug, Clone, Copy)]
struct RawCorner {
    position: u32,
    texture: Option<u32>,
    normal: Option<u32>,
}

/// Render a corner the way it appeared in the source, for diagnostics
fn corner_text(corner: &RawCorner) -> String {
    match corner.texture {
        Some(texture) => format!("{}/{}", corner.position, texture),
        None => corner.position.to_string(),
    }
}

/// Run of one-or-more spaces/tabs — the token separator
fn space(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c == ' ' || c == '\t')(input)
}

/// Signed decimal/exponent float literal: `1`, `1.`, `.5`, `-0.2`, `1.5E-10`
fn float_literal(input: &str) -> IResult<&str, f32> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| fast_float::parse::<f32, _>(s),
    )(input)
}

/// 1-based table index
fn index(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| lexical_core::parse::<u32>(s.as_bytes()))(input)
}

/// Two space-led floats
fn double(input: &str) -> IResult<&str, [f32; 2]> {
    map(
        pair(preceded(space, float_literal), preceded(space, float_literal)),
        |(x, y)| [x, y],
    )(input)
}

/// Three space-led floats
fn triple(input: &str) -> IResult<&str, [f32; 3]> {
    map(
        tuple((
            preceded(space, float_literal),
            preceded(space, float_literal),
            preceded(space, float_literal),
        )),
        |(x, y, z)| [x, y, z],
    )(input)
}

/// `vt` payload: two floats, with a third (depth) committed to only when
/// a numeric token actually follows, then discarded
fn texture_payload(input: &str) -> IResult<&str, [f32; 2]> {
    map(
        pair(double, opt(preceded(space, float_literal))),
        |(uv, _depth)| uv,
    )(input)
}

/// One corner: `i`, `i/j`, `i//k`, or `i/j/k`
fn corner(input: &str) -> IResult<&str, RawCorner> {
    map(
        tuple((
            index,
            opt(preceded(char('/'), opt(index))),
            opt(preceded(char('/'), index)),
        )),
        |(position, texture, normal)| RawCorner {
            position,
            texture: texture.flatten(),
            normal,
        },
    )(input)
}

/// Space-led corners; stops cleanly before trailing content
fn corner_list(input: &str) -> IResult<&str, SmallVec<[RawCorner; 4]>> {
    fold_many1(preceded(space, corner), SmallVec::new, |mut acc, c| {
        acc.push(c);
        acc
    })(input)
}

/// Space-led 1-based indices for `l`
fn index_list(input: &str) -> IResult<&str, Vec<u32>> {
    fold_many1(preceded(space, index), Vec::new, |mut acc, i| {
        acc.push(i);
        acc
    })(input)
}
