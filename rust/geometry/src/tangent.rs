// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-triangle tangent space
//!
//! Solves the standard tangent/bitangent linear system from a
//! triangle's edge vectors and texture-coordinate deltas. Accumulated
//! pairs are reduced to a single 4-component tangent at mesh seal.

use nalgebra::{Point2, Point3, Vector3, Vector4};

/// Determinant magnitude at or below which the texture-space system is
/// treated as singular
const SINGULAR_DETERMINANT: f32 = 1e-6;

/// Reciprocal used in place of 1/det for singular systems. Inherited
/// approximation: it keeps tangents finite, not a derived bound.
const FALLBACK_RECIPROCAL: f32 = 0.1;

/// Tangent/bitangent directions of one triangle
pub(crate) fn basis(
    positions: [Point3<f32>; 3],
    uvs: [Point2<f32>; 3],
) -> (Vector3<f32>, Vector3<f32>) {
    let e1 = positions[1] - positions[0];
    let e2 = positions[2] - positions[0];
    let du1 = uvs[1].x - uvs[0].x;
    let dv1 = uvs[1].y - uvs[0].y;
    let du2 = uvs[2].x - uvs[0].x;
    let dv2 = uvs[2].y - uvs[0].y;

    let det = du1 * dv2 - du2 * dv1;
    let r = if det.abs() <= SINGULAR_DETERMINANT {
        FALLBACK_RECIPROCAL
    } else {
        1.0 / det
    };

    let sdir = (e1 * dv2 - e2 * dv1) * r;
    let tdir = (e2 * du1 - e1 * du2) * r;
    (sdir, tdir)
}

/// Reduce an accumulated (sdir, tdir) pair to the stored tangent:
/// Gram-Schmidt orthonormalized direction plus bitangent handedness in w
pub(crate) fn finalize(
    normal: Vector3<f32>,
    sdir: Vector3<f32>,
    tdir: Vector3<f32>,
) -> Vector4<f32> {
    let w = if normal.cross(&sdir).dot(&tdir) >= 0.0 {
        1.0
    } else {
        -1.0
    };
    let tangent = if sdir.norm_squared() > 0.0 {
        (sdir - normal * normal.dot(&sdir)).normalize()
    } else {
        (tdir - normal * normal.dot(&tdir)).normalize().cross(&normal)
    };
    Vector4::new(tangent.x, tangent.y, tangent.z, w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_basis_axis_aligned() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let uvs = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];

        let (sdir, tdir) = basis(positions, uvs);
        assert_relative_eq!(sdir, Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(tdir, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_basis_singular_uses_fallback_reciprocal() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        // det = 1e-4 * 1e-3 = 1e-7, at or below the singular threshold
        let uvs = [
            Point2::new(0.0, 0.0),
            Point2::new(1e-4, 0.0),
            Point2::new(0.0, 1e-3),
        ];

        let (sdir, tdir) = basis(positions, uvs);
        // sdir = (e1 * dv2 - e2 * dv1) * 0.1 = e1 * 1e-4
        assert_relative_eq!(sdir, Vector3::new(1e-4, 0.0, 0.0));
        // tdir = (e2 * du1 - e1 * du2) * 0.1 = e2 * 1e-5
        assert_relative_eq!(tdir, Vector3::new(0.0, 1e-5, 0.0));
    }

    #[test]
    fn test_basis_just_above_threshold_divides() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        // det = 1e-2 * 1e-3 = 1e-5, above the singular threshold
        let uvs = [
            Point2::new(0.0, 0.0),
            Point2::new(1e-2, 0.0),
            Point2::new(0.0, 1e-3),
        ];

        let (sdir, _) = basis(positions, uvs);
        // sdir = e1 * dv2 / det = e1 * 1e-3 / 1e-5 = e1 * 100
        assert_relative_eq!(sdir, Vector3::new(100.0, 0.0, 0.0), epsilon = 1e-2);
    }

    #[test]
    fn test_finalize_right_handed() {
        let normal = Vector3::new(0.0, 0.0, 1.0);
        let tangent = finalize(normal, Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(tangent, Vector4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_finalize_left_handed() {
        let normal = Vector3::new(0.0, 0.0, 1.0);
        let tangent = finalize(normal, Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        assert_relative_eq!(tangent, Vector4::new(1.0, 0.0, 0.0, -1.0));
    }

    #[test]
    fn test_finalize_orthonormalizes_against_normal() {
        let normal = Vector3::new(0.0, 0.0, 1.0);
        // sdir leans out of the surface plane; Gram-Schmidt removes the lean
        let tangent = finalize(normal, Vector3::new(1.0, 0.0, 0.5), Vector3::new(0.0, 1.0, 0.0));
        let direction = Vector3::new(tangent.x, tangent.y, tangent.z);
        assert_relative_eq!(direction, Vector3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(direction.dot(&normal), 0.0);
        assert_relative_eq!(direction.norm(), 1.0);
    }

    #[test]
    fn test_finalize_zero_sdir_falls_back_to_tdir() {
        let normal = Vector3::new(0.0, 0.0, 1.0);
        let tangent = finalize(normal, Vector3::zeros(), Vector3::new(0.0, 1.0, 0.0));
        // cross(normalize(tdir'), normal) with tdir' = (0, 1, 0)
        let direction = Vector3::new(tangent.x, tangent.y, tangent.z);
        assert_relative_eq!(direction, Vector3::new(1.0, 0.0, 0.0));
    }
}
