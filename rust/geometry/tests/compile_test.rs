// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs;
use std::path::PathBuf;

use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3, Vector4};
use obj_lite_core::parse_document;
use obj_lite_geometry::{
    compile, CompileConfig, Driver, GroupMap, Mesh, DEFAULT_NAME,
};

fn compile_text(config: &CompileConfig, text: &str) -> GroupMap {
    let directives = parse_document(text).expect("document should parse");
    compile(config, &directives).expect("document should compile")
}

fn default_mesh(groups: &GroupMap) -> &Mesh {
    &groups[DEFAULT_NAME][DEFAULT_NAME]
}

#[test]
fn test_dedup_shared_corners() {
    // Two triangles share the corners 1//1 and 3//1: the mesh has one
    // output vertex per distinct index pair, not per corner occurrence.
    let text = concat!(
        "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n",
        "vn 0 0 1\n",
        "f 1//1 2//1 3//1\n",
        "f 1//1 3//1 4//1\n",
    );
    let groups = compile_text(&CompileConfig::default(), text);
    let mesh = default_mesh(&groups);
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
}

#[test]
fn test_triangle_winding_is_reversed() {
    let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
    let groups = compile_text(&CompileConfig::default(), text);
    let Mesh::Basic(data) = default_mesh(&groups) else {
        panic!("expected a position//normal mesh");
    };

    // Corners are emitted in reversed order (c, b, a): vertex 0 is the
    // third corner of the face.
    assert_eq!(data.triangles, vec![[0, 1, 2]]);
    assert_eq!(data.vertices[0].position, Point3::new(0.0, 1.0, 0.0));
    assert_eq!(data.vertices[1].position, Point3::new(1.0, 0.0, 0.0));
    assert_eq!(data.vertices[2].position, Point3::new(0.0, 0.0, 0.0));
}

#[test]
fn test_quad_fan_split() {
    let text = concat!(
        "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n",
        "vn 0 0 1\n",
        "f 1//1 2//1 3//1 4//1\n",
    );
    let groups = compile_text(&CompileConfig::default(), text);
    let Mesh::Basic(data) = default_mesh(&groups) else {
        panic!("expected a position//normal mesh");
    };

    // The quad (a,b,c,d) splits into (c,b,a) and (c,a,d). Vertices are
    // assigned in first-encounter order: c, b, a, then d.
    assert_eq!(data.triangles, vec![[0, 1, 2], [0, 2, 3]]);
    assert_eq!(data.vertices.len(), 4);
    assert_eq!(data.vertices[0].position, Point3::new(1.0, 1.0, 0.0)); // c
    assert_eq!(data.vertices[1].position, Point3::new(1.0, 0.0, 0.0)); // b
    assert_eq!(data.vertices[2].position, Point3::new(0.0, 0.0, 0.0)); // a
    assert_eq!(data.vertices[3].position, Point3::new(0.0, 1.0, 0.0)); // d
}

#[test]
fn test_polylines_without_faces() {
    let text = concat!(
        "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n",
        "l 1 2\n",
        "l 3 4\n",
    );
    let groups = compile_text(&CompileConfig::default(), text);
    let mesh = default_mesh(&groups);

    assert_eq!(mesh.vertex_count(), 0);
    assert_eq!(mesh.triangle_count(), 0);
    let polylines = mesh.polylines();
    assert_eq!(polylines.len(), 2);

    assert_eq!(polylines[0].first, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(polylines[0].second, Point3::new(1.0, 0.0, 0.0));
    assert!(polylines[0].rest.is_empty());

    assert_eq!(polylines[1].first, Point3::new(1.0, 1.0, 0.0));
    assert_eq!(polylines[1].second, Point3::new(0.0, 1.0, 0.0));
    assert!(polylines[1].rest.is_empty());
}

#[test]
fn test_polyline_rest_tail() {
    let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nl 1 2 3\n";
    let groups = compile_text(&CompileConfig::default(), text);
    let polylines = default_mesh(&groups).polylines();
    assert_eq!(polylines.len(), 1);
    assert_eq!(polylines[0].point_count(), 3);
    assert_eq!(polylines[0].rest, vec![Point3::new(1.0, 1.0, 0.0)]);
}

#[test]
fn test_polyline_index_out_of_range() {
    let directives = parse_document("v 0 0 0\nl 1 2\n").unwrap();
    let err = compile(&CompileConfig::default(), &directives).unwrap_err();
    assert!(matches!(
        err,
        obj_lite_geometry::Error::IndexOutOfRange { index: 2, len: 1, .. }
    ));
}

#[test]
fn test_polylines_seal_with_their_group() {
    // Polylines accumulated before a group switch stay with the
    // outgoing group instead of leaking into the next one.
    let text = concat!(
        "v 0 0 0\nv 1 0 0\n",
        "l 1 2\n",
        "g next\n",
        "v 0 1 0\n",
        "l 1 3\n",
    );
    let groups = compile_text(&CompileConfig::default(), text);
    assert_eq!(groups[DEFAULT_NAME][DEFAULT_NAME].polylines().len(), 1);
    assert_eq!(groups["next"][DEFAULT_NAME].polylines().len(), 1);
}

#[test]
fn test_textured_without_tangents_is_textured_layout() {
    let text = concat!(
        "v 0 0 0\nv 1 0 0\nv 0 1 0\n",
        "vt 0 0\nvt 1 0\nvt 0 1\n",
        "vn 0 0 1\n",
        "f 1/1/1 2/2/1 3/3/1\n",
    );
    let groups = compile_text(&CompileConfig::default(), text);
    let Mesh::Textured(data) = default_mesh(&groups) else {
        panic!("expected a textured mesh");
    };
    assert_eq!(data.vertices.len(), 3);
    // Vertex 0 is corner c = 3/3/1.
    assert_eq!(data.vertices[0].uv, nalgebra::Point2::new(0.0, 1.0));
}

#[test]
fn test_incremental_equivalence() {
    let text = concat!(
        "# mixed document\n",
        "mtllib scene.mtl\n",
        "v 1.0 1.0 -1.0\nv 1.0 -1.0 -1.0\nv 1.0 1.0 1.0\nv 1.0 -1.0 1.0\n",
        "vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n",
        "vn 1 0 0\nvn 0 0 1\n",
        "g side\n",
        "usemtl steel\n",
        "f 2/1/1 1/2/1 3/3/1 4/4/1\n",
        "l 1 2 3\n",
        "g rim\n",
        "s off\n",
        "f 4/1/2 3/2/2 1/3/2\n",
        "\n",
    );
    let config = CompileConfig { with_tangents: true };
    let expected = compile_text(&config, text);

    for step_size in [1, 2, 3, 7, 1000] {
        let mut driver = Driver::start(&config, text);
        let result = loop {
            driver = driver.step(step_size);
            if driver.is_finished() {
                break driver.into_result().unwrap();
            }
        };
        let groups = result.expect("incremental compile should succeed");
        assert_eq!(groups, expected, "step_size {step_size}");
    }
}

fn cube_fixture() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let path = PathBuf::from(manifest_dir)
        .join("tests")
        .join("obj")
        .join("cube.obj");
    fs::read_to_string(path).expect("cube fixture should exist")
}

#[test]
fn test_cube_fixture_textured() {
    let groups = compile_text(&CompileConfig::default(), &cube_fixture());
    assert_eq!(groups.len(), 1);
    let mesh = &groups["Cube"]["Material"];

    // 6 quads, every corner unique per face: 24 vertices, 12 triangles.
    assert_eq!(mesh.vertex_count(), 24);
    assert_eq!(mesh.triangle_count(), 12);
    assert!(matches!(mesh, Mesh::Textured(_)));
}

#[test]
fn test_cube_fixture_with_tangents() {
    let config = CompileConfig { with_tangents: true };
    let groups = compile_text(&config, &cube_fixture());
    let Mesh::NormalMapped(data) = &groups["Cube"]["Material"] else {
        panic!("expected a normal-mapped mesh");
    };

    assert_eq!(data.vertices.len(), 24);
    assert_eq!(data.triangles.len(), 12);

    // Every tangent is unit length, orthogonal to its normal, with a
    // +/-1 handedness component.
    for vertex in &data.vertices {
        let direction = Vector3::new(vertex.tangent.x, vertex.tangent.y, vertex.tangent.z);
        assert_relative_eq!(direction.norm(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(direction.dot(&vertex.normal), 0.0, epsilon = 1e-5);
        assert_eq!(vertex.tangent.w.abs(), 1.0);
    }

    // Top face (+Y): u runs toward -X in the fixture's uv layout, and
    // both fan triangles agree, so the accumulated tangent is exact.
    assert_eq!(data.vertices[0].position, Point3::new(-1.0, 1.0, 1.0));
    assert_eq!(data.vertices[0].normal, Vector3::new(0.0, 1.0, 0.0));
    assert_relative_eq!(
        data.vertices[0].tangent,
        Vector4::new(-1.0, 0.0, 0.0, 1.0)
    );
}

#[test]
fn test_object_groups_key_output() {
    let text = concat!(
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\n",
        "o First\n",
        "f 1//1 2//1 3//1\n",
        "o Second\n",
        "f 3//1 2//1 1//1\n",
    );
    let groups = compile_text(&CompileConfig::default(), text);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups["First"][DEFAULT_NAME].triangle_count(), 1);
    assert_eq!(groups["Second"][DEFAULT_NAME].triangle_count(), 1);
}
