//! ASCII STL parsing and serialization.
//!
//! # Format
//!
//! ```text
//! solid name
//!   facet normal ni nj nk
//!     outer loop
//!       vertex v1x v1y v1z
//!       vertex v2x v2y v2z
//!       vertex v3x v3y v3z
//!     endloop
//!   endfacet
//!   ...
//! endsolid name
//! ```
//!
//! Keywords are matched case-insensitively and whitespace is flexible, but
//! the structure is enforced strictly: a misplaced keyword, a fourth vertex,
//! or a malformed number fails the parse with a line-numbered error rather
//! than producing a silently wrong mesh.

use std::io::{Read, Write};

use stl_types::{Mesh, Point3, Triangle, Vector3};
use tracing::debug;

use crate::error::{StlError, StlResult};
use crate::{effective_normal, normal_is_missing};

/// Decimal places written by the serializer when callers have no preference.
pub const DEFAULT_FLOAT_PRECISION: usize = 6;

/// Position within the `facet .. endfacet` grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    HaveFacet,
    InLoop,
    HaveV1,
    HaveV2,
}

/// Parse an ASCII STL from a text buffer.
///
/// Facets are accumulated in file order. With `compute_missing_normals` set,
/// a facet whose stored normal is (near) zero gets the geometric right-hand
/// normal instead; otherwise the zero normal is kept as-is.
///
/// Parsing stops at the first `endsolid`, so trailing content after it is
/// never inspected. A missing `endsolid` is tolerated as long as the input
/// does not end in the middle of a facet.
///
/// # Errors
///
/// Returns an error describing the first grammar or number-format violation,
/// with its 1-based line number.
///
/// # Example
///
/// ```
/// let text = r#"solid tri
///   facet normal 0 0 1
///     outer loop
///       vertex 0 0 0
///       vertex 1 0 0
///       vertex 0 1 0
///     endloop
///   endfacet
/// endsolid tri
/// "#;
///
/// let mesh = stl_io::ascii::parse(text, true).unwrap();
/// assert_eq!(mesh.name, "tri");
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
#[allow(clippy::too_many_lines)]
pub fn parse(text: &str, compute_missing_normals: bool) -> StlResult<Mesh> {
    let mut mesh = Mesh::default();
    let mut in_solid = false;
    let mut current = Triangle::default();
    let mut phase = Phase::Idle;
    let mut vertex_count = 0usize;

    for (index, raw_line) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        // Header: solid [name...]
        if !in_solid {
            if !tokens[0].eq_ignore_ascii_case("solid") {
                return Err(StlError::ExpectedSolid { line });
            }
            mesh.name = tokens[1..].join(" ");
            in_solid = true;
            continue;
        }

        match tokens[0].to_lowercase().as_str() {
            // endsolid [name...] - the trailing name is not checked
            "endsolid" => {
                in_solid = false;
                break;
            }
            "facet" => {
                if tokens.len() < 2 || !tokens[1].eq_ignore_ascii_case("normal") {
                    return Err(StlError::UnexpectedFacet { line });
                }
                if phase != Phase::Idle {
                    return Err(StlError::UnexpectedFacet { line });
                }
                let [x, y, z] = parse_three_floats(&tokens[2..], line)?;
                current.normal = Vector3::new(x, y, z);
                phase = Phase::HaveFacet;
            }
            "outer" => {
                if tokens.len() < 2 || !tokens[1].eq_ignore_ascii_case("loop") {
                    return Err(StlError::UnexpectedContent {
                        line,
                        text: trimmed.to_string(),
                    });
                }
                if phase != Phase::HaveFacet {
                    return Err(StlError::LoopWithoutFacet { line });
                }
                phase = Phase::InLoop;
                vertex_count = 0;
            }
            "vertex" => {
                if !matches!(phase, Phase::InLoop | Phase::HaveV1 | Phase::HaveV2) {
                    return Err(StlError::VertexOutsideLoop { line });
                }
                let [x, y, z] = parse_three_floats(&tokens[1..], line)?;
                match vertex_count {
                    0 => {
                        current.vertices[0] = Point3::new(x, y, z);
                        phase = Phase::HaveV1;
                    }
                    1 => {
                        current.vertices[1] = Point3::new(x, y, z);
                        phase = Phase::HaveV2;
                    }
                    // Third vertex completes the loop; phase stays HaveV2
                    2 => current.vertices[2] = Point3::new(x, y, z),
                    _ => return Err(StlError::TooManyVertices { line }),
                }
                vertex_count += 1;
            }
            "endloop" => {
                if vertex_count != 3 {
                    return Err(StlError::IncompleteLoop { line });
                }
            }
            "endfacet" => {
                if vertex_count != 3 || phase != Phase::HaveV2 {
                    return Err(StlError::IncompleteFacet { line });
                }
                if compute_missing_normals && normal_is_missing(&current.normal) {
                    current.normal = current.face_normal();
                }
                mesh.triangles.push(current);
                current = Triangle::default();
                phase = Phase::Idle;
            }
            // Some exporters repeat the solid line; take the latest name
            "solid" => {
                mesh.name = tokens[1..].join(" ");
            }
            _ => {
                return Err(StlError::UnexpectedContent {
                    line,
                    text: trimmed.to_string(),
                });
            }
        }
    }

    if in_solid && phase != Phase::Idle {
        return Err(StlError::UnterminatedFacet);
    }

    debug!(
        triangles = mesh.triangle_count(),
        name = %mesh.name,
        "Parsed ASCII STL"
    );
    Ok(mesh)
}

/// Parse an ASCII STL from a reader.
///
/// Reads the whole stream, then parses it like [`parse`]. Byte sequences
/// that are not valid UTF-8 are replaced rather than rejected, so files with
/// odd bytes in the name line still load.
///
/// # Errors
///
/// Returns an error if reading fails or the text violates the grammar.
pub fn parse_reader<R: Read>(mut reader: R, compute_missing_normals: bool) -> StlResult<Mesh> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse(&String::from_utf8_lossy(&bytes), compute_missing_normals)
}

/// Serialize a mesh to an ASCII STL string.
///
/// Coordinates are written in fixed-point notation with `float_precision`
/// decimal places. A facet whose stored normal is (near) zero is written
/// with its geometric normal instead, keeping the output friendly to strict
/// readers.
///
/// # Example
///
/// ```
/// use stl_io::ascii::{serialize, DEFAULT_FLOAT_PRECISION};
/// use stl_types::{Mesh, Point3, Triangle};
///
/// let mut mesh = Mesh::new("tri");
/// mesh.triangles.push(Triangle::from_vertices(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ));
///
/// let text = serialize(&mesh, DEFAULT_FLOAT_PRECISION);
/// assert!(text.starts_with("solid tri\n"));
/// assert!(text.contains("facet normal 0.000000 0.000000 1.000000"));
/// ```
#[must_use]
pub fn serialize(mesh: &Mesh, float_precision: usize) -> String {
    let mut out = String::with_capacity((mesh.triangle_count() * 160).max(128));
    out.push_str("solid ");
    out.push_str(&mesh.name);
    out.push('\n');

    for triangle in &mesh.triangles {
        let normal = effective_normal(triangle);
        let [v0, v1, v2] = triangle.vertices;

        out.push_str("  facet normal ");
        out.push_str(&format_triple(normal.x, normal.y, normal.z, float_precision));
        out.push('\n');
        out.push_str("    outer loop\n");
        for v in [v0, v1, v2] {
            out.push_str("      vertex ");
            out.push_str(&format_triple(v.x, v.y, v.z, float_precision));
            out.push('\n');
        }
        out.push_str("    endloop\n");
        out.push_str("  endfacet\n");
    }

    out.push_str("endsolid ");
    out.push_str(&mesh.name);
    out.push('\n');

    debug!(
        triangles = mesh.triangle_count(),
        precision = float_precision,
        "Serialized ASCII STL"
    );
    out
}

/// Serialize a mesh as ASCII STL into a writer.
///
/// # Errors
///
/// Returns an error if writing fails. Output already written stays written;
/// the caller owns cleanup of partial files.
pub fn serialize_into<W: Write>(
    writer: &mut W,
    mesh: &Mesh,
    float_precision: usize,
) -> StlResult<()> {
    writer.write_all(serialize(mesh, float_precision).as_bytes())?;
    Ok(())
}

/// Parse the first three tokens as `f32`, full-token strict.
///
/// Extra tokens beyond the third are ignored, matching what most STL
/// emitters and readers do.
fn parse_three_floats(tokens: &[&str], line: usize) -> StlResult<[f32; 3]> {
    if tokens.len() < 3 {
        return Err(StlError::ExpectedThreeFloats { line });
    }
    let mut values = [0.0f32; 3];
    for (value, token) in values.iter_mut().zip(tokens) {
        *value = token.parse().map_err(|_| StlError::InvalidNumber {
            line,
            token: (*token).to_string(),
        })?;
    }
    Ok(values)
}

/// Format three coordinates in fixed-point notation.
fn format_triple(x: f32, y: f32, z: f32, precision: usize) -> String {
    format!("{x:.precision$} {y:.precision$} {z:.precision$}")
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::unnecessary_raw_string_hashes
)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> Triangle {
        Triangle::new(
            Vector3::new(0.0, 0.0, 1.0),
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        )
    }

    #[test]
    fn parse_minimal_two_triangle_solid() {
        let text = r#"solid sample_cube
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 1 0 0
      vertex 1 1 0
      vertex 0 1 0
    endloop
  endfacet
endsolid sample_cube
"#;
        let mesh = parse(text, true).unwrap();
        assert_eq!(mesh.name, "sample_cube");
        assert_eq!(mesh.triangle_count(), 2);
        for triangle in &mesh.triangles {
            assert_relative_eq!(triangle.normal.z, 1.0);
        }
        assert_eq!(mesh.triangles[0].vertices[1], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.triangles[1].vertices[1], Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn missing_normal_computed_when_requested() {
        let text = r#"solid n/a
  facet normal 0 0 0
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid
"#;
        let mesh = parse(text, true).unwrap();
        let normal = mesh.triangles[0].normal;
        assert_relative_eq!(normal.x, 0.0);
        assert_relative_eq!(normal.y, 0.0);
        assert_relative_eq!(normal.z, 1.0);
    }

    #[test]
    fn missing_normal_kept_when_disabled() {
        let text = r#"solid n/a
  facet normal 0 0 0
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid
"#;
        let mesh = parse(text, false).unwrap();
        assert_eq!(mesh.triangles[0].normal, Vector3::zeros());
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let text = "SoLiD  name   \n  Facet   Normal   0   0   1\n    OUTER     LOOP\n      VERTEX 0 0 0\n      vertex 1 0 0\n      vertex 0 1 0\n    ENDLOOP\n  ENdFaCeT\nEnDsOlId name\n";
        let mesh = parse(text, true).unwrap();
        assert_eq!(mesh.name, "name");
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn name_tokens_rejoin_with_single_spaces() {
        let mesh = parse("solid  my   spaced    name\nendsolid\n", true).unwrap();
        assert_eq!(mesh.name, "my spaced name");
    }

    #[test]
    fn bare_solid_line_gives_empty_name() {
        let mesh = parse("solid\nendsolid\n", true).unwrap();
        assert_eq!(mesh.name, "");
        assert!(mesh.is_empty());
    }

    #[test]
    fn repeated_solid_line_updates_name() {
        let text = "solid first\nsolid second\nendsolid second\n";
        let mesh = parse(text, true).unwrap();
        assert_eq!(mesh.name, "second");
    }

    #[test]
    fn endsolid_stops_parsing() {
        let text = r#"solid s
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid s
this trailing garbage is never inspected
"#;
        let mesh = parse(text, true).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn endsolid_inside_open_facet_stops_cleanly() {
        // Matches permissive readers: endsolid wins over an open facet,
        // returning only the completed triangles.
        let text = r#"solid s
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
endsolid s
"#;
        let mesh = parse(text, true).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn graceful_eof_without_endsolid() {
        let text = r#"solid loose
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
"#;
        let mesh = parse(text, true).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn eof_inside_facet_is_an_error() {
        let text = "solid s\n  facet normal 0 0 1\n    outer loop\n      vertex 0 0 0\n";
        let err = parse(text, true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected EOF: unterminated facet/loop"
        );
    }

    #[test]
    fn empty_input_is_an_empty_mesh() {
        let mesh = parse("", true).unwrap();
        assert_eq!(mesh.name, "");
        assert!(mesh.is_empty());
    }

    #[test]
    fn missing_solid_header_is_an_error() {
        let err = parse("facet normal 0 0 1\n", true).unwrap_err();
        assert_eq!(err.to_string(), "Line 1: expected 'solid'");
    }

    #[test]
    fn vertex_outside_loop_is_an_error() {
        let text = "solid bad\n  vertex 0 0 0\nendsolid bad\n";
        let err = parse(text, true).unwrap_err();
        assert_eq!(err.to_string(), "Line 2: 'vertex' outside of loop");
    }

    #[test]
    fn nested_facet_is_an_error() {
        let text = "solid bad\n  facet normal 0 0 1\n  facet normal 0 0 1\n";
        let err = parse(text, true).unwrap_err();
        assert_eq!(err.to_string(), "Line 3: 'facet' where not expected");
    }

    #[test]
    fn facet_without_normal_keyword_is_an_error() {
        let text = "solid bad\n  facet 0 0 1\n";
        let err = parse(text, true).unwrap_err();
        assert!(err.to_string().contains("'facet' where not expected"));
    }

    #[test]
    fn outer_without_loop_is_an_error() {
        let text = "solid bad\n  facet normal 0 0 1\n    outer ring\n";
        let err = parse(text, true).unwrap_err();
        assert_eq!(err.to_string(), "Line 3: unexpected content: 'outer ring'");
    }

    #[test]
    fn outer_loop_without_facet_is_an_error() {
        let text = "solid bad\n    outer loop\n";
        let err = parse(text, true).unwrap_err();
        assert_eq!(err.to_string(), "Line 2: 'outer loop' without facet");
    }

    #[test]
    fn endloop_before_three_vertices_is_an_error() {
        let text = r#"solid bad
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
    endloop
  endfacet
endsolid bad
"#;
        let err = parse(text, true).unwrap_err();
        assert_eq!(err.to_string(), "Line 6: 'endloop' before three vertices");
    }

    #[test]
    fn fourth_vertex_is_an_error() {
        let text = r#"solid bad
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
      vertex 1 1 0
"#;
        let err = parse(text, true).unwrap_err();
        assert_eq!(err.to_string(), "Line 7: too many vertices in loop");
    }

    #[test]
    fn endfacet_without_complete_triangle_is_an_error() {
        let text = "solid bad\n  facet normal 0 0 1\n    outer loop\n      vertex 0 0 0\n  endfacet\n";
        let err = parse(text, true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Line 5: 'endfacet' without complete triangle"
        );
    }

    #[test]
    fn garbage_line_is_an_error() {
        let text = "solid s\n  nonsense here\nendsolid s\n";
        let err = parse(text, true).unwrap_err();
        assert_eq!(err.to_string(), "Line 2: unexpected content: 'nonsense here'");
    }

    #[test]
    fn short_coordinate_list_is_an_error() {
        let text = "solid s\n  facet normal 0 0\n";
        let err = parse(text, true).unwrap_err();
        assert_eq!(err.to_string(), "Line 2: Expected three floats");
    }

    #[test]
    fn malformed_float_is_an_error() {
        let text = r#"solid s
  facet normal 0 0Z 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid s
"#;
        let err = parse(text, true).unwrap_err();
        assert_eq!(err.to_string(), "Line 2: Failed to parse number: '0Z'");
    }

    #[test]
    fn extra_tokens_after_coordinates_are_ignored() {
        let text = r#"solid s
  facet normal 0 0 1 trailing words
    outer loop
      vertex 0 0 0 9
      vertex 1 0 0 9
      vertex 0 1 0 9
    endloop
  endfacet
endsolid s
"#;
        let mesh = parse(text, true).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn error_line_numbers_count_blank_lines() {
        let text = "solid s\n\n\n  vertex 0 0 0\n";
        let err = parse(text, true).unwrap_err();
        assert_eq!(err.to_string(), "Line 4: 'vertex' outside of loop");
    }

    #[test]
    fn crlf_input_parses() {
        let text = "solid s\r\n  facet normal 0 0 1\r\n    outer loop\r\n      vertex 0 0 0\r\n      vertex 1 0 0\r\n      vertex 0 1 0\r\n    endloop\r\n  endfacet\r\nendsolid s\r\n";
        let mesh = parse(text, true).unwrap();
        assert_eq!(mesh.name, "s");
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn parse_reader_matches_parse() {
        let text = "solid s\n  facet normal 0 0 1\n    outer loop\n      vertex 0 0 0\n      vertex 1 0 0\n      vertex 0 1 0\n    endloop\n  endfacet\nendsolid s\n";
        let from_reader = parse_reader(text.as_bytes(), true).unwrap();
        let from_str = parse(text, true).unwrap();
        assert_eq!(from_reader, from_str);
    }

    #[test]
    fn serialize_layout_is_stable() {
        let mut mesh = Mesh::new("rt");
        mesh.triangles.push(unit_triangle());

        let expected = concat!(
            "solid rt\n",
            "  facet normal 0.000000 0.000000 1.000000\n",
            "    outer loop\n",
            "      vertex 0.000000 0.000000 0.000000\n",
            "      vertex 1.000000 0.000000 0.000000\n",
            "      vertex 0.000000 1.000000 0.000000\n",
            "    endloop\n",
            "  endfacet\n",
            "endsolid rt\n",
        );
        assert_eq!(serialize(&mesh, DEFAULT_FLOAT_PRECISION), expected);
    }

    #[test]
    fn serialize_empty_mesh() {
        let mesh = Mesh::new("hollow");
        assert_eq!(serialize(&mesh, 6), "solid hollow\nendsolid hollow\n");
    }

    #[test]
    fn serialize_precision_control() {
        let mut mesh = Mesh::new("p");
        mesh.triangles.push(Triangle::new(
            Vector3::new(0.0, 0.0, 1.0),
            [
                Point3::new(0.123_456_78, 0.0, 0.0),
                Point3::new(0.0, 0.123_456_78, 0.0),
                Point3::new(0.0, 0.0, 0.123_456_78),
            ],
        ));

        let s3 = serialize(&mesh, 3);
        assert!(s3.contains("0.123"));
        assert!(!s3.contains("0.1234"));

        let s1 = serialize(&mesh, 1);
        assert!(s1.contains("vertex 0.1 0.0 0.0"));
    }

    #[test]
    fn serializer_computes_normal_when_zero() {
        let mut mesh = Mesh::new("nfix");
        let mut triangle = unit_triangle();
        triangle.normal = Vector3::zeros();
        mesh.triangles.push(triangle);

        let text = serialize(&mesh, 6);
        assert!(text.contains("facet normal 0.000000 0.000000 1.000000"));
    }

    #[test]
    fn serializer_keeps_zero_normal_for_degenerate_facet() {
        // Collinear vertices: the geometric normal is itself zero, so the
        // zero vector is written unchanged.
        let mut mesh = Mesh::new("degen");
        mesh.triangles.push(Triangle::from_vertices(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ));

        let text = serialize(&mesh, 6);
        assert!(text.contains("facet normal 0.000000 0.000000 0.000000"));
    }

    #[test]
    fn roundtrip_preserves_geometry() {
        let mut mesh = Mesh::new("rt");
        mesh.triangles.push(Triangle::new(
            Vector3::new(0.0, 0.0, 1.0),
            [
                Point3::new(0.25, -1.5, 3.125),
                Point3::new(1.0, 0.5, -2.75),
                Point3::new(-0.125, 1.0, 0.0),
            ],
        ));

        let text = serialize(&mesh, DEFAULT_FLOAT_PRECISION);
        let back = parse(&text, true).unwrap();
        assert_eq!(back.name, "rt");
        assert_eq!(back.triangle_count(), 1);
        for (a, b) in back.triangles[0]
            .vertices
            .iter()
            .zip(&mesh.triangles[0].vertices)
        {
            assert_relative_eq!(a.x, b.x, epsilon = 1e-6);
            assert_relative_eq!(a.y, b.y, epsilon = 1e-6);
            assert_relative_eq!(a.z, b.z, epsilon = 1e-6);
        }
    }

    #[test]
    fn serialize_into_writes_same_bytes() {
        let mut mesh = Mesh::new("w");
        mesh.triangles.push(unit_triangle());

        let mut buf = Vec::new();
        serialize_into(&mut buf, &mesh, 6).unwrap();
        assert_eq!(buf, serialize(&mesh, 6).into_bytes());
    }
}
