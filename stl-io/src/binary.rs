//! Binary STL parsing and serialization.
//!
//! # Format
//!
//! All multi-byte values are little-endian:
//!
//! ```text
//! UINT8[80]    – Header (free-form text, zero-padded)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (usually 0)
//! end
//! ```
//!
//! The 50-byte triangle records are not aligned; each one is assembled in a
//! fixed buffer and moved whole.

use std::io::{Read, Write};

use stl_types::{Mesh, Point3, Triangle, Vector3};
use tracing::debug;

use crate::error::{StlError, StlResult};
use crate::{effective_normal, normal_is_missing};

/// Binary STL header size in bytes.
pub const HEADER_SIZE: usize = 80;

/// Size of one triangle record (normal + 3 vertices + attribute).
pub const TRIANGLE_SIZE: usize = 50;

/// Parse a binary STL from a reader.
///
/// The mesh name is recovered from the 80-byte header, with trailing NULs
/// and whitespace padding trimmed. Each record's attribute byte count is
/// read and discarded. With `compute_missing_normals` set, a record whose
/// stored normal is (near) zero gets the geometric right-hand normal.
///
/// # Errors
///
/// Returns an error if the header, the triangle count, or any of the
/// declared triangle records cannot be read in full.
///
/// # Example
///
/// ```
/// use stl_types::{Mesh, Point3, Triangle};
///
/// let mut mesh = Mesh::new("demo");
/// mesh.triangles.push(Triangle::from_vertices(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ));
///
/// let mut bytes = Vec::new();
/// stl_io::binary::serialize(&mut bytes, &mesh, "demo header", 0).unwrap();
///
/// let back = stl_io::binary::parse(bytes.as_slice(), true).unwrap();
/// assert_eq!(back.name, "demo header");
/// assert_eq!(back.triangle_count(), 1);
/// ```
pub fn parse<R: Read>(mut reader: R, compute_missing_normals: bool) -> StlResult<Mesh> {
    let mut header = [0u8; HEADER_SIZE];
    reader
        .read_exact(&mut header)
        .map_err(|source| StlError::TruncatedHeader { source })?;

    let mut count_buf = [0u8; 4];
    reader
        .read_exact(&mut count_buf)
        .map_err(|source| StlError::TruncatedCount { source })?;
    let triangle_count = u32::from_le_bytes(count_buf);

    let header_text = String::from_utf8_lossy(&header);
    let name = header_text.trim_end_matches(['\0', ' ', '\t', '\r', '\n']);
    let mut mesh = Mesh::with_capacity(name, triangle_count as usize);

    let mut record = [0u8; TRIANGLE_SIZE];
    for _ in 0..triangle_count {
        reader
            .read_exact(&mut record)
            .map_err(|source| StlError::TruncatedTriangleData { source })?;

        let mut triangle = Triangle::new(
            read_normal(&record[0..12]),
            [
                read_point(&record[12..24]),
                read_point(&record[24..36]),
                read_point(&record[36..48]),
            ],
        );
        // record[48..50] is the attribute byte count; nothing to keep

        if compute_missing_normals && normal_is_missing(&triangle.normal) {
            triangle.normal = triangle.face_normal();
        }
        mesh.triangles.push(triangle);
    }

    debug!(
        triangles = mesh.triangle_count(),
        name = %mesh.name,
        "Parsed binary STL"
    );
    Ok(mesh)
}

/// Parse a binary STL from an in-memory buffer.
///
/// # Errors
///
/// Same conditions as [`parse`].
pub fn parse_bytes(bytes: &[u8], compute_missing_normals: bool) -> StlResult<Mesh> {
    parse(bytes, compute_missing_normals)
}

/// Serialize a mesh as binary STL into a writer.
///
/// `header` is truncated to 80 bytes and zero-padded; it is free-form text
/// and does not need to match the mesh name. `attribute_byte_count` is
/// stamped verbatim on every record. A facet whose stored normal is (near)
/// zero is written with its geometric normal instead.
///
/// Writing fails fast: nothing after the first short write is attempted.
///
/// # Errors
///
/// Returns [`StlError::TooManyTriangles`] if the mesh exceeds the format's
/// 32-bit triangle count, or an I/O error if a write fails.
pub fn serialize<W: Write>(
    writer: &mut W,
    mesh: &Mesh,
    header: &str,
    attribute_byte_count: u16,
) -> StlResult<()> {
    let triangle_count =
        u32::try_from(mesh.triangle_count()).map_err(|_| StlError::TooManyTriangles {
            count: mesh.triangle_count(),
        })?;

    let mut header_buf = [0u8; HEADER_SIZE];
    let text = header.as_bytes();
    let len = text.len().min(HEADER_SIZE);
    header_buf[..len].copy_from_slice(&text[..len]);
    writer.write_all(&header_buf)?;
    writer.write_all(&triangle_count.to_le_bytes())?;

    let mut record = [0u8; TRIANGLE_SIZE];
    for triangle in &mesh.triangles {
        let normal = effective_normal(triangle);
        let [v0, v1, v2] = triangle.vertices;
        let values = [
            normal.x, normal.y, normal.z, v0.x, v0.y, v0.z, v1.x, v1.y, v1.z, v2.x, v2.y, v2.z,
        ];
        for (i, value) in values.iter().enumerate() {
            record[i * 4..i * 4 + 4].copy_from_slice(&value.to_le_bytes());
        }
        record[48..50].copy_from_slice(&attribute_byte_count.to_le_bytes());
        writer.write_all(&record)?;
    }

    debug!(
        triangles = triangle_count,
        attribute_byte_count, "Serialized binary STL"
    );
    Ok(())
}

/// Read a normal from 12 bytes (3 f32s, little-endian).
fn read_normal(buf: &[u8]) -> Vector3<f32> {
    Vector3::new(
        f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
        f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
    )
}

/// Read a vertex from 12 bytes (3 f32s, little-endian).
fn read_point(buf: &[u8]) -> Point3<f32> {
    Point3::new(
        f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
        f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn f32_at(buf: &[u8], offset: usize) -> f32 {
        f32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap())
    }

    fn two_triangle_mesh() -> Mesh {
        let mut mesh = Mesh::new("bin-mesh");
        mesh.triangles.push(Triangle::new(
            Vector3::new(0.0, 0.0, 1.0),
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        ));
        mesh.triangles.push(Triangle::new(
            Vector3::new(0.0, 0.0, 1.0),
            [
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
            ],
        ));
        mesh
    }

    #[test]
    fn roundtrip_two_triangles() {
        let mesh = two_triangle_mesh();

        let mut bytes = Vec::new();
        serialize(&mut bytes, &mesh, "Header: bin test", 0).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE + 4 + 2 * TRIANGLE_SIZE);

        let back = parse_bytes(&bytes, true).unwrap();
        // Name comes from the 80-byte header, not from mesh.name
        assert_eq!(back.name, "Header: bin test");
        assert_eq!(back.triangle_count(), 2);
        assert_eq!(back.triangles[0].vertices, mesh.triangles[0].vertices);
        assert_eq!(back.triangles[1].vertices, mesh.triangles[1].vertices);
        assert_eq!(back.triangles[0].normal, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(back.triangles[1].normal, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn output_layout_is_exact() {
        let mut mesh = Mesh::new("layout");
        mesh.triangles.push(Triangle::new(
            Vector3::new(0.0, 0.0, 1.0),
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        ));

        let mut bytes = Vec::new();
        serialize(&mut bytes, &mesh, "hdr", 0).unwrap();

        assert_eq!(bytes.len(), 134);
        assert_eq!(&bytes[0..3], b"hdr");
        assert!(bytes[3..HEADER_SIZE].iter().all(|&b| b == 0));
        assert_eq!(u32::from_le_bytes(bytes[80..84].try_into().unwrap()), 1);
        // normal z
        assert_eq!(f32_at(&bytes, 92), 1.0);
        // v1 x lives 12 bytes into the vertex block
        assert_eq!(f32_at(&bytes, 108), 1.0);
        // v2 y
        assert_eq!(f32_at(&bytes, 124), 1.0);
        // attribute byte count
        assert_eq!(&bytes[132..134], &[0, 0]);
    }

    #[test]
    fn attribute_bytes_are_stamped_and_ignored() {
        let mut mesh = Mesh::new("attr");
        mesh.triangles.push(Triangle::new(
            Vector3::new(1.0, 0.0, 0.0),
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
        ));

        let mut bytes = Vec::new();
        serialize(&mut bytes, &mesh, "attr-header", 2).unwrap();
        assert_eq!(&bytes[132..134], &2u16.to_le_bytes());

        let back = parse_bytes(&bytes, true).unwrap();
        assert_eq!(back.triangle_count(), 1);
        assert_eq!(back.triangles[0].normal, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn writer_computes_normal_if_zero() {
        let mut mesh = Mesh::new("nfix");
        mesh.triangles.push(Triangle::from_vertices(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ));

        let mut bytes = Vec::new();
        serialize(&mut bytes, &mesh, "", 0).unwrap();

        // Parse with completion disabled to observe the stored normal
        let back = parse_bytes(&bytes, false).unwrap();
        let normal = back.triangles[0].normal;
        assert_relative_eq!(normal.x, 0.0);
        assert_relative_eq!(normal.y, 0.0);
        assert_relative_eq!(normal.z, 1.0);
    }

    #[test]
    fn reader_computes_missing_normal_when_requested() {
        // Hand-built file: zero normal in the record
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes.extend_from_slice(&1u32.to_le_bytes());
        let mut record = [0u8; TRIANGLE_SIZE];
        for (i, value) in [
            0.0f32, 0.0, 0.0, // normal
            0.0, 0.0, 0.0, // v0
            1.0, 0.0, 0.0, // v1
            0.0, 1.0, 0.0, // v2
        ]
        .iter()
        .enumerate()
        {
            record[i * 4..i * 4 + 4].copy_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&record);

        let computed = parse_bytes(&bytes, true).unwrap();
        assert_relative_eq!(computed.triangles[0].normal.z, 1.0);

        let kept = parse_bytes(&bytes, false).unwrap();
        assert_eq!(kept.triangles[0].normal, Vector3::zeros());
    }

    #[test]
    fn header_longer_than_80_bytes_is_truncated() {
        let long_header = "x".repeat(100);
        let mesh = Mesh::new("t");

        let mut bytes = Vec::new();
        serialize(&mut bytes, &mesh, &long_header, 0).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE + 4);

        let back = parse_bytes(&bytes, true).unwrap();
        assert_eq!(back.name, "x".repeat(80));
    }

    #[test]
    fn empty_mesh_roundtrip() {
        let mesh = Mesh::new("empty");
        let mut bytes = Vec::new();
        serialize(&mut bytes, &mesh, "nothing here", 0).unwrap();

        let back = parse_bytes(&bytes, true).unwrap();
        assert_eq!(back.name, "nothing here");
        assert!(back.is_empty());
    }

    #[test]
    fn short_header_is_an_error() {
        let err = parse_bytes(b"short", true).unwrap_err();
        assert_eq!(err.to_string(), "Binary STL: failed to read 80-byte header");
    }

    #[test]
    fn missing_count_is_an_error() {
        let bytes = vec![b'H'; HEADER_SIZE];
        let err = parse_bytes(&bytes, true).unwrap_err();
        assert_eq!(err.to_string(), "Binary STL: failed to read triangle count");
    }

    #[test]
    fn truncated_triangle_data_is_an_error() {
        // Count claims 2 triangles but only one record follows
        let mut bytes = vec![b'H'; HEADER_SIZE];
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; TRIANGLE_SIZE]);

        let err = parse_bytes(&bytes, true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Binary STL: unexpected EOF in triangle data"
        );
    }

    #[test]
    fn bulk_roundtrip_preserves_values_exactly() {
        let mut mesh = Mesh::new("bulk");
        for i in 0..128 {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32;
            mesh.triangles.push(Triangle::new(
                Vector3::new(0.0, 1.0, 0.0),
                [
                    Point3::new(x, 0.0, 0.0),
                    Point3::new(x, 1.0, 0.0),
                    Point3::new(x, 0.0, 1.0),
                ],
            ));
        }

        let mut bytes = Vec::new();
        serialize(&mut bytes, &mesh, "bulk", 0).unwrap();

        let back = parse_bytes(&bytes, true).unwrap();
        assert_eq!(back.triangle_count(), 128);
        assert_eq!(back.triangles[0].vertices[0], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(back.triangles[127].vertices[2], Point3::new(127.0, 0.0, 1.0));
        assert_relative_eq!(back.triangles[10].vertices[0].x, 10.0, epsilon = 1e-6);
    }
}
