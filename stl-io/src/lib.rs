//! STL file I/O.
//!
//! This crate reads and writes the STL (stereolithography) triangle-mesh
//! format in both of its variants:
//!
//! - [`ascii`] - the human-readable `solid ... endsolid` text form
//! - [`binary`] - the compact little-endian form with an 80-byte header
//!
//! [`parse`] autodetects the variant from the first bytes of a seekable
//! stream, and [`load_stl`]/[`save_stl`] wrap the codecs in path-level
//! conveniences.
//!
//! # Example
//!
//! ```no_run
//! use stl_io::{StlFormat, load_stl, save_stl};
//!
//! let mesh = load_stl("model.stl").unwrap();
//! println!("loaded {} triangles", mesh.triangle_count());
//!
//! save_stl(&mesh, "copy.stl", StlFormat::Binary).unwrap();
//! ```
//!
//! # Normals
//!
//! STL files carry a redundant per-facet normal that is frequently zeroed
//! or stale in the wild. Both parsers can replace a (near) zero stored
//! normal with the geometric right-hand normal (`compute_missing_normals`),
//! and both serializers always do, so written files stay friendly to strict
//! readers. [`ZERO_NORMAL_EPSILON`] is the threshold for "missing"; facets
//! whose geometric normal is itself undefined (degenerate) keep the zero
//! vector.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod ascii;
pub mod binary;
mod detect;
mod error;

pub use detect::{detect_format, parse};
pub use error::{StlError, StlResult};

// Re-export the data model for convenience
pub use stl_types::{Mesh, Point3, Triangle, Vector3};

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Sum-of-absolute-components threshold below which a stored facet normal
/// counts as missing.
pub const ZERO_NORMAL_EPSILON: f32 = 1e-20;

/// The two on-disk STL flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StlFormat {
    /// Text form: `solid ... facet normal ... endsolid`.
    Ascii,
    /// 80-byte header, `u32` triangle count, 50-byte records.
    Binary,
}

/// Load a mesh from an STL file, autodetecting the flavor.
///
/// Missing facet normals are computed from the vertices; use the codec
/// modules directly if zero normals should be kept as stored.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist or cannot be read
/// - The content is not valid STL in the detected flavor
///
/// # Example
///
/// ```no_run
/// use stl_io::load_stl;
///
/// let mesh = load_stl("model.stl").unwrap();
/// println!("loaded {} triangles", mesh.triangle_count());
/// ```
pub fn load_stl<P: AsRef<Path>>(path: P) -> StlResult<Mesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StlError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            StlError::Io(e)
        }
    })?;
    parse(BufReader::new(file), true)
}

/// Save a mesh to an STL file in the requested flavor.
///
/// ASCII output uses [`ascii::DEFAULT_FLOAT_PRECISION`] decimal places;
/// binary output gets a descriptive header and zero attribute bytes. Call
/// the codec modules directly to control precision, header text, or
/// attribute bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
///
/// # Example
///
/// ```no_run
/// use stl_io::{StlFormat, load_stl, save_stl};
///
/// let mesh = load_stl("input.stl").unwrap();
/// save_stl(&mesh, "output.stl", StlFormat::Ascii).unwrap();
/// ```
pub fn save_stl<P: AsRef<Path>>(mesh: &Mesh, path: P, format: StlFormat) -> StlResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    match format {
        StlFormat::Ascii => {
            ascii::serialize_into(&mut writer, mesh, ascii::DEFAULT_FLOAT_PRECISION)?;
        }
        StlFormat::Binary => {
            binary::serialize(&mut writer, mesh, "Binary STL generated by stl-io", 0)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// True when a stored normal is close enough to zero to count as absent.
pub(crate) fn normal_is_missing(normal: &Vector3<f32>) -> bool {
    normal.x.abs() + normal.y.abs() + normal.z.abs() < ZERO_NORMAL_EPSILON
}

/// The normal a writer emits: the stored one, or the geometric one when the
/// stored normal is missing.
pub(crate) fn effective_normal(triangle: &Triangle) -> Vector3<f32> {
    if normal_is_missing(&triangle.normal) {
        triangle.face_normal()
    } else {
        triangle.normal
    }
}
