//! Error types for STL I/O operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for STL I/O operations.
pub type StlResult<T> = Result<T, StlError>;

/// Errors that can occur while reading or writing STL data.
///
/// ASCII variants carry the 1-based line number of the offending input line.
/// Binary variants that wrap a read failure keep it as a `source` so callers
/// can distinguish truncation from genuine device errors.
#[derive(Debug, Error)]
pub enum StlError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// ASCII input did not begin with a `solid` line.
    #[error("Line {line}: expected 'solid'")]
    ExpectedSolid {
        /// 1-based line number.
        line: usize,
    },

    /// `facet` appeared while a previous facet was still open, or the
    /// `normal` keyword was missing.
    #[error("Line {line}: 'facet' where not expected")]
    UnexpectedFacet {
        /// 1-based line number.
        line: usize,
    },

    /// `outer loop` appeared without an open facet.
    #[error("Line {line}: 'outer loop' without facet")]
    LoopWithoutFacet {
        /// 1-based line number.
        line: usize,
    },

    /// `vertex` appeared outside an open loop.
    #[error("Line {line}: 'vertex' outside of loop")]
    VertexOutsideLoop {
        /// 1-based line number.
        line: usize,
    },

    /// A fourth `vertex` appeared inside one loop.
    #[error("Line {line}: too many vertices in loop")]
    TooManyVertices {
        /// 1-based line number.
        line: usize,
    },

    /// `endloop` appeared before three vertices were read.
    #[error("Line {line}: 'endloop' before three vertices")]
    IncompleteLoop {
        /// 1-based line number.
        line: usize,
    },

    /// `endfacet` appeared without a complete triangle.
    #[error("Line {line}: 'endfacet' without complete triangle")]
    IncompleteFacet {
        /// 1-based line number.
        line: usize,
    },

    /// Fewer than three numeric fields where a coordinate triple was
    /// required.
    #[error("Line {line}: Expected three floats")]
    ExpectedThreeFloats {
        /// 1-based line number.
        line: usize,
    },

    /// A numeric field failed to parse as `f32`.
    #[error("Line {line}: Failed to parse number: '{token}'")]
    InvalidNumber {
        /// 1-based line number.
        line: usize,
        /// The offending token, verbatim.
        token: String,
    },

    /// A line started with an unrecognized keyword, or a recognized keyword
    /// was malformed beyond repair.
    #[error("Line {line}: unexpected content: '{text}'")]
    UnexpectedContent {
        /// 1-based line number.
        line: usize,
        /// The offending line, verbatim.
        text: String,
    },

    /// ASCII input ended inside an unterminated facet or loop.
    #[error("Unexpected EOF: unterminated facet/loop")]
    UnterminatedFacet,

    /// The 80-byte binary header could not be read in full.
    #[error("Binary STL: failed to read 80-byte header")]
    TruncatedHeader {
        /// Underlying read failure.
        #[source]
        source: std::io::Error,
    },

    /// The 4-byte binary triangle count could not be read in full.
    #[error("Binary STL: failed to read triangle count")]
    TruncatedCount {
        /// Underlying read failure.
        #[source]
        source: std::io::Error,
    },

    /// The binary stream ended inside the triangle records.
    #[error("Binary STL: unexpected EOF in triangle data")]
    TruncatedTriangleData {
        /// Underlying read failure.
        #[source]
        source: std::io::Error,
    },

    /// Mesh exceeds the 32-bit triangle count of the binary format.
    #[error("mesh has {count} triangles, which exceeds the binary STL limit of 4294967295")]
    TooManyTriangles {
        /// Number of triangles in the mesh.
        count: usize,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
