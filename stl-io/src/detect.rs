//! Content-based STL format detection.

use std::io::{Read, Seek, SeekFrom};

use stl_types::Mesh;
use tracing::debug;

use crate::error::{StlError, StlResult};
use crate::{StlFormat, ascii, binary};

/// Probe length: the literal bytes `solid ` that open an ASCII file.
const PROBE_LEN: usize = 6;

/// Detect the STL flavor by peeking at the first bytes of the stream.
///
/// The stream position is saved, the first six bytes are inspected, and the
/// position is restored; the probe consumes nothing as far as the caller can
/// tell. Streams shorter than six bytes classify as binary and fail later
/// with a header error.
///
/// The comparison is against the exact bytes `solid ` and is deliberately
/// case-sensitive even though the ASCII grammar itself is not: real-world
/// files are lowercase here, and a binary file whose header happens to spell
/// `SOLID` in uppercase must not be routed to the text parser.
///
/// # Errors
///
/// Returns an error if reading or seeking fails.
pub fn detect_format<R: Read + Seek>(reader: &mut R) -> StlResult<StlFormat> {
    let start = reader.stream_position()?;

    let mut probe = [0u8; PROBE_LEN];
    let filled = match reader.read_exact(&mut probe) {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => false,
        Err(e) => return Err(StlError::Io(e)),
    };
    reader.seek(SeekFrom::Start(start))?;

    let format = if filled && &probe == b"solid " {
        StlFormat::Ascii
    } else {
        StlFormat::Binary
    };
    debug!(?format, "Detected STL flavor");
    Ok(format)
}

/// Parse an STL of either flavor, autodetecting which.
///
/// See [`detect_format`] for how the flavor is chosen; the stream is then
/// handed to [`ascii::parse_reader`] or [`binary::parse`] from its original
/// position.
///
/// # Errors
///
/// Returns an error if detection I/O fails or the selected parser rejects
/// the content.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
///
/// let text = "solid probe\nendsolid probe\n";
/// let mesh = stl_io::parse(Cursor::new(text), true).unwrap();
/// assert_eq!(mesh.name, "probe");
/// ```
pub fn parse<R: Read + Seek>(mut reader: R, compute_missing_normals: bool) -> StlResult<Mesh> {
    match detect_format(&mut reader)? {
        StlFormat::Ascii => ascii::parse_reader(reader, compute_missing_normals),
        StlFormat::Binary => binary::parse(reader, compute_missing_normals),
    }
}
