//! Named triangle mesh.

use crate::Triangle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangle soup with a model name.
///
/// This is the in-memory form of an STL file: STL stores independent facets
/// with no shared-vertex topology, so the mesh is just a name plus a flat
/// list of triangles.
///
/// The name comes from the `solid` line of an ASCII file or the 80-byte
/// header of a binary file, and may be empty.
///
/// # Example
///
/// ```
/// use stl_types::{Mesh, Point3, Triangle};
///
/// let mut mesh = Mesh::new("bracket");
/// mesh.triangles.push(Triangle::from_vertices(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ));
///
/// assert_eq!(mesh.name, "bracket");
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    /// Model name, possibly empty.
    pub name: String,

    /// Facets in file order.
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Create a new empty mesh with the given name.
    ///
    /// # Example
    ///
    /// ```
    /// use stl_types::Mesh;
    ///
    /// let mesh = Mesh::new("part");
    /// assert!(mesh.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            triangles: Vec::new(),
        }
    }

    /// Create an empty mesh with pre-allocated triangle capacity.
    ///
    /// # Example
    ///
    /// ```
    /// use stl_types::Mesh;
    ///
    /// let mesh = Mesh::with_capacity("part", 1024);
    /// assert!(mesh.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            triangles: Vec::with_capacity(capacity),
        }
    }

    /// Number of triangles in the mesh.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check whether the mesh contains no triangles.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}
