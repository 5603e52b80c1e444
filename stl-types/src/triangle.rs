//! Triangle facet type.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single STL facet: a normal vector and exactly three vertices.
///
/// The fixed-size vertex array makes the "exactly three vertices per facet"
/// rule a compile-time property rather than a runtime check.
///
/// The stored normal is whatever the source file carried. It may be zero,
/// unnormalized, or inconsistent with the winding; the codecs decide when to
/// replace it with the geometric [`face_normal`](Self::face_normal).
///
/// # Example
///
/// ```
/// use stl_types::{Point3, Triangle, Vector3};
///
/// let tri = Triangle::from_vertices(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
///
/// // Normal defaults to zero; the geometric normal points in +Z
/// assert_eq!(tri.normal, Vector3::zeros());
/// assert!((tri.face_normal().z - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    /// Facet normal as stored in the file.
    pub normal: Vector3<f32>,
    /// The three corner vertices, in winding order.
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    /// Create a triangle from an explicit normal and three vertices.
    ///
    /// # Example
    ///
    /// ```
    /// use stl_types::{Point3, Triangle, Vector3};
    ///
    /// let tri = Triangle::new(
    ///     Vector3::new(0.0, 0.0, 1.0),
    ///     [
    ///         Point3::new(0.0, 0.0, 0.0),
    ///         Point3::new(1.0, 0.0, 0.0),
    ///         Point3::new(0.0, 1.0, 0.0),
    ///     ],
    /// );
    /// assert_eq!(tri.normal.z, 1.0);
    /// ```
    #[inline]
    #[must_use]
    pub const fn new(normal: Vector3<f32>, vertices: [Point3<f32>; 3]) -> Self {
        Self { normal, vertices }
    }

    /// Create a triangle from three vertices with a zero normal.
    ///
    /// Useful when the normal is unknown and should be computed later.
    #[inline]
    #[must_use]
    pub fn from_vertices(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self {
            normal: Vector3::zeros(),
            vertices: [v0, v1, v2],
        }
    }

    /// Compute the geometric unit normal via the right-hand rule.
    ///
    /// The cross product of the edges `v1 - v0` and `v2 - v0` is normalized
    /// when its length is positive. Degenerate triangles (collinear or
    /// coincident vertices) yield the zero vector rather than NaN.
    ///
    /// # Example
    ///
    /// ```
    /// use stl_types::{Point3, Triangle, Vector3};
    ///
    /// let tri = Triangle::from_vertices(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// );
    /// assert!((tri.face_normal().z - 1.0).abs() < 1e-6);
    ///
    /// // Collinear vertices have no well-defined normal
    /// let degen = Triangle::from_vertices(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(2.0, 0.0, 0.0),
    /// );
    /// assert_eq!(degen.face_normal(), Vector3::zeros());
    /// ```
    #[must_use]
    pub fn face_normal(&self) -> Vector3<f32> {
        let e1 = self.vertices[1] - self.vertices[0];
        let e2 = self.vertices[2] - self.vertices[0];
        let n = e1.cross(&e2);
        let len = n.norm();
        if len > 0.0 {
            n / len
        } else {
            n
        }
    }
}

impl Default for Triangle {
    #[inline]
    fn default() -> Self {
        Self {
            normal: Vector3::zeros(),
            vertices: [Point3::origin(); 3],
        }
    }
}
