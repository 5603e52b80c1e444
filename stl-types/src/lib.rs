//! Core mesh types for STL processing.
//!
//! This crate provides the data model shared by the STL codecs:
//!
//! - [`Triangle`] - A single facet: one normal plus exactly three vertices
//! - [`Mesh`] - A named, flat collection of triangles
//!
//! # Precision
//!
//! All coordinates are `f32`, matching the width of the STL wire format in
//! both its ASCII and binary variants. The library is unit-agnostic.
//!
//! # Coordinate System
//!
//! STL assumes a **right-handed coordinate system** with
//! **counter-clockwise (CCW) winding** when a facet is viewed from outside.
//! [`Triangle::face_normal`] follows the right-hand rule accordingly.
//!
//! # Example
//!
//! ```
//! use stl_types::{Mesh, Point3, Triangle};
//!
//! let mut mesh = Mesh::new("wedge");
//! mesh.triangles.push(Triangle::from_vertices(
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ));
//!
//! assert_eq!(mesh.triangle_count(), 1);
//! assert!(!mesh.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod mesh;
mod triangle;

// Re-export core types
pub use mesh::Mesh;
pub use triangle::Triangle;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
