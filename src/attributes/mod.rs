//! Attribute payloads attached to vertices, faces, surfaces and submeshes.
//!
//! The topology kernel never looks inside an attribute bundle. It only calls
//! the operations of the [`Attributes`] trait, on whatever bundle types the
//! mesh's [`MeshTraits`] parameter selects.

mod bundles;

pub use bundles::{
    Normal, Position, PositionNormal, PositionNormalTexCoord, PositionNormalTexCoordTangent,
};

use std::fmt::Debug;

use crate::error::AttributeError;
use crate::math::{normal_matrix, Matrix3, Matrix4, Point2, Point3};

/// Operations the kernel performs on an attribute bundle.
pub trait Attributes: Clone + Debug {
    /// Transforms the bundle by a position matrix.
    ///
    /// The normal matrix is derived as the inverse transpose of the upper
    /// 3x3 block of `position_matrix`.
    fn transform(&mut self, position_matrix: &Matrix4) {
        self.transform_with_normals(position_matrix, &normal_matrix(position_matrix));
    }

    /// Transforms positions by `position_matrix`, and normals and tangents
    /// by `normal_matrix`.
    fn transform_with_normals(&mut self, position_matrix: &Matrix4, normal_matrix: &Matrix3);

    /// Adapts the bundle to a flipped winding order.
    ///
    /// Normals and tangents are negated, texture coordinates are remapped
    /// through `texcoord`.
    fn invert(&mut self, texcoord: &dyn Fn(Point2) -> Point2);

    /// Pushes every problem found in the bundle into `errors`.
    fn validate_into(&self, errors: &mut Vec<AttributeError>);

    /// Returns `true` if the bundle passes validation.
    fn validate(&self) -> bool {
        let mut errors = Vec::new();
        self.validate_into(&mut errors);
        errors.is_empty()
    }

    /// The position carried by the bundle, if any.
    fn position(&self) -> Option<Point3> {
        None
    }
}

/// The empty bundle, for entity kinds that carry no payload.
impl Attributes for () {
    fn transform_with_normals(&mut self, _: &Matrix4, _: &Matrix3) {}

    fn invert(&mut self, _: &dyn Fn(Point2) -> Point2) {}

    fn validate_into(&self, _: &mut Vec<AttributeError>) {}
}

/// Selects the attribute bundle of each entity kind.
pub trait MeshTraits: Debug + Clone + 'static {
    /// Payload of every vertex.
    type VertexAttributes: Attributes;
    /// Payload of every face.
    type FaceAttributes: Attributes;
    /// Payload of every surface.
    type SurfaceAttributes: Attributes;
    /// Payload of every submesh.
    type SubmeshAttributes: Attributes;

    /// Dimension of the embedding space.
    const DIMENSION: usize = 3;
}

/// Vertices with position, normal and texture coordinate; faces with a normal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTraits;

impl MeshTraits for DefaultTraits {
    type VertexAttributes = PositionNormalTexCoord;
    type FaceAttributes = Normal;
    type SurfaceAttributes = ();
    type SubmeshAttributes = ();
}

/// Position-only vertices and no other payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionTraits;

impl MeshTraits for PositionTraits {
    type VertexAttributes = Position;
    type FaceAttributes = ();
    type SurfaceAttributes = ();
    type SubmeshAttributes = ();
}
