use tracing::debug;

use crate::attributes::{Attributes, MeshTraits};
use crate::error::{AttributeError, Result};
use crate::math::{normal_matrix, Matrix3, Matrix4, Vector3};
use crate::topology::Mesh;

/// Applies a 4x4 transformation matrix to every attribute bundle of a mesh.
///
/// Positions are transformed by the matrix. Normals and tangents are
/// transformed by the inverse transpose of its upper 3x3 block and
/// renormalized. Topology is left untouched, so a mirroring matrix leaves
/// faces wound the wrong way; follow it with
/// [`FlipOrientation`](super::FlipOrientation).
pub struct Transform {
    matrix: Matrix4,
}

impl Transform {
    /// Creates a new `Transform` operation.
    #[must_use]
    pub fn new(matrix: Matrix4) -> Self {
        Self { matrix }
    }

    #[must_use]
    pub fn translation(offset: Vector3) -> Self {
        Self::new(Matrix4::new_translation(&offset))
    }

    #[must_use]
    pub fn scaling(factors: Vector3) -> Self {
        Self::new(Matrix4::new_nonuniform_scaling(&factors))
    }

    /// Rotation by `angle` radians around `axis`.
    #[must_use]
    pub fn rotation(axis: Vector3, angle: f64) -> Self {
        let axis = axis.try_normalize(0.0).unwrap_or_else(Vector3::z) * angle;
        Self::new(Matrix4::new_rotation(axis))
    }

    /// Returns `true` if the matrix reverses orientation.
    #[must_use]
    pub fn mirrors(&self) -> bool {
        let upper: Matrix3 = self.matrix.fixed_view::<3, 3>(0, 0).into_owned();
        upper.determinant() < 0.0
    }

    /// Executes the transformation on every live entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix has a non-finite entry.
    pub fn execute<T: MeshTraits>(&self, mesh: &mut Mesh<T>) -> Result<()> {
        if !self.matrix.iter().all(|c| c.is_finite()) {
            return Err(AttributeError::NonFinite("transform matrix").into());
        }
        let normals = normal_matrix(&self.matrix);

        let ids: Vec<_> = mesh.vertex_ids().collect();
        for &id in &ids {
            mesh.vertex_mut(id)?
                .attributes_mut()
                .transform_with_normals(&self.matrix, &normals);
        }
        for id in mesh.face_ids().collect::<Vec<_>>() {
            mesh.face_mut(id)?
                .attributes_mut()
                .transform_with_normals(&self.matrix, &normals);
        }
        for id in mesh.surface_ids().collect::<Vec<_>>() {
            mesh.surface_mut(id)?
                .attributes_mut()
                .transform_with_normals(&self.matrix, &normals);
        }
        for id in mesh.submesh_ids().collect::<Vec<_>>() {
            mesh.submesh_mut(id)?
                .attributes_mut()
                .transform_with_normals(&self.matrix, &normals);
        }

        debug!("transformed {} vertices", ids.len());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;
    use crate::attributes::{DefaultTraits, PositionNormal, PositionTraits};
    use crate::error::KernelError;
    use crate::math::Point3;
    use crate::topology::fixtures;

    #[derive(Debug, Clone)]
    struct NormalTraits;

    impl MeshTraits for NormalTraits {
        type VertexAttributes = PositionNormal;
        type FaceAttributes = ();
        type SurfaceAttributes = ();
        type SubmeshAttributes = ();
    }

    #[test]
    fn translation_moves_every_vertex() {
        let (mut mesh, strip) = fixtures::two_surface_strip();
        Transform::translation(Vector3::new(0.0, 0.0, 2.0))
            .execute(&mut mesh)
            .unwrap();
        for id in mesh.vertex_ids() {
            let vertex = mesh.vertex(id).unwrap();
            assert_relative_eq!(vertex.attributes().point.z, 2.0);
        }
        let v1 = mesh.vertex(strip.top_vertices[1]).unwrap();
        assert_relative_eq!(v1.attributes().point, Point3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn rotation_keeps_normals_unit_length() {
        let mut mesh: Mesh<NormalTraits> = Mesh::new();
        let v = mesh.add_vertex(PositionNormal::from(Point3::new(1.0, 0.0, 0.0)));
        Transform::rotation(Vector3::x(), FRAC_PI_2)
            .execute(&mut mesh)
            .unwrap();
        let normal = mesh.vertex(v).unwrap().attributes().normal;
        assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(normal, -Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn non_uniform_scale_renormalizes_vertex_normals() {
        let mut mesh: Mesh<DefaultTraits> = Mesh::new();
        let t = Transform::scaling(Vector3::new(1.0, 1.0, 5.0));
        let v = mesh.add_vertex(Point3::new(1.0, 1.0, 1.0).into());
        t.execute(&mut mesh).unwrap();
        let attributes = mesh.vertex(v).unwrap().data().attributes();
        assert_relative_eq!(attributes.point, Point3::new(1.0, 1.0, 5.0));
        assert_relative_eq!(attributes.normal, Vector3::z(), epsilon = 1e-12);
        assert!(!t.mirrors());
    }

    #[test]
    fn mirror_is_detected() {
        let t = Transform::scaling(Vector3::new(-1.0, 1.0, 1.0));
        assert!(t.mirrors());
    }

    #[test]
    fn non_finite_matrix_is_rejected() {
        let mut mesh: Mesh<PositionTraits> = Mesh::new();
        let t = Transform::new(Matrix4::from_element(f64::NAN));
        assert!(matches!(
            t.execute(&mut mesh),
            Err(KernelError::Attribute(AttributeError::NonFinite(_)))
        ));
    }
}
