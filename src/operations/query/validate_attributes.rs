use tracing::warn;

use crate::attributes::{Attributes, MeshTraits};
use crate::error::AttributeError;
use crate::topology::{IdDisplay, Mesh};

/// Collects the attribute errors of every live entity.
pub struct ValidateAttributes;

impl ValidateAttributes {
    /// Creates a new `ValidateAttributes` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the validation. An empty result means every bundle is valid.
    #[must_use]
    pub fn execute<T: MeshTraits>(&self, mesh: &Mesh<T>) -> Vec<AttributeError> {
        let mut errors = Vec::new();
        for id in mesh.vertex_ids() {
            report(mesh.vertices[id].attributes(), "vertex", IdDisplay(id), &mut errors);
        }
        for id in mesh.face_ids() {
            report(mesh.faces[id].attributes(), "face", IdDisplay(id), &mut errors);
        }
        for id in mesh.surface_ids() {
            report(mesh.surfaces[id].attributes(), "surface", IdDisplay(id), &mut errors);
        }
        for id in mesh.submesh_ids() {
            report(mesh.submeshes[id].attributes(), "submesh", IdDisplay(id), &mut errors);
        }
        errors
    }
}

impl Default for ValidateAttributes {
    fn default() -> Self {
        Self::new()
    }
}

fn report(
    attributes: &impl Attributes,
    kind: &str,
    id: impl std::fmt::Display,
    errors: &mut Vec<AttributeError>,
) {
    let before = errors.len();
    attributes.validate_into(errors);
    for error in &errors[before..] {
        warn!("{kind} {id}: {error}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::attributes::{DefaultTraits, PositionTraits};
    use crate::math::{Point2, Point3, Vector3};
    use crate::topology::{fixtures, Flagged};

    #[test]
    fn fresh_mesh_is_valid() {
        let (mesh, _) = fixtures::two_surface_strip();
        assert!(ValidateAttributes::new().execute(&mesh).is_empty());
    }

    #[test]
    fn bad_normals_and_texcoords_are_reported() {
        let mut mesh: Mesh<DefaultTraits> = Mesh::new();
        let v = mesh.add_vertex(Point3::new(0.5, 0.5, 0.0).into());
        let attributes = mesh.vertex_mut(v).unwrap().attributes_mut();
        attributes.normal = Vector3::new(0.0, 0.0, 2.0);
        attributes.texcoord = Point2::new(1.5, 0.0);

        let errors = ValidateAttributes::new().execute(&mesh);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], AttributeError::NormalNotUnit { .. }));
        assert!(matches!(errors[1], AttributeError::TexCoordOutOfRange { .. }));
    }

    #[test]
    fn deleted_entities_are_skipped() {
        let mut mesh: Mesh<PositionTraits> = Mesh::new();
        let v = mesh.add_vertex(Point3::new(f64::NAN, 0.0, 0.0).into());
        assert_eq!(ValidateAttributes::new().execute(&mesh).len(), 1);
        mesh.vertex(v).unwrap().set_deleted(true);
        assert!(ValidateAttributes::new().execute(&mesh).is_empty());
    }
}
