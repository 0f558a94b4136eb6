use slotmap::Key;
use tracing::debug;

use crate::attributes::MeshTraits;
use crate::error::Result;
use crate::operations::seams::GenerateSeams;
use crate::topology::{FaceId, IdDisplay, Mesh, SurfaceId};

/// Removes a face and rebuilds the seams around the hole it leaves.
///
/// The face and its halfedges are tombstoned. Neighbouring halfedges become
/// borders, so the seams of the face's surface and of every surface across
/// one of its edges are regenerated.
pub struct RemoveFace {
    face: FaceId,
}

impl RemoveFace {
    /// Creates a new `RemoveFace` operation.
    #[must_use]
    pub fn new(face: FaceId) -> Self {
        Self { face }
    }

    /// Executes the removal.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is missing or already deleted.
    pub fn execute<T: MeshTraits>(&self, mesh: &mut Mesh<T>) -> Result<()> {
        let mut affected: Vec<SurfaceId> = Vec::new();
        {
            let face = mesh.face(self.face)?;
            affected.push(face.surface_id());
            for halfedge in face.halfedges().ids() {
                let partner = mesh.halfedges[halfedge].partner_id();
                if !partner.is_null() {
                    affected.push(mesh.halfedge_surface_id(partner));
                }
            }
        }
        affected.retain(|s| !s.is_null());
        affected.sort_unstable();
        affected.dedup();

        mesh.delete_face(self.face)?;
        let seams = GenerateSeams::for_surfaces(affected.clone()).execute(mesh)?;
        debug!(
            "removed face {}, {} seams regenerated over {} surfaces",
            IdDisplay(self.face),
            seams,
            affected.len()
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{KernelError, TopologyError};
    use crate::operations::query::CheckMesh;
    use crate::topology::{fixtures, Flagged};

    #[test]
    fn removing_a_face_turns_its_neighbours_into_borders() {
        let (mut mesh, strip) = fixtures::two_surface_strip();
        RemoveFace::new(strip.top_face).execute(&mut mesh).unwrap();

        assert_eq!(mesh.n_faces(), 1);
        assert!(mesh.face(strip.top_face).unwrap().deleted());
        assert!(mesh.surface(strip.top).unwrap().seam_ids().next().is_none());

        let side: Vec<_> = mesh.surface(strip.side).unwrap().seam_ids().collect();
        assert_eq!(side.len(), 1);
        let seam = mesh.seam(side[0]).unwrap();
        assert!(seam.border());
        assert_eq!(seam.halfedge_count(), 4);
        assert!(CheckMesh::new().execute(&mesh).is_empty());
    }

    #[test]
    fn removing_an_interior_face_keeps_one_surface_consistent() {
        let (mut mesh, surface) = fixtures::two_face_surface();
        let face = mesh.face_ids().next().unwrap();
        RemoveFace::new(face).execute(&mut mesh).unwrap();
        let seams: Vec<_> = mesh.surface(surface).unwrap().seam_ids().collect();
        assert_eq!(seams.len(), 1);
        assert_eq!(mesh.seam(seams[0]).unwrap().halfedge_count(), 4);
        assert!(CheckMesh::new().execute(&mesh).is_empty());
    }

    #[test]
    fn removing_twice_fails() {
        let (mut mesh, strip) = fixtures::two_surface_strip();
        let op = RemoveFace::new(strip.side_face);
        op.execute(&mut mesh).unwrap();
        assert!(matches!(
            op.execute(&mut mesh),
            Err(KernelError::Topology(TopologyError::EntityDeleted(_)))
        ));
    }
}
