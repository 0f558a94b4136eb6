use std::collections::HashSet;

use tracing::info;

use crate::attributes::MeshTraits;
use crate::error::{Result, TopologyError};
use crate::math::Point3;
use crate::operations::seams::GenerateSeams;
use crate::topology::{Mesh, SubmeshId, VertexId};

/// One polygon of an indexed mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFace {
    /// Index into the surface names.
    pub surface: usize,
    /// Indices into the positions, in ring order.
    pub vertices: Vec<usize>,
}

impl IndexedFace {
    #[must_use]
    pub fn new(surface: usize, vertices: Vec<usize>) -> Self {
        Self { surface, vertices }
    }
}

/// Builds a submesh from shared positions and indexed polygons, then
/// generates the seams of its surfaces.
pub struct MakeIndexedMesh {
    name: String,
    positions: Vec<Point3>,
    surfaces: Vec<String>,
    faces: Vec<IndexedFace>,
}

impl MakeIndexedMesh {
    /// Creates a new `MakeIndexedMesh` operation.
    ///
    /// Every face names its surface by index into `surfaces`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Point3>,
        surfaces: Vec<String>,
        faces: Vec<IndexedFace>,
    ) -> Self {
        Self {
            name: name.into(),
            positions,
            surfaces,
            faces,
        }
    }

    /// Executes the operation, adding one submesh to `mesh`.
    ///
    /// Vertex payloads are built from the positions; every other payload
    /// starts at its default.
    ///
    /// # Errors
    ///
    /// Returns an error if an index is out of range, or if a face is
    /// degenerate or would make an edge non-manifold. Indices are checked
    /// before anything is inserted; topology errors may leave the faces
    /// added so far in place.
    pub fn execute<T: MeshTraits>(&self, mesh: &mut Mesh<T>) -> Result<SubmeshId>
    where
        T::VertexAttributes: From<Point3>,
        T::FaceAttributes: Default,
        T::SurfaceAttributes: Default,
        T::SubmeshAttributes: Default,
    {
        self.check_indices()?;

        let submesh = mesh.add_submesh(self.name.clone(), T::SubmeshAttributes::default());
        let mut surfaces = Vec::with_capacity(self.surfaces.len());
        for name in &self.surfaces {
            surfaces.push(mesh.add_surface(
                submesh,
                name.clone(),
                T::SurfaceAttributes::default(),
            )?);
        }
        let vertices: Vec<VertexId> = self
            .positions
            .iter()
            .map(|&p| mesh.add_vertex(T::VertexAttributes::from(p)))
            .collect();

        let mut ring = Vec::new();
        for face in &self.faces {
            ring.clear();
            ring.extend(face.vertices.iter().map(|&i| vertices[i]));
            mesh.add_face(surfaces[face.surface], &ring, T::FaceAttributes::default())?;
        }

        let used: HashSet<_> = self.faces.iter().map(|f| f.surface).collect();
        let seams = GenerateSeams::for_surfaces(
            surfaces
                .iter()
                .enumerate()
                .filter(|(i, _)| used.contains(i))
                .map(|(_, &s)| s)
                .collect(),
        )
        .execute(mesh)?;

        info!(
            "built submesh {}: {} vertices, {} faces, {} surfaces, {} seams",
            self.name,
            vertices.len(),
            self.faces.len(),
            surfaces.len(),
            seams
        );
        Ok(submesh)
    }

    fn check_indices(&self) -> std::result::Result<(), TopologyError> {
        for (n, face) in self.faces.iter().enumerate() {
            if face.surface >= self.surfaces.len() {
                return Err(TopologyError::InvalidTopology(format!(
                    "face {n} names surface {} of {}",
                    face.surface,
                    self.surfaces.len()
                )));
            }
            if let Some(&bad) = face.vertices.iter().find(|&&i| i >= self.positions.len()) {
                return Err(TopologyError::InvalidTopology(format!(
                    "face {n} names vertex {bad} of {}",
                    self.positions.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::attributes::{DefaultTraits, PositionTraits};
    use crate::error::KernelError;
    use crate::operations::query::CheckMesh;
    use crate::topology::fixtures;

    /// A unit cube with its top in one surface and the rest in another.
    fn cube() -> MakeIndexedMesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = vec![
            IndexedFace::new(1, vec![0, 3, 2, 1]),
            IndexedFace::new(0, vec![4, 5, 6, 7]),
            IndexedFace::new(1, vec![0, 1, 5, 4]),
            IndexedFace::new(1, vec![1, 2, 6, 5]),
            IndexedFace::new(1, vec![2, 3, 7, 6]),
            IndexedFace::new(1, vec![3, 0, 4, 7]),
        ];
        MakeIndexedMesh::new(
            "cube",
            positions,
            vec!["lid".to_owned(), "box".to_owned()],
            faces,
        )
    }

    #[test]
    fn closed_cube_has_one_seam_pair() {
        fixtures::init_tracing();
        let mut mesh: Mesh<PositionTraits> = Mesh::new();
        let submesh = cube().execute(&mut mesh).unwrap();
        assert_eq!(mesh.n_vertices(), 8);
        assert_eq!(mesh.n_faces(), 6);
        assert_eq!(mesh.n_halfedges(), 24);
        assert!(mesh.halfedge_ids().all(|h| !mesh.halfedge(h).unwrap().border()));
        assert_eq!(mesh.submesh(submesh).unwrap().surface_ids().count(), 2);

        // The lid meets the box along one loop of four edges.
        assert_eq!(mesh.n_seams(), 2);
        for id in mesh.seam_ids() {
            let seam = mesh.seam(id).unwrap();
            assert!(!seam.border());
            assert_eq!(seam.halfedge_count(), 4);
        }
        assert!(CheckMesh::new().execute(&mesh).is_empty());
    }

    #[test]
    fn default_traits_get_default_payloads() {
        let mut mesh: Mesh<DefaultTraits> = Mesh::new();
        cube().execute(&mut mesh).unwrap();
        let face = mesh.face_ids().next().unwrap();
        assert_eq!(
            mesh.face(face).unwrap().attributes().normal,
            crate::math::Vector3::z()
        );
    }

    #[test]
    fn out_of_range_indices_leave_the_mesh_untouched() {
        let mut mesh: Mesh<PositionTraits> = Mesh::new();
        let op = MakeIndexedMesh::new(
            "bad",
            vec![Point3::origin(); 3],
            vec!["s".to_owned()],
            vec![IndexedFace::new(0, vec![0, 1, 3])],
        );
        assert!(matches!(
            op.execute(&mut mesh),
            Err(KernelError::Topology(TopologyError::InvalidTopology(_)))
        ));
        assert_eq!(mesh.n_submeshes(), 0);
        assert_eq!(mesh.n_vertices(), 0);
    }
}
