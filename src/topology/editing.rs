use std::collections::HashSet;

use slotmap::Key;
use tracing::debug;

use crate::attributes::MeshTraits;
use crate::error::{Result, TopologyError};

use super::face::FaceData;
use super::flags::Flagged;
use super::halfedge::HalfedgeData;
use super::seam::SeamData;
use super::submesh::SubmeshData;
use super::surface::SurfaceData;
use super::vertex::VertexData;
use super::{FaceId, HalfedgeId, IdDisplay, Mesh, SeamId, SubmeshId, SurfaceId, VertexId};

impl<T: MeshTraits> Mesh<T> {
    // --- Factory operations ---

    /// Inserts a submesh and returns its ID.
    pub fn add_submesh(
        &mut self,
        name: impl Into<String>,
        attributes: T::SubmeshAttributes,
    ) -> SubmeshId {
        let (tag, name) = (self.tag(), name.into());
        self.submeshes
            .insert_with_key(|id| SubmeshData::new(id, tag, name, attributes))
    }

    /// Inserts a surface into `submesh` (which may be null) and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if `submesh` is not null and not a live submesh.
    pub fn add_surface(
        &mut self,
        submesh: SubmeshId,
        name: impl Into<String>,
        attributes: T::SurfaceAttributes,
    ) -> Result<SurfaceId> {
        if !submesh.is_null() {
            self.require_live(&self.submeshes, submesh, "submesh")?;
        }
        let (tag, name) = (self.tag(), name.into());
        Ok(self
            .surfaces
            .insert_with_key(|id| SurfaceData::new(id, tag, name, submesh, attributes)))
    }

    /// Inserts an isolated vertex and returns its ID.
    pub fn add_vertex(&mut self, attributes: T::VertexAttributes) -> VertexId {
        let tag = self.tag();
        self.vertices
            .insert_with_key(|id| VertexData::new(id, tag, attributes))
    }

    /// Inserts a face bounded by `vertices` (in ring order) into `surface`.
    ///
    /// Creates one halfedge per side, closes the ring and pairs every side
    /// with the opposite halfedge of an existing face, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the face has fewer than three vertices, repeats a
    /// vertex, references a missing or deleted vertex or surface, or would use
    /// a directed edge that another face already owns.
    pub fn add_face(
        &mut self,
        surface: SurfaceId,
        vertices: &[VertexId],
        attributes: T::FaceAttributes,
    ) -> Result<FaceId> {
        if vertices.len() < 3 {
            return Err(TopologyError::InvalidTopology(format!(
                "face needs at least 3 vertices, got {}",
                vertices.len()
            ))
            .into());
        }
        self.require_live(&self.surfaces, surface, "surface")?;
        let mut seen = HashSet::with_capacity(vertices.len());
        for &vertex in vertices {
            self.require_live(&self.vertices, vertex, "vertex")?;
            if !seen.insert(vertex) {
                return Err(TopologyError::InvalidTopology(format!(
                    "vertex {} appears twice in one face",
                    IdDisplay(vertex)
                ))
                .into());
            }
        }

        let sides: Vec<(VertexId, VertexId)> = (0..vertices.len())
            .map(|i| (vertices[i], vertices[(i + 1) % vertices.len()]))
            .collect();
        for &(from, to) in &sides {
            if self.edge_index.contains_key(&(from, to)) {
                return Err(TopologyError::NonManifoldEdge {
                    from: IdDisplay(from).to_string(),
                    to: IdDisplay(to).to_string(),
                }
                .into());
            }
        }

        let tag = self.tag();
        let face = self
            .faces
            .insert_with_key(|id| FaceData::new(id, tag, surface, attributes));
        let ring: Vec<HalfedgeId> = sides
            .iter()
            .map(|&(from, _)| {
                self.halfedges
                    .insert_with_key(|id| HalfedgeData::new(id, tag, from, face))
            })
            .collect();

        let n = ring.len();
        for (i, &halfedge) in ring.iter().enumerate() {
            let data = &mut self.halfedges[halfedge];
            data.next = ring[(i + 1) % n];
            data.prev = ring[(i + n - 1) % n];
        }
        self.faces[face].halfedge = ring[0];

        for (&halfedge, &(from, to)) in ring.iter().zip(&sides) {
            self.edge_index.insert((from, to), halfedge);
            if let Some(&partner) = self.edge_index.get(&(to, from)) {
                self.halfedges[halfedge].partner = partner;
                self.halfedges[partner].partner = halfedge;
            }
            if self.vertices[from].halfedge.is_null() {
                self.vertices[from].halfedge = halfedge;
            }
        }

        debug!("added face {} with {} sides", IdDisplay(face), n);
        Ok(face)
    }

    /// Inserts a seam starting at `halfedge` (which may be null for a
    /// detached seam). The new seam forms a ring of its own and is a border
    /// until a partner is linked.
    ///
    /// # Errors
    ///
    /// Returns an error if `halfedge` is not null and not a live halfedge.
    pub fn add_seam(&mut self, name: impl Into<String>, halfedge: HalfedgeId) -> Result<SeamId> {
        if !halfedge.is_null() {
            self.require_live(&self.halfedges, halfedge, "halfedge")?;
        }
        let (tag, name) = (self.tag(), name.into());
        Ok(self
            .seams
            .insert_with_key(|id| SeamData::new(id, tag, name, halfedge)))
    }

    /// Inserts a seam into the ring of `anchor`, right after it.
    ///
    /// # Errors
    ///
    /// Returns an error if `anchor` is not a live seam or `halfedge` is not
    /// a live halfedge.
    pub fn insert_seam_after(
        &mut self,
        anchor: SeamId,
        name: impl Into<String>,
        halfedge: HalfedgeId,
    ) -> Result<SeamId> {
        self.require_live(&self.seams, anchor, "seam")?;
        let seam = self.add_seam(name, halfedge)?;
        let next = self.seams[anchor].next_id();
        self.seams[anchor].set_next_id(seam);
        self.seams[seam].set_prev_id(anchor);
        self.seams[seam].set_next_id(next);
        self.seams[next].set_prev_id(seam);
        Ok(seam)
    }

    /// Makes `a` and `b` each other's partner. Former partners of either
    /// seam become borders.
    ///
    /// # Errors
    ///
    /// Returns an error if either seam is not live, or if `a == b`.
    pub fn link_seam_partners(&mut self, a: SeamId, b: SeamId) -> Result<()> {
        self.require_live(&self.seams, a, "seam")?;
        self.require_live(&self.seams, b, "seam")?;
        if a == b {
            return Err(TopologyError::InvalidTopology(format!(
                "seam {} cannot partner itself",
                IdDisplay(a)
            ))
            .into());
        }
        for (seam, other) in [(a, b), (b, a)] {
            let old = self.seams[seam].partner_id();
            if !old.is_null() && old != other && self.seams[old].partner_id() == seam {
                self.seams[old].set_partner_id(SeamId::null());
            }
            self.seams[seam].set_partner_id(other);
        }
        Ok(())
    }

    // --- Logical deletion ---

    /// Tombstones a seam.
    ///
    /// The seam is unlinked from its ring, so its predecessor's run now
    /// extends over the deleted seam's halfedges, and its partner becomes a
    /// border.
    ///
    /// # Errors
    ///
    /// Returns an error if the seam is missing or already deleted.
    pub fn delete_seam(&mut self, id: SeamId) -> Result<()> {
        self.require_live(&self.seams, id, "seam")?;
        let (next, prev, partner) = {
            let seam = &self.seams[id];
            (seam.next_id(), seam.prev_id(), seam.partner_id())
        };
        if next != id {
            self.seams[prev].set_next_id(next);
            self.seams[next].set_prev_id(prev);
        }
        if !partner.is_null() && self.seams[partner].partner_id() == id {
            self.seams[partner].set_partner_id(SeamId::null());
        }
        let seam = &mut self.seams[id];
        seam.set_partner_id(SeamId::null());
        seam.set_next_id(SeamId::null());
        seam.set_prev_id(SeamId::null());
        seam.set_deleted(true);
        Ok(())
    }

    /// Tombstones every live seam covering the boundary of `surface`.
    pub(crate) fn delete_surface_seams(&mut self, surface: SurfaceId) -> Result<usize> {
        let doomed: Vec<SeamId> = self.surface(surface)?.seam_ids().collect();
        for &seam in &doomed {
            self.delete_seam(seam)?;
        }
        Ok(doomed.len())
    }

    /// Tombstones a face and its halfedges.
    ///
    /// Partners of the removed halfedges become borders and vertices whose
    /// outgoing halfedge disappeared are repointed. Seams are left alone;
    /// callers regenerate the seams of the affected surfaces.
    pub(crate) fn delete_face(&mut self, id: FaceId) -> Result<()> {
        self.require_live(&self.faces, id, "face")?;
        let ring: Vec<HalfedgeId> = self.face(id)?.halfedges().ids().collect();
        let mut touched = Vec::with_capacity(ring.len());
        for &halfedge in &ring {
            let (from, next, partner) = {
                let data = &self.halfedges[halfedge];
                (data.vertex, data.next, data.partner)
            };
            let to = self.halfedges[next].vertex;
            self.edge_index.remove(&(from, to));
            if !partner.is_null() {
                self.halfedges[partner].partner = HalfedgeId::null();
            }
            self.halfedges[halfedge].partner = HalfedgeId::null();
            touched.push(from);
        }
        for &halfedge in &ring {
            self.halfedges[halfedge].set_deleted(true);
        }
        self.faces[id].set_deleted(true);

        for vertex in touched {
            let outgoing = self.vertices[vertex].halfedge;
            if !outgoing.is_null() && self.halfedges[outgoing].deleted() {
                self.vertices[vertex].halfedge = self
                    .edge_index
                    .iter()
                    .find(|((from, _), _)| *from == vertex)
                    .map_or_else(HalfedgeId::null, |(_, &h)| h);
            }
        }
        debug!("deleted face {}", IdDisplay(id));
        Ok(())
    }

    /// Rebuilds the directed edge index from the live halfedges.
    pub(crate) fn rebuild_edge_index(&mut self) {
        self.edge_index.clear();
        for (id, halfedge) in &self.halfedges {
            if halfedge.deleted() {
                continue;
            }
            let to = self.halfedges[halfedge.next].vertex;
            self.edge_index.insert((halfedge.vertex, to), id);
        }
    }

    fn require_live<K: Key, V: Flagged>(
        &self,
        map: &slotmap::SlotMap<K, V>,
        id: K,
        kind: &str,
    ) -> std::result::Result<(), TopologyError> {
        match map.get(id) {
            None => Err(TopologyError::EntityNotFound(format!(
                "{kind} {}",
                IdDisplay(id)
            ))),
            Some(data) if data.deleted() => Err(TopologyError::EntityDeleted(format!(
                "{kind} {}",
                IdDisplay(id)
            ))),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::attributes::{Position, PositionTraits};
    use crate::error::{KernelError, TopologyError};
    use crate::math::Point3;
    use crate::topology::{fixtures, Flagged, HalfedgeId, Mesh, SubmeshId, SurfaceId, VertexId};

    fn quad_mesh() -> (Mesh<PositionTraits>, SurfaceId, Vec<VertexId>) {
        let mut mesh = Mesh::new();
        let surface = mesh.add_surface(SubmeshId::default(), "s", ()).unwrap();
        let vertices = (0..4)
            .map(|i| mesh.add_vertex(Position::from(Point3::new(f64::from(i), 0.0, 0.0))))
            .collect();
        (mesh, surface, vertices)
    }

    #[test]
    fn faces_need_three_distinct_sides() {
        let (mut mesh, surface, v) = quad_mesh();
        assert!(matches!(
            mesh.add_face(surface, &v[..2], ()),
            Err(KernelError::Topology(TopologyError::InvalidTopology(_)))
        ));
        assert!(matches!(
            mesh.add_face(surface, &[v[0], v[0], v[1]], ()),
            Err(KernelError::Topology(TopologyError::InvalidTopology(_)))
        ));
        assert_eq!(mesh.n_faces(), 0);
        assert_eq!(mesh.n_halfedges(), 0);
    }

    #[test]
    fn faces_cannot_revisit_a_vertex() {
        let (mut mesh, surface, v) = quad_mesh();
        assert!(matches!(
            mesh.add_face(surface, &[v[0], v[1], v[0], v[2]], ()),
            Err(KernelError::Topology(TopologyError::InvalidTopology(_)))
        ));
        assert_eq!(mesh.n_faces(), 0);
        assert!(mesh.edge_index.is_empty());
    }

    #[test]
    fn directed_edges_are_used_once() {
        let (mut mesh, surface, v) = quad_mesh();
        mesh.add_face(surface, &[v[0], v[1], v[2]], ()).unwrap();
        assert!(matches!(
            mesh.add_face(surface, &[v[0], v[1], v[3]], ()),
            Err(KernelError::Topology(TopologyError::NonManifoldEdge { .. }))
        ));
        // The opposite orientation pairs up instead.
        let face = mesh.add_face(surface, &[v[1], v[0], v[3]], ()).unwrap();
        let shared = mesh.face(face).unwrap().halfedge();
        assert!(shared.partner().is_some());
    }

    #[test]
    fn surfaces_need_a_live_submesh() {
        let mut mesh: Mesh<PositionTraits> = Mesh::new();
        let submesh = mesh.add_submesh("body", ());
        mesh.submesh(submesh).unwrap().data().flags().set_deleted(true);
        assert!(matches!(
            mesh.add_surface(submesh, "top", ()),
            Err(KernelError::Topology(TopologyError::EntityDeleted(_)))
        ));
    }

    #[test]
    fn inserted_seams_keep_the_ring_closed() {
        let mut mesh: Mesh<PositionTraits> = Mesh::new();
        let a = mesh.add_seam("a", HalfedgeId::default()).unwrap();
        let b = mesh.insert_seam_after(a, "b", HalfedgeId::default()).unwrap();
        let c = mesh.insert_seam_after(b, "c", HalfedgeId::default()).unwrap();
        let order: Vec<_> = mesh.seam(a).unwrap().ring().ids().collect();
        assert_eq!(order, vec![a, b, c]);
        for id in [a, b, c] {
            let seam = mesh.seam(id).unwrap();
            assert_eq!(seam.next().prev_id(), id);
            assert_eq!(seam.prev().next_id(), id);
        }
    }

    #[test]
    fn deleting_a_seam_closes_the_gap_and_frees_its_partner() {
        let (mut mesh, strip) = fixtures::two_surface_strip();
        mesh.delete_seam(strip.top_shared).unwrap();
        let border = mesh.seam(strip.top_border).unwrap();
        assert_eq!(border.next_id(), strip.top_border);
        assert_eq!(border.prev_id(), strip.top_border);
        assert_eq!(border.halfedge_count(), 4);
        assert!(mesh.seam(strip.side_shared).unwrap().border());
        assert!(mesh.delete_seam(strip.top_shared).is_err());
    }

    #[test]
    fn relinking_a_partner_frees_the_old_one() {
        let (mut mesh, strip) = fixtures::two_surface_strip();
        mesh.link_seam_partners(strip.top_shared, strip.side_border)
            .unwrap();
        assert!(mesh.seam(strip.side_shared).unwrap().border());
        assert_eq!(
            mesh.seam(strip.side_border).unwrap().partner_id(),
            strip.top_shared
        );
        assert!(mesh
            .link_seam_partners(strip.top_shared, strip.top_shared)
            .is_err());
    }

    #[test]
    fn deleting_a_face_detaches_its_neighbours() {
        let (mut mesh, strip) = fixtures::two_surface_strip();
        mesh.delete_face(strip.top_face).unwrap();
        assert_eq!(mesh.n_faces(), 1);
        assert_eq!(mesh.n_halfedges(), 4);
        let shared = mesh.halfedge(strip.shared_side).unwrap();
        assert!(shared.border());
        // v0 and v3 only had halfedges in the deleted face.
        let v0 = mesh.vertex(strip.top_vertices[0]).unwrap();
        assert!(v0.halfedge().is_none());
        let v1 = mesh.vertex(strip.top_vertices[1]).unwrap();
        assert!(!v1.halfedge().unwrap().deleted());
    }
}
