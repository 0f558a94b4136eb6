use std::ops::Deref;

use slotmap::Key;

use crate::attributes::MeshTraits;

use super::elements::{Elements, ElementsPolicy};
use super::flags::{Flagged, Flags};
use super::halfedge::{Halfedge, HalfedgeData, HalfedgeId};
use super::surface::{Surface, SurfaceId};
use super::vertex::VertexId;
use super::{Mesh, MeshTag};

slotmap::new_key_type! {
    /// Unique identifier for a face in the mesh.
    pub struct FaceId;
}

/// Data associated with a face.
///
/// A face is a closed ring of halfedges. It belongs to one surface.
#[derive(Debug, Clone)]
pub struct FaceData<T: MeshTraits> {
    id: FaceId,
    mesh: MeshTag,
    flags: Flags,
    pub(crate) halfedge: HalfedgeId,
    pub(crate) surface: SurfaceId,
    attributes: T::FaceAttributes,
}

impl<T: MeshTraits> FaceData<T> {
    pub(crate) fn new(
        id: FaceId,
        mesh: MeshTag,
        surface: SurfaceId,
        attributes: T::FaceAttributes,
    ) -> Self {
        Self {
            id,
            mesh,
            flags: Flags::new(),
            halfedge: HalfedgeId::null(),
            surface,
            attributes,
        }
    }

    /// This face's ID.
    #[must_use]
    pub fn id(&self) -> FaceId {
        self.id
    }

    /// First halfedge of the face ring.
    #[must_use]
    pub fn halfedge_id(&self) -> HalfedgeId {
        self.halfedge
    }

    /// Surface this face belongs to.
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface
    }

    /// Per-face payload.
    #[must_use]
    pub fn attributes(&self) -> &T::FaceAttributes {
        &self.attributes
    }

    /// Mutable per-face payload.
    pub fn attributes_mut(&mut self) -> &mut T::FaceAttributes {
        &mut self.attributes
    }

    pub(crate) fn set_id(&mut self, id: FaceId) {
        self.id = id;
    }

    pub(crate) fn set_mesh(&mut self, mesh: MeshTag) {
        self.mesh = mesh;
    }
}

impl<T: MeshTraits> Flagged for FaceData<T> {
    fn flags(&self) -> &Flags {
        &self.flags
    }
}

/// A face resolved through its mesh.
pub struct Face<'m, T: MeshTraits> {
    mesh: &'m Mesh<T>,
    id: FaceId,
}

impl<T: MeshTraits> Clone for Face<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: MeshTraits> Copy for Face<'_, T> {}

impl<T: MeshTraits> Deref for Face<'_, T> {
    type Target = FaceData<T>;

    fn deref(&self) -> &FaceData<T> {
        &self.mesh.faces[self.id]
    }
}

impl<'m, T: MeshTraits> Face<'m, T> {
    pub(crate) fn new(mesh: &'m Mesh<T>, id: FaceId) -> Self {
        Self { mesh, id }
    }

    /// The stored face data.
    #[must_use]
    pub fn data(&self) -> &'m FaceData<T> {
        &self.mesh.faces[self.id]
    }

    /// First halfedge of the ring.
    #[must_use]
    pub fn halfedge(&self) -> Halfedge<'m, T> {
        Halfedge::new(self.mesh, self.data().halfedge)
    }

    /// The halfedge ring of this face.
    #[must_use]
    pub fn halfedges(&self) -> Elements<'m, T, FaceHalfedges> {
        Elements::new(self.mesh, self.id)
    }

    /// Origin vertices of the ring, in order.
    #[must_use]
    pub fn vertex_ids(&self) -> Vec<VertexId> {
        self.halfedges().iter().map(HalfedgeData::vertex_id).collect()
    }

    /// The owning surface, or `None` if the face is not attached to one.
    #[must_use]
    pub fn surface(&self) -> Option<Surface<'m, T>> {
        let surface = self.data().surface;
        (!surface.is_null()).then(|| Surface::new(self.mesh, surface))
    }
}

/// Walks the halfedge ring of a face, starting at the face's halfedge.
pub struct FaceHalfedges;

impl<T: MeshTraits> ElementsPolicy<T> for FaceHalfedges {
    type Container = FaceId;
    type Element = HalfedgeId;
    type Item = HalfedgeData;

    fn first(mesh: &Mesh<T>, face: FaceId) -> HalfedgeId {
        mesh.faces[face].halfedge
    }

    fn last(mesh: &Mesh<T>, face: FaceId) -> HalfedgeId {
        let first = mesh.faces[face].halfedge;
        if first.is_null() {
            first
        } else {
            mesh.halfedges[first].prev
        }
    }

    fn step_forward(mesh: &Mesh<T>, face: FaceId, current: HalfedgeId) -> HalfedgeId {
        debug_assert!(!current.is_null(), "stepped past the end of a face ring");
        let next = mesh.halfedges[current].next;
        if next == mesh.faces[face].halfedge {
            HalfedgeId::null()
        } else {
            next
        }
    }

    fn step_backward(mesh: &Mesh<T>, face: FaceId, current: HalfedgeId) -> HalfedgeId {
        debug_assert!(!current.is_null(), "stepped past the start of a face ring");
        if current == mesh.faces[face].halfedge {
            HalfedgeId::null()
        } else {
            mesh.halfedges[current].prev
        }
    }

    fn get(mesh: &Mesh<T>, halfedge: HalfedgeId) -> &HalfedgeData {
        &mesh.halfedges[halfedge]
    }

    fn get_mut(mesh: &mut Mesh<T>, halfedge: HalfedgeId) -> &mut HalfedgeData {
        &mut mesh.halfedges[halfedge]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::topology::{fixtures, Flagged};

    #[test]
    fn ring_walks_both_ways() {
        let (mesh, strip) = fixtures::two_surface_strip();
        let face = mesh.face(strip.top_face).unwrap();
        let forward: Vec<_> = face.halfedges().ids().collect();
        let mut backward: Vec<_> = face.halfedges().ids().rev().collect();
        backward.reverse();
        assert_eq!(forward.len(), 4);
        assert_eq!(forward, backward);
        assert_eq!(face.halfedges().size(), 4);
        assert_eq!(forward[0], face.halfedge_id());
    }

    #[test]
    fn ring_links_are_consistent() {
        let (mesh, strip) = fixtures::two_surface_strip();
        let face = mesh.face(strip.side_face).unwrap();
        for halfedge in face.halfedges() {
            let h = mesh.halfedge(halfedge.id()).unwrap();
            assert_eq!(h.next().prev_id(), h.id());
            assert_eq!(h.face_id(), strip.side_face);
        }
    }

    #[test]
    fn mutable_ring_visits_every_halfedge_once() {
        let (mut mesh, strip) = fixtures::two_surface_strip();
        let mut view = crate::topology::ElementsMut::<_, crate::topology::FaceHalfedges>::new(
            &mut mesh,
            strip.top_face,
        );
        assert_eq!(view.size(), 4);
        let mut visited = 0;
        while let Some(halfedge) = view.next_element() {
            halfedge.set_marked(true);
            visited += 1;
        }
        assert_eq!(visited, 4);
        let face = mesh.face(strip.top_face).unwrap();
        assert!(face.halfedges().iter().all(Flagged::marked));
    }

    #[test]
    fn vertex_ids_follow_ring_order() {
        let (mesh, strip) = fixtures::two_surface_strip();
        let face = mesh.face(strip.top_face).unwrap();
        assert_eq!(face.vertex_ids(), strip.top_vertices.to_vec());
    }
}
