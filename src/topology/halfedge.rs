use std::ops::Deref;

use slotmap::Key;
use tracing::warn;

use crate::attributes::MeshTraits;

use super::face::{Face, FaceId};
use super::flags::{Flagged, Flags};
use super::surface::SurfaceId;
use super::vertex::{Vertex, VertexId};
use super::{IdDisplay, Mesh, MeshTag, MAX_LOOP_ITERATIONS};

slotmap::new_key_type! {
    /// Unique identifier for a halfedge in the mesh.
    pub struct HalfedgeId;
}

/// Data associated with a halfedge.
///
/// A halfedge is a directed edge owned by exactly one face. Its partner runs
/// the opposite way on the adjacent face, or is null on a mesh border.
#[derive(Debug, Clone)]
pub struct HalfedgeData {
    id: HalfedgeId,
    mesh: MeshTag,
    flags: Flags,
    pub(crate) vertex: VertexId,
    pub(crate) next: HalfedgeId,
    pub(crate) prev: HalfedgeId,
    pub(crate) partner: HalfedgeId,
    pub(crate) face: FaceId,
}

impl HalfedgeData {
    pub(crate) fn new(id: HalfedgeId, mesh: MeshTag, vertex: VertexId, face: FaceId) -> Self {
        Self {
            id,
            mesh,
            flags: Flags::new(),
            vertex,
            next: HalfedgeId::null(),
            prev: HalfedgeId::null(),
            partner: HalfedgeId::null(),
            face,
        }
    }

    /// This halfedge's ID.
    #[must_use]
    pub fn id(&self) -> HalfedgeId {
        self.id
    }

    /// Origin vertex.
    #[must_use]
    pub fn vertex_id(&self) -> VertexId {
        self.vertex
    }

    /// Next halfedge of the face ring.
    #[must_use]
    pub fn next_id(&self) -> HalfedgeId {
        self.next
    }

    /// Previous halfedge of the face ring.
    #[must_use]
    pub fn prev_id(&self) -> HalfedgeId {
        self.prev
    }

    /// Opposite halfedge on the adjacent face, or null on a border.
    #[must_use]
    pub fn partner_id(&self) -> HalfedgeId {
        self.partner
    }

    /// Face owning this halfedge.
    #[must_use]
    pub fn face_id(&self) -> FaceId {
        self.face
    }

    /// Returns `true` if the halfedge has no partner.
    #[must_use]
    pub fn border(&self) -> bool {
        self.partner.is_null()
    }

    pub(crate) fn set_id(&mut self, id: HalfedgeId) {
        self.id = id;
    }

    pub(crate) fn set_mesh(&mut self, mesh: MeshTag) {
        self.mesh = mesh;
    }
}

impl Flagged for HalfedgeData {
    fn flags(&self) -> &Flags {
        &self.flags
    }
}

/// A halfedge resolved through its mesh.
pub struct Halfedge<'m, T: MeshTraits> {
    mesh: &'m Mesh<T>,
    id: HalfedgeId,
}

impl<T: MeshTraits> Clone for Halfedge<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: MeshTraits> Copy for Halfedge<'_, T> {}

impl<T: MeshTraits> Deref for Halfedge<'_, T> {
    type Target = HalfedgeData;

    fn deref(&self) -> &HalfedgeData {
        &self.mesh.halfedges[self.id]
    }
}

impl<'m, T: MeshTraits> Halfedge<'m, T> {
    pub(crate) fn new(mesh: &'m Mesh<T>, id: HalfedgeId) -> Self {
        Self { mesh, id }
    }

    /// The mesh this halfedge was resolved from.
    #[must_use]
    pub fn mesh(&self) -> &'m Mesh<T> {
        self.mesh
    }

    /// The stored halfedge data.
    #[must_use]
    pub fn data(&self) -> &'m HalfedgeData {
        &self.mesh.halfedges[self.id]
    }

    /// Next halfedge of the face ring.
    #[must_use]
    pub fn next(&self) -> Halfedge<'m, T> {
        Halfedge::new(self.mesh, self.data().next)
    }

    /// Previous halfedge of the face ring.
    #[must_use]
    pub fn prev(&self) -> Halfedge<'m, T> {
        Halfedge::new(self.mesh, self.data().prev)
    }

    /// The partner halfedge, or `None` on a mesh border.
    #[must_use]
    pub fn partner(&self) -> Option<Halfedge<'m, T>> {
        let partner = self.data().partner;
        (!partner.is_null()).then(|| Halfedge::new(self.mesh, partner))
    }

    /// The owning face, or `None` for a halfedge that was never attached.
    #[must_use]
    pub fn face(&self) -> Option<Face<'m, T>> {
        let face = self.data().face;
        (!face.is_null()).then(|| Face::new(self.mesh, face))
    }

    /// Origin vertex.
    #[must_use]
    pub fn vertex(&self) -> Vertex<'m, T> {
        Vertex::new(self.mesh, self.data().vertex)
    }

    /// Destination vertex, i.e. the origin of the next halfedge.
    #[must_use]
    pub fn destination_id(&self) -> VertexId {
        self.next().vertex_id()
    }

    /// Surface owning the face of this halfedge, or null.
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.mesh.halfedge_surface_id(self.id)
    }

    /// Returns `true` if this halfedge lies on the boundary of its surface.
    #[must_use]
    pub fn surface_boundary(&self) -> bool {
        is_surface_boundary(self.mesh, self.id)
    }
}

/// Returns `true` if `halfedge` has no partner, or a partner whose face
/// belongs to another surface.
#[must_use]
pub fn is_surface_boundary<T: MeshTraits>(mesh: &Mesh<T>, halfedge: HalfedgeId) -> bool {
    let partner = mesh.halfedges[halfedge].partner;
    partner.is_null() || mesh.halfedge_surface_id(partner) != mesh.halfedge_surface_id(halfedge)
}

/// Steps to the next halfedge along the boundary loop of the surface owning
/// `halfedge`.
///
/// From the face-ring successor, rotates around the shared vertex past every
/// halfedge whose partner belongs to the same surface. Returns null if the
/// walk does not reach a boundary within [`MAX_LOOP_ITERATIONS`] steps, which
/// happens when `halfedge` is interior to its surface.
#[must_use]
pub fn next_surface_halfedge_id<T: MeshTraits>(
    mesh: &Mesh<T>,
    halfedge: HalfedgeId,
) -> HalfedgeId {
    let surface = mesh.halfedge_surface_id(halfedge);
    let mut candidate = mesh.halfedges[halfedge].next;
    for _ in 0..MAX_LOOP_ITERATIONS {
        if candidate.is_null() {
            return candidate;
        }
        let partner = mesh.halfedges[candidate].partner;
        if partner.is_null() || mesh.halfedge_surface_id(partner) != surface {
            return candidate;
        }
        candidate = mesh.halfedges[partner].next;
    }
    warn!(
        "no surface boundary found after halfedge {}",
        IdDisplay(halfedge)
    );
    HalfedgeId::null()
}

/// Steps to the previous halfedge along the boundary loop of the surface
/// owning `halfedge`. Mirror image of [`next_surface_halfedge_id`].
#[must_use]
pub fn prev_surface_halfedge_id<T: MeshTraits>(
    mesh: &Mesh<T>,
    halfedge: HalfedgeId,
) -> HalfedgeId {
    let surface = mesh.halfedge_surface_id(halfedge);
    let mut candidate = mesh.halfedges[halfedge].prev;
    for _ in 0..MAX_LOOP_ITERATIONS {
        if candidate.is_null() {
            return candidate;
        }
        let partner = mesh.halfedges[candidate].partner;
        if partner.is_null() || mesh.halfedge_surface_id(partner) != surface {
            return candidate;
        }
        candidate = mesh.halfedges[partner].prev;
    }
    warn!(
        "no surface boundary found before halfedge {}",
        IdDisplay(halfedge)
    );
    HalfedgeId::null()
}
