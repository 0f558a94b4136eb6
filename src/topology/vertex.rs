use std::ops::Deref;

use slotmap::Key;

use crate::attributes::MeshTraits;

use super::flags::{Flagged, Flags};
use super::halfedge::{Halfedge, HalfedgeId};
use super::{Mesh, MeshTag};

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the mesh.
    pub struct VertexId;
}

/// Data associated with a vertex.
#[derive(Debug, Clone)]
pub struct VertexData<T: MeshTraits> {
    id: VertexId,
    mesh: MeshTag,
    flags: Flags,
    /// One outgoing halfedge, null while the vertex is isolated.
    pub(crate) halfedge: HalfedgeId,
    attributes: T::VertexAttributes,
}

impl<T: MeshTraits> VertexData<T> {
    pub(crate) fn new(id: VertexId, mesh: MeshTag, attributes: T::VertexAttributes) -> Self {
        Self {
            id,
            mesh,
            flags: Flags::new(),
            halfedge: HalfedgeId::null(),
            attributes,
        }
    }

    /// This vertex's ID.
    #[must_use]
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// One outgoing halfedge, or null for an isolated vertex.
    #[must_use]
    pub fn halfedge_id(&self) -> HalfedgeId {
        self.halfedge
    }

    /// Per-vertex payload.
    #[must_use]
    pub fn attributes(&self) -> &T::VertexAttributes {
        &self.attributes
    }

    /// Mutable per-vertex payload.
    pub fn attributes_mut(&mut self) -> &mut T::VertexAttributes {
        &mut self.attributes
    }

    pub(crate) fn set_id(&mut self, id: VertexId) {
        self.id = id;
    }

    pub(crate) fn set_mesh(&mut self, mesh: MeshTag) {
        self.mesh = mesh;
    }
}

impl<T: MeshTraits> Flagged for VertexData<T> {
    fn flags(&self) -> &Flags {
        &self.flags
    }
}

/// A vertex resolved through its mesh.
pub struct Vertex<'m, T: MeshTraits> {
    mesh: &'m Mesh<T>,
    id: VertexId,
}

impl<T: MeshTraits> Clone for Vertex<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: MeshTraits> Copy for Vertex<'_, T> {}

impl<T: MeshTraits> Deref for Vertex<'_, T> {
    type Target = VertexData<T>;

    fn deref(&self) -> &VertexData<T> {
        &self.mesh.vertices[self.id]
    }
}

impl<'m, T: MeshTraits> Vertex<'m, T> {
    pub(crate) fn new(mesh: &'m Mesh<T>, id: VertexId) -> Self {
        Self { mesh, id }
    }

    /// The stored vertex data.
    #[must_use]
    pub fn data(&self) -> &'m VertexData<T> {
        &self.mesh.vertices[self.id]
    }

    /// One outgoing halfedge, or `None` for an isolated vertex.
    #[must_use]
    pub fn halfedge(&self) -> Option<Halfedge<'m, T>> {
        let halfedge = self.data().halfedge;
        (!halfedge.is_null()).then(|| Halfedge::new(self.mesh, halfedge))
    }
}
