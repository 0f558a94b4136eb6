use std::ops::Deref;

use crate::attributes::MeshTraits;

use super::flags::{Flagged, Flags};
use super::surface::SurfaceId;
use super::{Mesh, MeshTag};

slotmap::new_key_type! {
    /// Unique identifier for a submesh in the mesh.
    pub struct SubmeshId;
}

/// Data associated with a submesh, the top-level grouping of surfaces.
#[derive(Debug, Clone)]
pub struct SubmeshData<T: MeshTraits> {
    id: SubmeshId,
    mesh: MeshTag,
    flags: Flags,
    name: String,
    attributes: T::SubmeshAttributes,
}

impl<T: MeshTraits> SubmeshData<T> {
    pub(crate) fn new(
        id: SubmeshId,
        mesh: MeshTag,
        name: String,
        attributes: T::SubmeshAttributes,
    ) -> Self {
        Self {
            id,
            mesh,
            flags: Flags::new(),
            name,
            attributes,
        }
    }

    /// This submesh's ID.
    #[must_use]
    pub fn id(&self) -> SubmeshId {
        self.id
    }

    /// Name of the submesh.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the submesh.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Per-submesh payload.
    #[must_use]
    pub fn attributes(&self) -> &T::SubmeshAttributes {
        &self.attributes
    }

    /// Mutable per-submesh payload.
    pub fn attributes_mut(&mut self) -> &mut T::SubmeshAttributes {
        &mut self.attributes
    }

    pub(crate) fn set_id(&mut self, id: SubmeshId) {
        self.id = id;
    }

    pub(crate) fn set_mesh(&mut self, mesh: MeshTag) {
        self.mesh = mesh;
    }
}

impl<T: MeshTraits> Flagged for SubmeshData<T> {
    fn flags(&self) -> &Flags {
        &self.flags
    }
}

/// A submesh resolved through its mesh.
pub struct Submesh<'m, T: MeshTraits> {
    mesh: &'m Mesh<T>,
    id: SubmeshId,
}

impl<T: MeshTraits> Clone for Submesh<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: MeshTraits> Copy for Submesh<'_, T> {}

impl<T: MeshTraits> Deref for Submesh<'_, T> {
    type Target = SubmeshData<T>;

    fn deref(&self) -> &SubmeshData<T> {
        &self.mesh.submeshes[self.id]
    }
}

impl<'m, T: MeshTraits> Submesh<'m, T> {
    pub(crate) fn new(mesh: &'m Mesh<T>, id: SubmeshId) -> Self {
        Self { mesh, id }
    }

    /// The stored submesh data.
    #[must_use]
    pub fn data(&self) -> &'m SubmeshData<T> {
        &self.mesh.submeshes[self.id]
    }

    /// Live surfaces of this submesh.
    pub fn surface_ids(&self) -> impl Iterator<Item = SurfaceId> + 'm {
        let (mesh, id) = (self.mesh, self.id);
        mesh.surface_ids()
            .filter(move |&surface| mesh.surfaces[surface].submesh == id)
    }
}
