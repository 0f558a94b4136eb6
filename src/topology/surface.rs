use std::ops::Deref;

use slotmap::Key;

use crate::attributes::MeshTraits;

use super::face::FaceId;
use super::flags::{Flagged, Flags};
use super::seam::SeamId;
use super::submesh::{Submesh, SubmeshId};
use super::{Mesh, MeshTag};

slotmap::new_key_type! {
    /// Unique identifier for a surface in the mesh.
    pub struct SurfaceId;
}

/// Data associated with a surface.
///
/// A surface groups faces that share material and attribute defaults. Its
/// boundary loops are covered by seam rings.
#[derive(Debug, Clone)]
pub struct SurfaceData<T: MeshTraits> {
    id: SurfaceId,
    mesh: MeshTag,
    flags: Flags,
    name: String,
    pub(crate) submesh: SubmeshId,
    attributes: T::SurfaceAttributes,
}

impl<T: MeshTraits> SurfaceData<T> {
    pub(crate) fn new(
        id: SurfaceId,
        mesh: MeshTag,
        name: String,
        submesh: SubmeshId,
        attributes: T::SurfaceAttributes,
    ) -> Self {
        Self {
            id,
            mesh,
            flags: Flags::new(),
            name,
            submesh,
            attributes,
        }
    }

    /// This surface's ID.
    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Name of the surface.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the surface.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Submesh owning this surface, or null for a free-standing one.
    #[must_use]
    pub fn submesh_id(&self) -> SubmeshId {
        self.submesh
    }

    /// Per-surface payload.
    #[must_use]
    pub fn attributes(&self) -> &T::SurfaceAttributes {
        &self.attributes
    }

    /// Mutable per-surface payload.
    pub fn attributes_mut(&mut self) -> &mut T::SurfaceAttributes {
        &mut self.attributes
    }

    pub(crate) fn set_id(&mut self, id: SurfaceId) {
        self.id = id;
    }

    pub(crate) fn set_mesh(&mut self, mesh: MeshTag) {
        self.mesh = mesh;
    }
}

impl<T: MeshTraits> Flagged for SurfaceData<T> {
    fn flags(&self) -> &Flags {
        &self.flags
    }
}

/// A surface resolved through its mesh.
pub struct Surface<'m, T: MeshTraits> {
    mesh: &'m Mesh<T>,
    id: SurfaceId,
}

impl<T: MeshTraits> Clone for Surface<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: MeshTraits> Copy for Surface<'_, T> {}

impl<T: MeshTraits> Deref for Surface<'_, T> {
    type Target = SurfaceData<T>;

    fn deref(&self) -> &SurfaceData<T> {
        &self.mesh.surfaces[self.id]
    }
}

impl<'m, T: MeshTraits> Surface<'m, T> {
    pub(crate) fn new(mesh: &'m Mesh<T>, id: SurfaceId) -> Self {
        Self { mesh, id }
    }

    /// The stored surface data.
    #[must_use]
    pub fn data(&self) -> &'m SurfaceData<T> {
        &self.mesh.surfaces[self.id]
    }

    /// The owning submesh, or `None` for a free-standing surface.
    #[must_use]
    pub fn submesh(&self) -> Option<Submesh<'m, T>> {
        let submesh = self.data().submesh;
        (!submesh.is_null()).then(|| Submesh::new(self.mesh, submesh))
    }

    /// `submesh/surface`, with an empty submesh part for a free-standing
    /// surface.
    #[must_use]
    pub fn extended_name(&self) -> String {
        let submesh = self.submesh().map(|s| s.data().name()).unwrap_or_default();
        format!("{submesh}/{}", self.data().name())
    }

    /// Live faces of this surface. Scans every face of the mesh.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + 'm {
        let (mesh, id) = (self.mesh, self.id);
        mesh.face_ids()
            .filter(move |&face| mesh.faces[face].surface == id)
    }

    /// Live seams covering the boundary of this surface. Scans every seam of
    /// the mesh.
    pub fn seam_ids(&self) -> impl Iterator<Item = SeamId> + 'm {
        let (mesh, id) = (self.mesh, self.id);
        mesh.seam_ids()
            .filter(move |&seam| mesh.seam(seam).is_ok_and(|s| s.surface_id() == id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::topology::fixtures;

    #[test]
    fn extended_name_joins_submesh_and_surface() {
        let (mesh, strip) = fixtures::two_surface_strip();
        let surface = mesh.surface(strip.top).unwrap();
        assert_eq!(surface.extended_name(), "body/top");
        assert_eq!(surface.submesh().unwrap().id(), strip.body);
    }

    #[test]
    fn seams_and_faces_are_grouped_by_surface() {
        let (mesh, strip) = fixtures::two_surface_strip();
        let top = mesh.surface(strip.top).unwrap();
        assert_eq!(top.face_ids().collect::<Vec<_>>(), vec![strip.top_face]);
        assert_eq!(top.seam_ids().count(), 2);
        let side = mesh.surface(strip.side).unwrap();
        assert_eq!(side.seam_ids().count(), 2);
    }
}
