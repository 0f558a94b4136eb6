pub mod elements;
pub mod face;
pub mod flags;
pub mod halfedge;
pub mod seam;
pub mod submesh;
pub mod surface;
pub mod vertex;

mod editing;

#[cfg(test)]
pub(crate) mod fixtures;

pub use elements::{ElementIds, Elements, ElementsIter, ElementsMut, ElementsPolicy};
pub use face::{Face, FaceData, FaceHalfedges, FaceId};
pub use flags::{Flagged, Flags};
pub use halfedge::{
    is_surface_boundary, next_surface_halfedge_id, prev_surface_halfedge_id, Halfedge,
    HalfedgeData, HalfedgeId,
};
pub use seam::{Seam, SeamData, SeamHalfedges, SeamId, SeamMut, SeamRing};
pub use submesh::{Submesh, SubmeshData, SubmeshId};
pub use surface::{Surface, SurfaceData, SurfaceId};
pub use vertex::{Vertex, VertexData, VertexId};

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::{Key, SlotMap};

use crate::attributes::{DefaultTraits, MeshTraits};
use crate::error::TopologyError;

/// Upper bound on the number of steps of any walk around a vertex or a
/// boundary loop. Walks on a malformed mesh could otherwise never end.
pub const MAX_LOOP_ITERATIONS: usize = 8192;

/// Identifies the mesh that owns an entity.
///
/// Every entity records the tag of its owner. Cloning a mesh mints a new tag
/// and re-tags every entity, so an entity can always tell which arena it
/// was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct MeshTag(u64);

impl MeshTag {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Placeholder carried by entity data before the mesh adopts it.
    pub(crate) const DETACHED: Self = Self(0);
}

/// Renders an identifier as `<index>v<version>`, or `null`.
#[derive(Clone, Copy)]
pub struct IdDisplay<K>(pub K);

impl<K: Key> fmt::Display for IdDisplay<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{:?}", self.0.data())
        }
    }
}

/// Central arena that owns every topological entity of a mesh.
///
/// Entities reference each other through typed IDs (generational indices).
/// All navigation resolves an ID through the mesh; no entity ever holds a
/// reference to another. Deletion is logical: the entity's `deleted` flag
/// is set and its slot stays occupied until
/// [`CollectGarbage`](crate::operations::maintenance::CollectGarbage) runs.
#[derive(Debug)]
pub struct Mesh<T: MeshTraits = DefaultTraits> {
    tag: MeshTag,
    pub(crate) vertices: SlotMap<VertexId, VertexData<T>>,
    pub(crate) halfedges: SlotMap<HalfedgeId, HalfedgeData>,
    pub(crate) faces: SlotMap<FaceId, FaceData<T>>,
    pub(crate) surfaces: SlotMap<SurfaceId, SurfaceData<T>>,
    pub(crate) submeshes: SlotMap<SubmeshId, SubmeshData<T>>,
    pub(crate) seams: SlotMap<SeamId, SeamData>,
    /// Maps `(origin, destination)` to the live halfedge running between them.
    pub(crate) edge_index: HashMap<(VertexId, VertexId), HalfedgeId>,
}

impl<T: MeshTraits> Default for Mesh<T> {
    fn default() -> Self {
        Self {
            tag: MeshTag::fresh(),
            vertices: SlotMap::with_key(),
            halfedges: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            surfaces: SlotMap::with_key(),
            submeshes: SlotMap::with_key(),
            seams: SlotMap::with_key(),
            edge_index: HashMap::new(),
        }
    }
}

impl<T: MeshTraits> Clone for Mesh<T> {
    /// Clones the mesh under a fresh owner tag.
    fn clone(&self) -> Self {
        let mut mesh = Self {
            tag: MeshTag::fresh(),
            vertices: self.vertices.clone(),
            halfedges: self.halfedges.clone(),
            faces: self.faces.clone(),
            surfaces: self.surfaces.clone(),
            submeshes: self.submeshes.clone(),
            seams: self.seams.clone(),
            edge_index: self.edge_index.clone(),
        };
        mesh.adopt_all();
        mesh
    }
}

impl<T: MeshTraits> Mesh<T> {
    /// Creates a new, empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn tag(&self) -> MeshTag {
        self.tag
    }

    /// Re-tags every entity with this mesh's tag.
    pub(crate) fn adopt_all(&mut self) {
        let tag = self.tag;
        self.vertices.values_mut().for_each(|v| v.set_mesh(tag));
        self.halfedges.values_mut().for_each(|h| h.set_mesh(tag));
        self.faces.values_mut().for_each(|f| f.set_mesh(tag));
        self.surfaces.values_mut().for_each(|s| s.set_mesh(tag));
        self.submeshes.values_mut().for_each(|s| s.set_mesh(tag));
        self.seams.values_mut().for_each(|s| s.set_mesh(tag));
    }

    // --- Resolution ---

    /// Resolves a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is null or unknown to this mesh.
    pub fn vertex(&self, id: VertexId) -> Result<Vertex<'_, T>, TopologyError> {
        self.vertices
            .get(id)
            .map(|_| Vertex::new(self, id))
            .ok_or_else(|| not_found("vertex", id))
    }

    /// Resolves a vertex for mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is null or unknown to this mesh.
    pub fn vertex_mut(&mut self, id: VertexId) -> Result<&mut VertexData<T>, TopologyError> {
        self.vertices
            .get_mut(id)
            .ok_or_else(|| not_found("vertex", id))
    }

    /// Resolves a halfedge.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is null or unknown to this mesh.
    pub fn halfedge(&self, id: HalfedgeId) -> Result<Halfedge<'_, T>, TopologyError> {
        self.halfedges
            .get(id)
            .map(|_| Halfedge::new(self, id))
            .ok_or_else(|| not_found("halfedge", id))
    }

    /// Resolves a halfedge for mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is null or unknown to this mesh.
    pub fn halfedge_mut(&mut self, id: HalfedgeId) -> Result<&mut HalfedgeData, TopologyError> {
        self.halfedges
            .get_mut(id)
            .ok_or_else(|| not_found("halfedge", id))
    }

    /// Resolves a face.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is null or unknown to this mesh.
    pub fn face(&self, id: FaceId) -> Result<Face<'_, T>, TopologyError> {
        self.faces
            .get(id)
            .map(|_| Face::new(self, id))
            .ok_or_else(|| not_found("face", id))
    }

    /// Resolves a face for mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is null or unknown to this mesh.
    pub fn face_mut(&mut self, id: FaceId) -> Result<&mut FaceData<T>, TopologyError> {
        self.faces.get_mut(id).ok_or_else(|| not_found("face", id))
    }

    /// Resolves a surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is null or unknown to this mesh.
    pub fn surface(&self, id: SurfaceId) -> Result<Surface<'_, T>, TopologyError> {
        self.surfaces
            .get(id)
            .map(|_| Surface::new(self, id))
            .ok_or_else(|| not_found("surface", id))
    }

    /// Resolves a surface for mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is null or unknown to this mesh.
    pub fn surface_mut(&mut self, id: SurfaceId) -> Result<&mut SurfaceData<T>, TopologyError> {
        self.surfaces
            .get_mut(id)
            .ok_or_else(|| not_found("surface", id))
    }

    /// Resolves a submesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is null or unknown to this mesh.
    pub fn submesh(&self, id: SubmeshId) -> Result<Submesh<'_, T>, TopologyError> {
        self.submeshes
            .get(id)
            .map(|_| Submesh::new(self, id))
            .ok_or_else(|| not_found("submesh", id))
    }

    /// Resolves a submesh for mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is null or unknown to this mesh.
    pub fn submesh_mut(&mut self, id: SubmeshId) -> Result<&mut SubmeshData<T>, TopologyError> {
        self.submeshes
            .get_mut(id)
            .ok_or_else(|| not_found("submesh", id))
    }

    /// Resolves a seam.
    ///
    /// Deleted seams still resolve, so their diagnostics can be printed.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is null or unknown to this mesh.
    pub fn seam(&self, id: SeamId) -> Result<Seam<'_, T>, TopologyError> {
        self.seams
            .get(id)
            .map(|_| Seam::new(self, id))
            .ok_or_else(|| not_found("seam", id))
    }

    /// Resolves a seam for mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is null or unknown to this mesh.
    pub fn seam_mut(&mut self, id: SeamId) -> Result<SeamMut<'_, T>, TopologyError> {
        if self.seams.contains_key(id) {
            Ok(SeamMut::new(self, id))
        } else {
            Err(not_found("seam", id))
        }
    }

    // --- Iteration over live entities ---

    /// IDs of all live vertices.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        live_ids(&self.vertices)
    }

    /// IDs of all live halfedges.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfedgeId> + '_ {
        live_ids(&self.halfedges)
    }

    /// IDs of all live faces.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        live_ids(&self.faces)
    }

    /// IDs of all live surfaces.
    pub fn surface_ids(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        live_ids(&self.surfaces)
    }

    /// IDs of all live submeshes.
    pub fn submesh_ids(&self) -> impl Iterator<Item = SubmeshId> + '_ {
        live_ids(&self.submeshes)
    }

    /// IDs of all live seams.
    pub fn seam_ids(&self) -> impl Iterator<Item = SeamId> + '_ {
        live_ids(&self.seams)
    }

    /// Number of live vertices.
    #[must_use]
    pub fn n_vertices(&self) -> usize {
        self.vertex_ids().count()
    }

    /// Number of live halfedges.
    #[must_use]
    pub fn n_halfedges(&self) -> usize {
        self.halfedge_ids().count()
    }

    /// Number of live faces.
    #[must_use]
    pub fn n_faces(&self) -> usize {
        self.face_ids().count()
    }

    /// Number of live surfaces.
    #[must_use]
    pub fn n_surfaces(&self) -> usize {
        self.surface_ids().count()
    }

    /// Number of live submeshes.
    #[must_use]
    pub fn n_submeshes(&self) -> usize {
        self.submesh_ids().count()
    }

    /// Number of live seams.
    #[must_use]
    pub fn n_seams(&self) -> usize {
        self.seam_ids().count()
    }

    /// Surface owning the face of `halfedge`, or null for a halfedge without
    /// a face.
    pub(crate) fn halfedge_surface_id(&self, halfedge: HalfedgeId) -> SurfaceId {
        let face = self.halfedges[halfedge].face_id();
        if face.is_null() {
            SurfaceId::null()
        } else {
            self.faces[face].surface_id()
        }
    }
}

fn live_ids<K: Key, V: Flagged>(map: &SlotMap<K, V>) -> impl Iterator<Item = K> + '_ {
    map.iter()
        .filter(|(_, data)| !data.deleted())
        .map(|(id, _)| id)
}

fn not_found<K: Key>(kind: &str, id: K) -> TopologyError {
    TopologyError::EntityNotFound(format!("{kind} {}", IdDisplay(id)))
}
