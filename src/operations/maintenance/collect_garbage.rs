use std::fmt;

use slotmap::{Key, SecondaryMap, SlotMap};
use tracing::info;

use crate::attributes::MeshTraits;
use crate::topology::{
    FaceData, Flagged, HalfedgeData, Mesh, SeamData, SubmeshData, SurfaceData, VertexData,
};

/// Number of tombstoned entities dropped per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GarbageReport {
    pub vertices: usize,
    pub halfedges: usize,
    pub faces: usize,
    pub surfaces: usize,
    pub submeshes: usize,
    pub seams: usize,
}

impl GarbageReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.vertices + self.halfedges + self.faces + self.surfaces + self.submeshes + self.seams
    }
}

impl fmt::Display for GarbageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vertices, {} halfedges, {} faces, {} surfaces, {} submeshes, {} seams",
            self.vertices, self.halfedges, self.faces, self.surfaces, self.submeshes, self.seams
        )
    }
}

/// Physically drops every tombstoned entity.
///
/// Survivors are moved into fresh arenas, so every ID changes, including
/// those of live entities. Any ID held from before the pass is invalid
/// afterwards. References to dropped entities become null.
pub struct CollectGarbage;

impl CollectGarbage {
    /// Creates a new `CollectGarbage` operation.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the pass and reports what was dropped.
    pub fn execute<T: MeshTraits>(&self, mesh: &mut Mesh<T>) -> GarbageReport {
        let (vertices, vertex_map, removed_vertices) =
            compact(std::mem::take(&mut mesh.vertices), VertexData::set_id);
        let (halfedges, halfedge_map, removed_halfedges) =
            compact(std::mem::take(&mut mesh.halfedges), HalfedgeData::set_id);
        let (faces, face_map, removed_faces) =
            compact(std::mem::take(&mut mesh.faces), FaceData::set_id);
        let (surfaces, surface_map, removed_surfaces) =
            compact(std::mem::take(&mut mesh.surfaces), SurfaceData::set_id);
        let (submeshes, submesh_map, removed_submeshes) =
            compact(std::mem::take(&mut mesh.submeshes), SubmeshData::set_id);
        let (seams, seam_map, removed_seams) =
            compact(std::mem::take(&mut mesh.seams), SeamData::set_id);

        mesh.vertices = vertices;
        mesh.halfedges = halfedges;
        mesh.faces = faces;
        mesh.surfaces = surfaces;
        mesh.submeshes = submeshes;
        mesh.seams = seams;

        for vertex in mesh.vertices.values_mut() {
            vertex.halfedge = remap(&halfedge_map, vertex.halfedge);
        }
        for halfedge in mesh.halfedges.values_mut() {
            halfedge.vertex = remap(&vertex_map, halfedge.vertex);
            halfedge.next = remap(&halfedge_map, halfedge.next);
            halfedge.prev = remap(&halfedge_map, halfedge.prev);
            halfedge.partner = remap(&halfedge_map, halfedge.partner);
            halfedge.face = remap(&face_map, halfedge.face);
        }
        for face in mesh.faces.values_mut() {
            face.halfedge = remap(&halfedge_map, face.halfedge);
            face.surface = remap(&surface_map, face.surface);
        }
        for surface in mesh.surfaces.values_mut() {
            surface.submesh = remap(&submesh_map, surface.submesh);
        }
        for seam in mesh.seams.values_mut() {
            seam.set_partner_id(remap(&seam_map, seam.partner_id()));
            seam.set_next_id(remap(&seam_map, seam.next_id()));
            seam.set_prev_id(remap(&seam_map, seam.prev_id()));
            seam.set_halfedge_id(remap(&halfedge_map, seam.halfedge_id()));
        }
        mesh.rebuild_edge_index();

        let report = GarbageReport {
            vertices: removed_vertices,
            halfedges: removed_halfedges,
            faces: removed_faces,
            surfaces: removed_surfaces,
            submeshes: removed_submeshes,
            seams: removed_seams,
        };
        info!("collected garbage: {report}");
        report
    }
}

impl Default for CollectGarbage {
    fn default() -> Self {
        Self::new()
    }
}

/// Moves the live entries of `slots` into a fresh arena. Returns the arena,
/// the old-to-new key map and the number of dropped entries.
fn compact<K: Key, V: Flagged>(
    slots: SlotMap<K, V>,
    set_id: fn(&mut V, K),
) -> (SlotMap<K, V>, SecondaryMap<K, K>, usize) {
    let mut kept = SlotMap::with_capacity_and_key(slots.len());
    let mut map = SecondaryMap::new();
    let mut removed = 0;
    for (old, mut data) in slots {
        if data.deleted() {
            removed += 1;
            continue;
        }
        let new = kept.insert_with_key(|id| {
            set_id(&mut data, id);
            data
        });
        map.insert(old, new);
    }
    (kept, map, removed)
}

fn remap<K: Key>(map: &SecondaryMap<K, K>, id: K) -> K {
    map.get(id).copied().unwrap_or_else(K::null)
}
