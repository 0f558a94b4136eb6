use slotmap::Key;
use tracing::debug;

use crate::attributes::{Attributes, MeshTraits};
use crate::error::Result;
use crate::math::Point2;
use crate::topology::{HalfedgeId, Mesh, SeamId, VertexId};

/// Reverses the winding of every face.
///
/// Each halfedge keeps its ID, partner and face but runs the other way. Seam
/// runs are re-anchored on what used to be their last halfedge and every
/// seam ring is reversed, so runs, rings and partners stay consistent.
/// Attribute bundles are inverted: normals and tangents are negated, and
/// texture coordinates can optionally be mirrored in `u`.
pub struct FlipOrientation {
    mirror_texcoords: bool,
}

impl FlipOrientation {
    /// Creates a new `FlipOrientation` operation.
    #[must_use]
    pub fn new(mirror_texcoords: bool) -> Self {
        Self { mirror_texcoords }
    }

    /// Executes the flip in place.
    ///
    /// # Errors
    ///
    /// Returns an error if a live face or seam cannot be resolved.
    pub fn execute<T: MeshTraits>(&self, mesh: &mut Mesh<T>) -> Result<()> {
        let mut anchors: Vec<(SeamId, HalfedgeId)> = Vec::new();
        for id in mesh.seam_ids() {
            let last = mesh
                .seam(id)?
                .halfedges()
                .ids()
                .next_back()
                .unwrap_or_else(HalfedgeId::null);
            anchors.push((id, last));
        }

        let faces: Vec<_> = mesh.face_ids().collect();
        for &face in &faces {
            let ring: Vec<HalfedgeId> = mesh.face(face)?.halfedges().ids().collect();
            let origins: Vec<VertexId> = ring
                .iter()
                .map(|&h| mesh.halfedges[h].vertex_id())
                .collect();
            let n = ring.len();
            for (i, &h) in ring.iter().enumerate() {
                let data = &mut mesh.halfedges[h];
                data.next = ring[(i + n - 1) % n];
                data.prev = ring[(i + 1) % n];
                data.vertex = origins[(i + 1) % n];
            }
        }
        mesh.rebuild_edge_index();

        for id in mesh.vertex_ids().collect::<Vec<_>>() {
            let outgoing = mesh.vertices[id].halfedge_id();
            if !outgoing.is_null() {
                mesh.vertices[id].halfedge = mesh.halfedges[outgoing].next_id();
            }
        }

        for (id, last) in anchors {
            let mut seam = mesh.seam_mut(id)?;
            let (next, prev) = (seam.next_id(), seam.prev_id());
            seam.set_next_id(prev);
            seam.set_prev_id(next);
            seam.set_halfedge_id(last);
        }

        let texcoord: fn(Point2) -> Point2 = if self.mirror_texcoords {
            mirror_u
        } else {
            keep
        };
        for vertex in mesh.vertices.values_mut() {
            vertex.attributes_mut().invert(&texcoord);
        }
        for face in mesh.faces.values_mut() {
            face.attributes_mut().invert(&texcoord);
        }
        for surface in mesh.surfaces.values_mut() {
            surface.attributes_mut().invert(&texcoord);
        }
        for submesh in mesh.submeshes.values_mut() {
            submesh.attributes_mut().invert(&texcoord);
        }

        debug!("flipped {} faces", faces.len());
        Ok(())
    }
}

fn mirror_u(uv: Point2) -> Point2 {
    Point2::new(1.0 - uv.x, uv.y)
}

fn keep(uv: Point2) -> Point2 {
    uv
}
