use slotmap::Key;
use tracing::warn;

use crate::attributes::MeshTraits;
use crate::error::TopologyError;
use crate::topology::{
    is_surface_boundary, Flagged, HalfedgeData, IdDisplay, Mesh, SeamId, MAX_LOOP_ITERATIONS,
};

/// Verifies the structural invariants of a mesh.
///
/// Checked on live entities only:
/// - every face ring is closed, at least three long, and owned by its face;
/// - halfedge partners are mutual and run in opposite directions;
/// - every vertex's outgoing halfedge is live and starts at the vertex;
/// - seam rings are closed and seam partners are mutual;
/// - a seam is a border exactly when the partner of its first halfedge is
///   missing or has no surface, and otherwise its partner seam's run covers
///   that partner halfedge;
/// - every attached seam has a non-empty run of live boundary halfedges of a
///   single surface.
pub struct CheckMesh;

impl CheckMesh {
    /// Creates a new `CheckMesh` query.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Executes the check, returning every problem found. An empty result
    /// means the mesh is consistent.
    #[must_use]
    pub fn execute<T: MeshTraits>(&self, mesh: &Mesh<T>) -> Vec<TopologyError> {
        let mut problems = Vec::new();
        check_faces(mesh, &mut problems);
        check_halfedges(mesh, &mut problems);
        check_vertices(mesh, &mut problems);
        for seam in mesh.seam_ids() {
            check_seam(mesh, seam, &mut problems);
        }
        for problem in &problems {
            warn!("{problem}");
        }
        problems
    }
}

impl Default for CheckMesh {
    fn default() -> Self {
        Self::new()
    }
}

fn problem(problems: &mut Vec<TopologyError>, message: String) {
    problems.push(TopologyError::InvalidTopology(message));
}

fn check_faces<T: MeshTraits>(mesh: &Mesh<T>, problems: &mut Vec<TopologyError>) {
    for face in mesh.face_ids() {
        let first = mesh.faces[face].halfedge_id();
        if !mesh.halfedges.contains_key(first) {
            problem(problems, format!("face {} has no ring", IdDisplay(face)));
            continue;
        }
        let mut current = first;
        let mut length = 0;
        loop {
            let data = &mesh.halfedges[current];
            if data.deleted() || data.face_id() != face {
                problem(
                    problems,
                    format!(
                        "face {} ring reaches foreign halfedge {}",
                        IdDisplay(face),
                        IdDisplay(current)
                    ),
                );
                break;
            }
            let next = data.next_id();
            if mesh.halfedges.get(next).map(|n| n.prev_id()) != Some(current) {
                problem(
                    problems,
                    format!("halfedge {} next/prev mismatch", IdDisplay(current)),
                );
                break;
            }
            length += 1;
            current = next;
            if current == first {
                if length < 3 {
                    problem(
                        problems,
                        format!("face {} has only {length} sides", IdDisplay(face)),
                    );
                }
                break;
            }
            if length > MAX_LOOP_ITERATIONS {
                problem(problems, format!("face {} ring does not close", IdDisplay(face)));
                break;
            }
        }
    }
}

fn check_halfedges<T: MeshTraits>(mesh: &Mesh<T>, problems: &mut Vec<TopologyError>) {
    for h in mesh.halfedge_ids() {
        let data = &mesh.halfedges[h];
        let partner = data.partner_id();
        if partner.is_null() {
            continue;
        }
        let Some(other) = mesh.halfedges.get(partner).filter(|p| !p.deleted()) else {
            problem(
                problems,
                format!("halfedge {} has a dead partner", IdDisplay(h)),
            );
            continue;
        };
        let destination = |d: &HalfedgeData| mesh.halfedges[d.next_id()].vertex_id();
        if other.partner_id() != h
            || other.vertex_id() != destination(data)
            || destination(other) != data.vertex_id()
        {
            problem(
                problems,
                format!(
                    "halfedges {} and {} are not opposite partners",
                    IdDisplay(h),
                    IdDisplay(partner)
                ),
            );
        }
    }
}

fn check_vertices<T: MeshTraits>(mesh: &Mesh<T>, problems: &mut Vec<TopologyError>) {
    for v in mesh.vertex_ids() {
        let outgoing = mesh.vertices[v].halfedge_id();
        if outgoing.is_null() {
            continue;
        }
        let ok = mesh
            .halfedges
            .get(outgoing)
            .is_some_and(|h| !h.deleted() && h.vertex_id() == v);
        if !ok {
            problem(
                problems,
                format!("vertex {} has a bad outgoing halfedge", IdDisplay(v)),
            );
        }
    }
}

fn check_seam<T: MeshTraits>(mesh: &Mesh<T>, id: SeamId, problems: &mut Vec<TopologyError>) {
    let data = &mesh.seams[id];
    let live = |s: SeamId| mesh.seams.get(s).is_some_and(|s| !s.deleted());

    let (next, prev) = (data.next_id(), data.prev_id());
    if !live(next) || !live(prev) {
        problem(problems, format!("seam {} has a dead ring link", IdDisplay(id)));
        return;
    }
    if mesh.seams[next].prev_id() != id || mesh.seams[prev].next_id() != id {
        problem(problems, format!("seam {} ring is not closed", IdDisplay(id)));
        return;
    }

    let partner = data.partner_id();
    if !partner.is_null() && (!live(partner) || mesh.seams[partner].partner_id() != id) {
        problem(
            problems,
            format!("seam {} partner is not mutual", IdDisplay(id)),
        );
    }

    let first = data.halfedge_id();
    if first.is_null() {
        return;
    }
    if mesh.halfedges.get(first).is_none_or(Flagged::deleted) {
        problem(
            problems,
            format!("seam {} starts at a dead halfedge", IdDisplay(id)),
        );
        return;
    }

    let Ok(seam) = mesh.seam(id) else {
        return;
    };
    // A seam is a border exactly when nothing with a surface lies across its
    // first halfedge.
    let far = mesh.halfedges[first].partner_id();
    let far_border = !mesh.halfedges.contains_key(far) || mesh.halfedge_surface_id(far).is_null();
    if seam.border() != far_border {
        problem(
            problems,
            format!(
                "seam {} border flag disagrees with halfedge {}",
                IdDisplay(id),
                IdDisplay(first)
            ),
        );
    } else if live(partner) {
        let covered = mesh
            .seam(partner)
            .is_ok_and(|p| p.halfedges().ids().any(|h| h == far));
        if !covered {
            problem(
                problems,
                format!(
                    "seam {} partner {} does not cover halfedge {}",
                    IdDisplay(id),
                    IdDisplay(partner),
                    IdDisplay(far)
                ),
            );
        }
    }
    let surface = seam.surface_id();
    let mut length = 0;
    for h in seam.halfedges().ids() {
        length += 1;
        let dead = mesh.halfedges[h].deleted();
        if dead || mesh.halfedge_surface_id(h) != surface || !is_surface_boundary(mesh, h) {
            problem(
                problems,
                format!(
                    "seam {} run leaves its surface boundary at halfedge {}",
                    IdDisplay(id),
                    IdDisplay(h)
                ),
            );
            break;
        }
    }
    if length == 0 {
        problem(problems, format!("seam {} has an empty run", IdDisplay(id)));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::fixtures;

    #[test]
    fn fixtures_are_consistent() {
        let (mesh, _) = fixtures::two_surface_strip();
        assert!(CheckMesh::new().execute(&mesh).is_empty());
        let (mesh, _) = fixtures::two_face_surface();
        assert!(CheckMesh::new().execute(&mesh).is_empty());
    }

    #[test]
    fn broken_ring_is_reported() {
        let (mut mesh, strip) = fixtures::two_surface_strip();
        mesh.seam_mut(strip.top_shared)
            .unwrap()
            .set_next_id(strip.top_shared);
        let problems = CheckMesh::new().execute(&mesh);
        assert!(!problems.is_empty());
        assert!(problems
            .iter()
            .all(|p| matches!(p, TopologyError::InvalidTopology(_))));
    }

    #[test]
    fn one_sided_partner_is_reported() {
        let (mut mesh, strip) = fixtures::two_surface_strip();
        mesh.seam_mut(strip.side_shared)
            .unwrap()
            .set_partner_id(SeamId::null());
        // `top_shared` loses mutuality and `side_shared` claims to be a border.
        let problems = CheckMesh::new().execute(&mesh);
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn border_flag_must_match_the_halfedges() {
        let (mut mesh, strip) = fixtures::two_surface_strip();
        for seam in [strip.top_shared, strip.side_shared] {
            mesh.seam_mut(seam).unwrap().set_partner_id(SeamId::null());
        }
        let problems = CheckMesh::new().execute(&mesh);
        assert_eq!(problems.len(), 2);
        assert!(problems
            .iter()
            .all(|p| p.to_string().contains("border flag disagrees")));
    }

    #[test]
    fn partner_must_cover_the_far_halfedge() {
        let (mut mesh, strip) = fixtures::two_surface_strip();
        mesh.link_seam_partners(strip.top_shared, strip.side_border)
            .unwrap();
        let problems = CheckMesh::new().execute(&mesh);
        assert!(problems
            .iter()
            .any(|p| p.to_string().contains("does not cover")));
    }

    #[test]
    fn dead_vertex_halfedge_is_reported() {
        let (mut mesh, strip) = fixtures::two_surface_strip();
        let v0 = strip.top_vertices[0];
        let foreign = mesh
            .halfedge_ids()
            .find(|&h| mesh.halfedge(h).unwrap().vertex_id() != v0)
            .unwrap();
        mesh.vertex_mut(v0).unwrap().halfedge = foreign;
        assert_eq!(CheckMesh::new().execute(&mesh).len(), 1);
    }
}
