//! Small meshes shared by the test suites.

#![allow(clippy::unwrap_used)]

use slotmap::Key;

use crate::attributes::{Position, PositionTraits};
use crate::math::Point3;
use crate::operations::seams::GenerateSeams;

use super::{FaceId, HalfedgeId, Mesh, SeamId, SubmeshId, SurfaceId, VertexId};

/// Routes `tracing` output to the test harness. Safe to call repeatedly.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Two unit quads side by side, each in its own surface of submesh `body`:
///
/// ```text
/// v3 ---- v4 ---- v5
///  | top  | side  |
/// v0 ---- v1 ---- v2
/// ```
pub(crate) struct Strip {
    pub body: SubmeshId,
    pub top: SurfaceId,
    pub side: SurfaceId,
    pub top_face: FaceId,
    pub side_face: FaceId,
    /// Ring order of the top face: v0, v1, v4, v3.
    pub top_vertices: [VertexId; 4],
    /// v1 -> v4, in the top face.
    pub shared_top: HalfedgeId,
    /// v4 -> v1, in the side face.
    pub shared_side: HalfedgeId,
    /// Seam of `top` along the shared edge.
    pub top_shared: SeamId,
    /// Seam of `side` along the shared edge.
    pub side_shared: SeamId,
    /// Seam of `top` along the mesh border.
    pub top_border: SeamId,
    /// Seam of `side` along the mesh border.
    pub side_border: SeamId,
}

fn grid_vertices(mesh: &mut Mesh<PositionTraits>) -> Vec<VertexId> {
    [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (1.0, 1.0), (2.0, 1.0)]
        .into_iter()
        .map(|(x, y)| mesh.add_vertex(Position::from(Point3::new(x, y, 0.0))))
        .collect()
}

fn seam_starting_at(mesh: &Mesh<PositionTraits>, halfedge: HalfedgeId) -> SeamId {
    mesh.seam_ids()
        .find(|&id| mesh.seam(id).unwrap().halfedge_id() == halfedge)
        .unwrap()
}

fn other_seam(mesh: &Mesh<PositionTraits>, surface: SurfaceId, seam: SeamId) -> SeamId {
    mesh.surface(surface)
        .unwrap()
        .seam_ids()
        .find(|&id| id != seam)
        .unwrap()
}

pub(crate) fn two_surface_strip() -> (Mesh<PositionTraits>, Strip) {
    init_tracing();
    let mut mesh = Mesh::new();
    let body = mesh.add_submesh("body", ());
    let top = mesh.add_surface(body, "top", ()).unwrap();
    let side = mesh.add_surface(body, "side", ()).unwrap();
    let v = grid_vertices(&mut mesh);
    let top_vertices = [v[0], v[1], v[4], v[3]];
    let top_face = mesh.add_face(top, &top_vertices, ()).unwrap();
    let side_face = mesh.add_face(side, &[v[1], v[2], v[5], v[4]], ()).unwrap();
    GenerateSeams::all().execute(&mut mesh).unwrap();

    let shared_top = mesh.edge_index[&(v[1], v[4])];
    let shared_side = mesh.edge_index[&(v[4], v[1])];
    let top_shared = seam_starting_at(&mesh, shared_top);
    let side_shared = seam_starting_at(&mesh, shared_side);
    let top_border = other_seam(&mesh, top, top_shared);
    let side_border = other_seam(&mesh, side, side_shared);

    let strip = Strip {
        body,
        top,
        side,
        top_face,
        side_face,
        top_vertices,
        shared_top,
        shared_side,
        top_shared,
        side_shared,
        top_border,
        side_border,
    };
    (mesh, strip)
}

/// The same two quads, both in one free-standing surface.
pub(crate) fn two_face_surface() -> (Mesh<PositionTraits>, SurfaceId) {
    init_tracing();
    let mut mesh = Mesh::new();
    let surface = mesh.add_surface(SubmeshId::null(), "plane", ()).unwrap();
    let v = grid_vertices(&mut mesh);
    mesh.add_face(surface, &[v[0], v[1], v[4], v[3]], ()).unwrap();
    mesh.add_face(surface, &[v[1], v[2], v[5], v[4]], ()).unwrap();
    GenerateSeams::all().execute(&mut mesh).unwrap();
    (mesh, surface)
}

/// Four unit quads around a centre vertex. The north-east quad is surface
/// `a`, the north-west and south-east quads are surface `b` and the
/// south-west quad is surface `c`, all in submesh `grid`:
///
/// ```text
/// 6 ---- 7 ---- 8
/// |  b   |  a   |
/// 3 ---- 4 ---- 5
/// |  c   |  b   |
/// 0 ---- 1 ---- 2
/// ```
///
/// Both quads of `b` touch `a` and `c`, but only at the centre vertex do
/// they touch each other.
pub(crate) fn checkered_grid() -> (Mesh<PositionTraits>, [SurfaceId; 3]) {
    init_tracing();
    let mut mesh = Mesh::new();
    let grid = mesh.add_submesh("grid", ());
    let a = mesh.add_surface(grid, "a", ()).unwrap();
    let b = mesh.add_surface(grid, "b", ()).unwrap();
    let c = mesh.add_surface(grid, "c", ()).unwrap();
    let v: Vec<_> = (0..9)
        .map(|i| {
            let (x, y) = (f64::from(i % 3), f64::from(i / 3));
            mesh.add_vertex(Position::from(Point3::new(x, y, 0.0)))
        })
        .collect();
    mesh.add_face(c, &[v[0], v[1], v[4], v[3]], ()).unwrap();
    mesh.add_face(b, &[v[1], v[2], v[5], v[4]], ()).unwrap();
    mesh.add_face(b, &[v[3], v[4], v[7], v[6]], ()).unwrap();
    mesh.add_face(a, &[v[4], v[5], v[8], v[7]], ()).unwrap();
    GenerateSeams::all().execute(&mut mesh).unwrap();
    (mesh, [a, b, c])
}
