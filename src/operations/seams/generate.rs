use std::collections::{HashMap, HashSet};

use slotmap::Key;
use tracing::{debug, warn};

use crate::attributes::MeshTraits;
use crate::error::{Result, TopologyError};
use crate::topology::{
    is_surface_boundary, next_surface_halfedge_id, Flagged, HalfedgeId, IdDisplay, Mesh, SeamId,
    SurfaceId, MAX_LOOP_ITERATIONS,
};

/// Name given to seams that lie on a mesh border.
pub const BORDER_SEAM_NAME: &str = "border";

/// Rebuilds the seam rings of some or all surfaces from the halfedge
/// topology.
///
/// Each boundary loop of a target surface is split into runs wherever the
/// surface on the other side changes, or where the halfedges on the other
/// side stop following each other along the neighbour's boundary. Every run becomes one seam, named after
/// the neighbouring surface (or [`BORDER_SEAM_NAME`]), and the seams of a
/// loop are linked into one ring. Finally each new seam is paired with the
/// seam that covers the partner of its first halfedge.
pub struct GenerateSeams {
    surfaces: Option<Vec<SurfaceId>>,
}

impl GenerateSeams {
    /// Regenerates the seams of every live surface.
    #[must_use]
    pub fn all() -> Self {
        Self { surfaces: None }
    }

    /// Regenerates the seams of a single surface.
    #[must_use]
    pub fn for_surface(surface: SurfaceId) -> Self {
        Self {
            surfaces: Some(vec![surface]),
        }
    }

    /// Regenerates the seams of the given surfaces.
    #[must_use]
    pub fn for_surfaces(surfaces: Vec<SurfaceId>) -> Self {
        Self {
            surfaces: Some(surfaces),
        }
    }

    /// Executes the operation and returns the number of seams created.
    ///
    /// Every boundary loop is walked before anything changes, so a failed
    /// walk leaves the existing seams in place. Then the old seams of the
    /// target surfaces are tombstoned; seams of other surfaces that pointed
    /// at them become borders until they are re-paired.
    ///
    /// # Errors
    ///
    /// Returns an error if a target surface is missing or deleted, or if a
    /// boundary loop does not close.
    pub fn execute<T: MeshTraits>(&self, mesh: &mut Mesh<T>) -> Result<usize> {
        let targets = self.targets(mesh)?;
        let boundary: Vec<HalfedgeId> = mesh
            .halfedge_ids()
            .filter(|&h| {
                targets.contains(&mesh.halfedge_surface_id(h)) && is_surface_boundary(mesh, h)
            })
            .collect();
        let loops = collect_loops(mesh, &boundary)?;

        for &surface in &targets {
            mesh.delete_surface_seams(surface)?;
        }
        let mut created = Vec::new();
        for boundary_loop in &loops {
            created.extend(build_ring(mesh, boundary_loop)?);
        }
        link_partners(mesh, &created)?;

        debug!(
            "generated {} seams over {} boundary loops of {} surfaces",
            created.len(),
            loops.len(),
            targets.len()
        );
        Ok(created.len())
    }

    fn targets<T: MeshTraits>(&self, mesh: &Mesh<T>) -> Result<HashSet<SurfaceId>> {
        let Some(surfaces) = &self.surfaces else {
            return Ok(mesh.surface_ids().collect());
        };
        let mut targets = HashSet::with_capacity(surfaces.len());
        for &surface in surfaces {
            if mesh.surface(surface)?.deleted() {
                return Err(TopologyError::EntityDeleted(format!(
                    "surface {}",
                    IdDisplay(surface)
                ))
                .into());
            }
            targets.insert(surface);
        }
        Ok(targets)
    }
}

/// Splits the boundary halfedges into closed loops.
fn collect_loops<T: MeshTraits>(
    mesh: &Mesh<T>,
    boundary: &[HalfedgeId],
) -> Result<Vec<Vec<HalfedgeId>>> {
    let mut visited: HashSet<HalfedgeId> = HashSet::with_capacity(boundary.len());
    let mut loops = Vec::new();
    for &start in boundary {
        if visited.contains(&start) {
            continue;
        }
        let mut boundary_loop = Vec::new();
        let mut current = start;
        loop {
            if !visited.insert(current) || boundary_loop.len() >= MAX_LOOP_ITERATIONS {
                return Err(TopologyError::InvalidTopology(format!(
                    "boundary loop through halfedge {} does not close",
                    IdDisplay(start)
                ))
                .into());
            }
            boundary_loop.push(current);
            current = next_surface_halfedge_id(mesh, current);
            if current.is_null() {
                return Err(TopologyError::InvalidTopology(format!(
                    "boundary loop through halfedge {} is open",
                    IdDisplay(start)
                ))
                .into());
            }
            if current == start {
                break;
            }
        }
        loops.push(boundary_loop);
    }
    Ok(loops)
}

/// Creates the seams of one boundary loop and links them into a ring.
fn build_ring<T: MeshTraits>(
    mesh: &mut Mesh<T>,
    boundary_loop: &[HalfedgeId],
) -> Result<Vec<SeamId>> {
    let partners: Vec<HalfedgeId> = boundary_loop
        .iter()
        .map(|&h| mesh.halfedges[h].partner_id())
        .collect();
    let neighbours: Vec<SurfaceId> = partners
        .iter()
        .map(|&p| {
            if p.is_null() {
                SurfaceId::null()
            } else {
                mesh.halfedge_surface_id(p)
            }
        })
        .collect();

    // A run also ends where the far side stops being one contiguous run of
    // the neighbour's boundary, so runs pair up one to one.
    let n = boundary_loop.len();
    let mut starts: Vec<usize> = (0..n)
        .filter(|&i| {
            let before = (i + n - 1) % n;
            neighbours[i] != neighbours[before]
                || (!partners[i].is_null()
                    && next_surface_halfedge_id(&*mesh, partners[i]) != partners[before])
        })
        .collect();
    if starts.is_empty() {
        starts.push(0);
    }

    let mut seams = Vec::with_capacity(starts.len());
    for i in starts {
        let name = neighbour_name(mesh, neighbours[i]);
        let seam = match seams.last() {
            None => mesh.add_seam(name, boundary_loop[i])?,
            Some(&prev) => mesh.insert_seam_after(prev, name, boundary_loop[i])?,
        };
        seams.push(seam);
    }
    Ok(seams)
}

fn neighbour_name<T: MeshTraits>(mesh: &Mesh<T>, surface: SurfaceId) -> String {
    mesh.surfaces
        .get(surface)
        .map_or_else(|| BORDER_SEAM_NAME.to_owned(), |s| s.name().to_owned())
}

/// Pairs every non-border seam in `created` with the seam covering the
/// partner of its first halfedge.
fn link_partners<T: MeshTraits>(mesh: &mut Mesh<T>, created: &[SeamId]) -> Result<()> {
    let mut owner: HashMap<HalfedgeId, SeamId> = HashMap::new();
    for seam in mesh.seam_ids() {
        for h in mesh.seam(seam)?.halfedges().ids() {
            owner.insert(h, seam);
        }
    }

    for &seam in created {
        let first = mesh.seams[seam].halfedge_id();
        let partner = mesh.halfedges[first].partner_id();
        if partner.is_null() {
            continue;
        }
        match owner.get(&partner) {
            Some(&other) if mesh.seams[seam].partner_id() != other => {
                mesh.link_seam_partners(seam, other)?;
            }
            Some(_) => {}
            None => warn!(
                "no seam covers halfedge {}, seam {} stays a border",
                IdDisplay(partner),
                IdDisplay(seam)
            ),
        }
    }
    Ok(())
}
