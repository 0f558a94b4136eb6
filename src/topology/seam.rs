//! Seams: the second topological layer of the mesh.
//!
//! A seam groups a run of halfedges lying on one side of an attribute
//! discontinuity, such as a UV cut or the border between two surfaces. The
//! seams of one surface boundary loop form a closed, doubly-linked ring
//! (`next` / `prev`), parallel to the way halfedges ring around a face. A
//! seam's partner is the seam covering the same run from the other side, or
//! null on a mesh border.
//!
//! No run length is stored. A seam's run starts at its first halfedge and
//! follows the surface boundary loop up to, but excluding, the first
//! halfedge of the next seam in the ring.

use std::fmt;
use std::ops::{Deref, DerefMut};

use slotmap::Key;

use crate::attributes::MeshTraits;

use super::elements::{Elements, ElementsMut, ElementsPolicy};
use super::flags::{Flagged, Flags};
use super::halfedge::{
    next_surface_halfedge_id, prev_surface_halfedge_id, Halfedge, HalfedgeData, HalfedgeId,
};
use super::surface::{Surface, SurfaceId};
use super::{IdDisplay, Mesh, MeshTag};

slotmap::new_key_type! {
    /// Unique identifier for a seam in the mesh.
    pub struct SeamId;
}

/// Data associated with a seam.
#[derive(Debug, Clone)]
pub struct SeamData {
    id: SeamId,
    mesh: MeshTag,
    flags: Flags,
    name: String,
    partner: SeamId,
    next: SeamId,
    prev: SeamId,
    halfedge: HalfedgeId,
}

impl SeamData {
    /// A seam forming a ring of its own, with no partner.
    pub(crate) fn new(id: SeamId, mesh: MeshTag, name: String, halfedge: HalfedgeId) -> Self {
        Self {
            id,
            mesh,
            flags: Flags::new(),
            name,
            partner: SeamId::null(),
            next: id,
            prev: id,
            halfedge,
        }
    }

    /// This seam's ID.
    #[must_use]
    pub fn id(&self) -> SeamId {
        self.id
    }

    /// Name of the seam, usually that of the neighbouring surface.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the seam.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The seam on the other side of the same run, or null on a border.
    #[must_use]
    pub fn partner_id(&self) -> SeamId {
        self.partner
    }

    /// Sets the partner seam without touching the partner's own link.
    pub fn set_partner_id(&mut self, partner: SeamId) {
        self.partner = partner;
    }

    /// Returns `true` if this seam lies on a mesh border.
    #[must_use]
    pub fn border(&self) -> bool {
        self.partner.is_null()
    }

    /// Next seam of the ring.
    #[must_use]
    pub fn next_id(&self) -> SeamId {
        self.next
    }

    /// Sets the next seam without updating its `prev` link.
    pub fn set_next_id(&mut self, next: SeamId) {
        self.next = next;
    }

    /// Previous seam of the ring.
    #[must_use]
    pub fn prev_id(&self) -> SeamId {
        self.prev
    }

    /// Sets the previous seam without updating its `next` link.
    pub fn set_prev_id(&mut self, prev: SeamId) {
        self.prev = prev;
    }

    /// First halfedge of the run.
    #[must_use]
    pub fn halfedge_id(&self) -> HalfedgeId {
        self.halfedge
    }

    /// Moves the start of the run.
    pub fn set_halfedge_id(&mut self, halfedge: HalfedgeId) {
        self.halfedge = halfedge;
    }

    pub(crate) fn mesh_tag(&self) -> MeshTag {
        self.mesh
    }

    /// Re-keys the seam after it moved to another slot.
    pub(crate) fn set_id(&mut self, id: SeamId) {
        self.id = id;
    }

    /// Hands the seam over to another mesh.
    pub(crate) fn set_mesh(&mut self, mesh: MeshTag) {
        self.mesh = mesh;
    }
}

impl Flagged for SeamData {
    fn flags(&self) -> &Flags {
        &self.flags
    }
}

/// A seam resolved through its mesh.
pub struct Seam<'m, T: MeshTraits> {
    mesh: &'m Mesh<T>,
    id: SeamId,
}

impl<T: MeshTraits> Clone for Seam<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: MeshTraits> Copy for Seam<'_, T> {}

impl<T: MeshTraits> Deref for Seam<'_, T> {
    type Target = SeamData;

    fn deref(&self) -> &SeamData {
        &self.mesh.seams[self.id]
    }
}

impl<'m, T: MeshTraits> Seam<'m, T> {
    pub(crate) fn new(mesh: &'m Mesh<T>, id: SeamId) -> Self {
        Self { mesh, id }
    }

    /// The mesh this seam was resolved from.
    #[must_use]
    pub fn mesh(&self) -> &'m Mesh<T> {
        self.mesh
    }

    /// The stored seam data, borrowed for the lifetime of the mesh.
    #[must_use]
    pub fn data(&self) -> &'m SeamData {
        &self.mesh.seams[self.id]
    }

    /// Asserts that the stored ID and owner tag agree with the mesh this
    /// seam was resolved from.
    pub(crate) fn check_mesh(&self) {
        let data = self.data();
        debug_assert_eq!(data.id, self.id, "seam stored under a foreign id");
        debug_assert_eq!(data.mesh, self.mesh.tag(), "seam owned by another mesh");
    }

    /// Next seam of the ring.
    #[must_use]
    pub fn next(&self) -> Seam<'m, T> {
        self.check_mesh();
        debug_assert!(!self.data().next.is_null(), "seam is not linked into a ring");
        Seam::new(self.mesh, self.data().next)
    }

    /// Previous seam of the ring.
    #[must_use]
    pub fn prev(&self) -> Seam<'m, T> {
        self.check_mesh();
        debug_assert!(!self.data().prev.is_null(), "seam is not linked into a ring");
        Seam::new(self.mesh, self.data().prev)
    }

    /// The seam covering the same run from the other side, or `None` on a
    /// mesh border.
    #[must_use]
    pub fn partner(&self) -> Option<Seam<'m, T>> {
        self.check_mesh();
        let partner = self.data().partner;
        (!partner.is_null()).then(|| Seam::new(self.mesh, partner))
    }

    /// First halfedge of the run, or `None` while the seam is detached.
    #[must_use]
    pub fn halfedge(&self) -> Option<Halfedge<'m, T>> {
        self.check_mesh();
        let halfedge = self.data().halfedge;
        (!halfedge.is_null()).then(|| Halfedge::new(self.mesh, halfedge))
    }

    /// The halfedge run of this seam.
    #[must_use]
    pub fn halfedges(&self) -> Elements<'m, T, SeamHalfedges> {
        self.check_mesh();
        Elements::new(self.mesh, self.id)
    }

    /// Length of the run. Walks the run on every call.
    #[must_use]
    pub fn halfedge_count(&self) -> usize {
        self.halfedges().size()
    }

    /// The seams of this seam's ring, starting with this one.
    #[must_use]
    pub fn ring(&self) -> Elements<'m, T, SeamRing> {
        self.check_mesh();
        Elements::new(self.mesh, self.id)
    }

    /// Surface owning the face of the first halfedge, or null while the
    /// seam is detached.
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.halfedge()
            .map_or_else(SurfaceId::null, |halfedge| halfedge.surface_id())
    }

    /// Surface on the far side of the first halfedge, or null on a border.
    #[must_use]
    pub fn partner_surface_id(&self) -> SurfaceId {
        if self.border() {
            return SurfaceId::null();
        }
        self.halfedge()
            .and_then(|halfedge| halfedge.partner())
            .map_or_else(SurfaceId::null, |partner| partner.surface_id())
    }

    /// The owning surface, or `None` while the seam is detached.
    #[must_use]
    pub fn surface(&self) -> Option<Surface<'m, T>> {
        let surface = self.surface_id();
        (!surface.is_null()).then(|| Surface::new(self.mesh, surface))
    }

    /// `submesh/surface/seam`, or `//seam` while the seam is not attached to
    /// a surface. Meant for diagnostics.
    #[must_use]
    pub fn extended_name(&self) -> String {
        match self.surface() {
            Some(surface) => format!("{}/{}", surface.extended_name(), self.data().name),
            None => format!("//{}", self.data().name),
        }
    }
}

impl<T: MeshTraits> fmt::Display for Seam<'_, T> {
    /// One diagnostic line: flags, id, partner (or `border`), next, prev,
    /// first halfedge and surface. A deleted seam prints flags and id only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data();
        write!(f, "{} {}", data.flags, IdDisplay(self.id))?;
        if !data.deleted() {
            if data.border() {
                write!(f, " border")?;
            } else {
                write!(f, " {}", IdDisplay(data.partner))?;
            }
            write!(
                f,
                " {} {} {} {}",
                IdDisplay(data.next),
                IdDisplay(data.prev),
                IdDisplay(data.halfedge),
                IdDisplay(self.surface_id())
            )?;
        }
        writeln!(f)
    }
}

/// A seam resolved for mutation.
pub struct SeamMut<'m, T: MeshTraits> {
    mesh: &'m mut Mesh<T>,
    id: SeamId,
}

impl<T: MeshTraits> Deref for SeamMut<'_, T> {
    type Target = SeamData;

    fn deref(&self) -> &SeamData {
        &self.mesh.seams[self.id]
    }
}

impl<T: MeshTraits> DerefMut for SeamMut<'_, T> {
    fn deref_mut(&mut self) -> &mut SeamData {
        &mut self.mesh.seams[self.id]
    }
}

impl<'m, T: MeshTraits> SeamMut<'m, T> {
    pub(crate) fn new(mesh: &'m mut Mesh<T>, id: SeamId) -> Self {
        Self { mesh, id }
    }

    /// Shared view of the same seam.
    #[must_use]
    pub fn as_seam(&self) -> Seam<'_, T> {
        Seam::new(self.mesh, self.id)
    }

    /// Mutable walk over the halfedge run.
    pub fn halfedges_mut(&mut self) -> ElementsMut<'_, T, SeamHalfedges> {
        self.as_seam().check_mesh();
        ElementsMut::new(self.mesh, self.id)
    }
}

/// Walks the halfedge run of a seam.
///
/// Steps with [`next_surface_halfedge_id`], so the run follows the boundary
/// loop of one surface across faces. The run ends before the first halfedge
/// of the next seam, before re-entering its own first halfedge (a ring of
/// one seam owns the whole loop), or where the surface would change.
pub struct SeamHalfedges;

impl SeamHalfedges {
    /// First halfedge of the next seam, which bounds the run.
    fn stop<T: MeshTraits>(mesh: &Mesh<T>, seam: SeamId) -> HalfedgeId {
        let data = &mesh.seams[seam];
        if data.next.is_null() {
            data.halfedge
        } else {
            mesh.seams[data.next].halfedge
        }
    }
}

impl<T: MeshTraits> ElementsPolicy<T> for SeamHalfedges {
    type Container = SeamId;
    type Element = HalfedgeId;
    type Item = HalfedgeData;

    fn first(mesh: &Mesh<T>, seam: SeamId) -> HalfedgeId {
        mesh.seams[seam].halfedge
    }

    fn last(mesh: &Mesh<T>, seam: SeamId) -> HalfedgeId {
        if mesh.seams[seam].halfedge.is_null() {
            return HalfedgeId::null();
        }
        let stop = Self::stop(mesh, seam);
        if stop.is_null() {
            return HalfedgeId::null();
        }
        prev_surface_halfedge_id(mesh, stop)
    }

    fn step_forward(mesh: &Mesh<T>, seam: SeamId, current: HalfedgeId) -> HalfedgeId {
        debug_assert!(!current.is_null(), "stepped past the end of a seam run");
        let first = mesh.seams[seam].halfedge;
        let next = next_surface_halfedge_id(mesh, current);
        if next.is_null()
            || next == Self::stop(mesh, seam)
            || next == first
            || mesh.halfedge_surface_id(next) != mesh.halfedge_surface_id(first)
        {
            HalfedgeId::null()
        } else {
            next
        }
    }

    fn step_backward(mesh: &Mesh<T>, seam: SeamId, current: HalfedgeId) -> HalfedgeId {
        debug_assert!(!current.is_null(), "stepped past the start of a seam run");
        let first = mesh.seams[seam].halfedge;
        if current == first {
            return HalfedgeId::null();
        }
        let prev = prev_surface_halfedge_id(mesh, current);
        if prev.is_null() || mesh.halfedge_surface_id(prev) != mesh.halfedge_surface_id(first) {
            HalfedgeId::null()
        } else {
            prev
        }
    }

    fn get(mesh: &Mesh<T>, halfedge: HalfedgeId) -> &HalfedgeData {
        &mesh.halfedges[halfedge]
    }

    fn get_mut(mesh: &mut Mesh<T>, halfedge: HalfedgeId) -> &mut HalfedgeData {
        &mut mesh.halfedges[halfedge]
    }
}

/// Walks the seams of a ring, starting at the container seam.
pub struct SeamRing;

impl<T: MeshTraits> ElementsPolicy<T> for SeamRing {
    type Container = SeamId;
    type Element = SeamId;
    type Item = SeamData;

    fn first(_mesh: &Mesh<T>, seam: SeamId) -> SeamId {
        seam
    }

    fn last(mesh: &Mesh<T>, seam: SeamId) -> SeamId {
        mesh.seams[seam].prev
    }

    fn step_forward(mesh: &Mesh<T>, seam: SeamId, current: SeamId) -> SeamId {
        debug_assert!(!current.is_null(), "stepped past the end of a seam ring");
        let next = mesh.seams[current].next;
        if next == seam {
            SeamId::null()
        } else {
            next
        }
    }

    fn step_backward(mesh: &Mesh<T>, seam: SeamId, current: SeamId) -> SeamId {
        debug_assert!(!current.is_null(), "stepped past the start of a seam ring");
        if current == seam {
            SeamId::null()
        } else {
            mesh.seams[current].prev
        }
    }

    fn get(mesh: &Mesh<T>, seam: SeamId) -> &SeamData {
        &mesh.seams[seam]
    }

    fn get_mut(mesh: &mut Mesh<T>, seam: SeamId) -> &mut SeamData {
        &mut mesh.seams[seam]
    }
}
