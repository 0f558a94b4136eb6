//! Lazy, non-owning views over a linked run of entities.
//!
//! A view binds a mesh and the ID of a container entity (a face, a seam).
//! The container kind supplies an [`ElementsPolicy`] that knows where the
//! run starts and ends and how to step along it. Nothing is collected up
//! front: every step calls back into the mesh.

use std::marker::PhantomData;

use slotmap::Key;

use crate::attributes::MeshTraits;

use super::flags::Flagged;
use super::Mesh;

/// How to walk the elements of one kind of container.
///
/// `end` is the sentinel returned by the step functions once the run is
/// exhausted in either direction. Stepping from the sentinel is a contract
/// violation.
pub trait ElementsPolicy<T: MeshTraits> {
    /// ID type of the container entity.
    type Container: Key;
    /// ID type of the elements.
    type Element: Key;
    /// Stored data of one element.
    type Item: Flagged + 'static;

    /// First element of the run, or the sentinel if the run is empty.
    fn first(mesh: &Mesh<T>, container: Self::Container) -> Self::Element;

    /// Last element of the run, or the sentinel if the run is empty.
    fn last(mesh: &Mesh<T>, container: Self::Container) -> Self::Element;

    /// The sentinel.
    fn end(_mesh: &Mesh<T>, _container: Self::Container) -> Self::Element {
        Self::Element::null()
    }

    /// Element after `current`, or the sentinel.
    fn step_forward(
        mesh: &Mesh<T>,
        container: Self::Container,
        current: Self::Element,
    ) -> Self::Element;

    /// Element before `current`, or the sentinel.
    fn step_backward(
        mesh: &Mesh<T>,
        container: Self::Container,
        current: Self::Element,
    ) -> Self::Element;

    /// Number of elements. Walks the whole run.
    fn size(mesh: &Mesh<T>, container: Self::Container) -> usize {
        let end = Self::end(mesh, container);
        let mut current = Self::first(mesh, container);
        let mut count = 0;
        while current != end {
            count += 1;
            current = Self::step_forward(mesh, container, current);
        }
        count
    }

    /// Shared access to one element.
    fn get(mesh: &Mesh<T>, element: Self::Element) -> &Self::Item;

    /// Mutable access to one element.
    fn get_mut(mesh: &mut Mesh<T>, element: Self::Element) -> &mut Self::Item;
}

/// Shared view over the elements of one container.
pub struct Elements<'m, T: MeshTraits, P: ElementsPolicy<T>> {
    mesh: &'m Mesh<T>,
    container: P::Container,
    policy: PhantomData<P>,
}

impl<T: MeshTraits, P: ElementsPolicy<T>> Clone for Elements<'_, T, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: MeshTraits, P: ElementsPolicy<T>> Copy for Elements<'_, T, P> {}

impl<'m, T: MeshTraits, P: ElementsPolicy<T>> Elements<'m, T, P> {
    /// Binds a view to `container`.
    #[must_use]
    pub fn new(mesh: &'m Mesh<T>, container: P::Container) -> Self {
        Self {
            mesh,
            container,
            policy: PhantomData,
        }
    }

    /// The container this view walks.
    #[must_use]
    pub fn container(&self) -> P::Container {
        self.container
    }

    /// Number of elements. This walks the run, so it is O(n).
    #[must_use]
    pub fn size(&self) -> usize {
        P::size(self.mesh, self.container)
    }

    /// Returns `true` if the run has no element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        P::first(self.mesh, self.container) == P::end(self.mesh, self.container)
    }

    /// The first element, if any.
    #[must_use]
    pub fn first(&self) -> Option<&'m P::Item> {
        self.ids().next().map(|id| access::<T, P>(self.mesh, id))
    }

    /// The last element, if any.
    #[must_use]
    pub fn last(&self) -> Option<&'m P::Item> {
        self.ids().next_back().map(|id| access::<T, P>(self.mesh, id))
    }

    /// Iterates over the element IDs.
    #[must_use]
    pub fn ids(&self) -> ElementIds<'m, T, P> {
        ElementIds::new(self.mesh, self.container)
    }

    /// Iterates over the elements.
    #[must_use]
    pub fn iter(&self) -> ElementsIter<'m, T, P> {
        ElementsIter { ids: self.ids() }
    }
}

impl<'m, T: MeshTraits, P: ElementsPolicy<T>> IntoIterator for Elements<'m, T, P> {
    type Item = &'m P::Item;
    type IntoIter = ElementsIter<'m, T, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'m, T: MeshTraits, P: ElementsPolicy<T>> IntoIterator for &Elements<'m, T, P> {
    type Item = &'m P::Item;
    type IntoIter = ElementsIter<'m, T, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn access<'m, T: MeshTraits, P: ElementsPolicy<T>>(
    mesh: &'m Mesh<T>,
    element: P::Element,
) -> &'m P::Item {
    let item = P::get(mesh, element);
    debug_assert!(!item.deleted(), "access to a deleted element");
    item
}

/// Double-ended iterator over element IDs. Pulls one step per call.
pub struct ElementIds<'m, T: MeshTraits, P: ElementsPolicy<T>> {
    mesh: &'m Mesh<T>,
    container: P::Container,
    front: P::Element,
    back: P::Element,
    end: P::Element,
    done: bool,
}

impl<'m, T: MeshTraits, P: ElementsPolicy<T>> ElementIds<'m, T, P> {
    fn new(mesh: &'m Mesh<T>, container: P::Container) -> Self {
        let end = P::end(mesh, container);
        let front = P::first(mesh, container);
        let back = P::last(mesh, container);
        Self {
            mesh,
            container,
            front,
            back,
            end,
            done: front == end || back == end,
        }
    }
}

impl<T: MeshTraits, P: ElementsPolicy<T>> Iterator for ElementIds<'_, T, P> {
    type Item = P::Element;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.front;
        debug_assert!(current != self.end, "stepped past the end of a run");
        if current == self.back {
            self.done = true;
        } else {
            self.front = P::step_forward(self.mesh, self.container, current);
            self.done = self.front == self.end;
        }
        Some(current)
    }
}

impl<T: MeshTraits, P: ElementsPolicy<T>> DoubleEndedIterator for ElementIds<'_, T, P> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.back;
        debug_assert!(current != self.end, "stepped past the start of a run");
        if current == self.front {
            self.done = true;
        } else {
            self.back = P::step_backward(self.mesh, self.container, current);
            self.done = self.back == self.end;
        }
        Some(current)
    }
}

/// Double-ended iterator over shared element references.
pub struct ElementsIter<'m, T: MeshTraits, P: ElementsPolicy<T>> {
    ids: ElementIds<'m, T, P>,
}

impl<'m, T: MeshTraits, P: ElementsPolicy<T>> Iterator for ElementsIter<'m, T, P> {
    type Item = &'m P::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let mesh = self.ids.mesh;
        self.ids.next().map(|id| access::<T, P>(mesh, id))
    }
}

impl<T: MeshTraits, P: ElementsPolicy<T>> DoubleEndedIterator for ElementsIter<'_, T, P> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let mesh = self.ids.mesh;
        self.ids.next_back().map(|id| access::<T, P>(mesh, id))
    }
}

/// Mutable view over the elements of one container.
///
/// Hands out one `&mut` element per call to
/// [`next_element`](Self::next_element). The step to the following element
/// is taken before the reference is handed out, so edits to the current
/// element's links do not affect the walk.
pub struct ElementsMut<'m, T: MeshTraits, P: ElementsPolicy<T>> {
    mesh: &'m mut Mesh<T>,
    container: P::Container,
    cursor: P::Element,
}

impl<'m, T: MeshTraits, P: ElementsPolicy<T>> ElementsMut<'m, T, P> {
    /// Binds a mutable view to `container`.
    pub fn new(mesh: &'m mut Mesh<T>, container: P::Container) -> Self {
        let cursor = P::first(mesh, container);
        Self {
            mesh,
            container,
            cursor,
        }
    }

    /// Number of elements. This walks the run, so it is O(n).
    #[must_use]
    pub fn size(&self) -> usize {
        P::size(self.mesh, self.container)
    }

    /// Advances to the next element and returns it.
    pub fn next_element(&mut self) -> Option<&mut P::Item> {
        let end = P::end(self.mesh, self.container);
        if self.cursor == end {
            return None;
        }
        let current = self.cursor;
        self.cursor = P::step_forward(self.mesh, self.container, current);
        let item = P::get_mut(self.mesh, current);
        debug_assert!(!item.deleted(), "access to a deleted element");
        Some(item)
    }

    /// Calls `f` on every remaining element.
    pub fn for_each_element(mut self, mut f: impl FnMut(&mut P::Item)) {
        while let Some(item) = self.next_element() {
            f(item);
        }
    }
}
