use std::cell::Cell;
use std::fmt;

const DELETED: u8 = 0b001;
const CHECKED: u8 = 0b010;
const MARKED: u8 = 0b100;

/// Status word carried by every topological entity.
///
/// The bits live in a [`Cell`], so they can be toggled through a shared
/// reference. Status is bookkeeping (visited marks, selections, tombstones)
/// and not part of the entity's topology or geometry, which lets read-only
/// passes such as validation mark entities as they go.
///
/// When `deleted` is set, the `checked` and `marked` bits carry no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    bits: Cell<u8>,
}

impl Flags {
    /// Creates an empty status word.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the entity has been logically deleted.
    #[must_use]
    pub fn deleted(&self) -> bool {
        self.bits.get() & DELETED != 0
    }

    /// Returns `true` if the entity carries the `checked` mark.
    #[must_use]
    pub fn checked(&self) -> bool {
        self.bits.get() & CHECKED != 0
    }

    /// Returns `true` if the entity carries the `marked` mark.
    #[must_use]
    pub fn marked(&self) -> bool {
        self.bits.get() & MARKED != 0
    }

    /// Sets or clears the `deleted` bit.
    ///
    /// Clearing it does not give back any meaning to the other two bits;
    /// callers reviving an entity should [`reset`](Self::reset) it as well.
    pub fn set_deleted(&self, value: bool) {
        self.set_bit(DELETED, value);
    }

    /// Sets or clears the `checked` bit.
    pub fn set_checked(&self, value: bool) {
        self.set_bit(CHECKED, value);
    }

    /// Sets or clears the `marked` bit.
    pub fn set_marked(&self, value: bool) {
        self.set_bit(MARKED, value);
    }

    /// Returns `true` if the entity carries no live status information.
    ///
    /// A deleted entity is always unset.
    #[must_use]
    pub fn unset(&self) -> bool {
        self.deleted() || self.bits.get() & (CHECKED | MARKED) == 0
    }

    /// Returns `true` if no bit at all is set, `deleted` included.
    #[must_use]
    pub fn empty(&self) -> bool {
        self.bits.get() == 0
    }

    /// Clears the transient `checked` and `marked` bits, keeping `deleted`.
    pub fn reset(&self) {
        self.bits.set(self.bits.get() & DELETED);
    }

    /// Zeroes every bit. Only used when a slot is being reinitialized.
    pub fn clear(&self) {
        self.bits.set(0);
    }

    fn set_bit(&self, bit: u8, value: bool) {
        let bits = self.bits.get();
        self.bits.set(if value { bits | bit } else { bits & !bit });
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = [
            if self.deleted() { 'D' } else { '-' },
            if self.checked() { 'C' } else { '-' },
            if self.marked() { 'M' } else { '-' },
        ];
        mask.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

/// Implemented by every entity that carries a [`Flags`] word.
///
/// The status methods forward to the flags. `reset` and `clear` are
/// overridable so an entity kind can extend what "clear transient status"
/// or "reinitialize this slot" means for it.
pub trait Flagged {
    /// The entity's status word.
    fn flags(&self) -> &Flags;

    fn deleted(&self) -> bool {
        self.flags().deleted()
    }

    fn checked(&self) -> bool {
        self.flags().checked()
    }

    fn marked(&self) -> bool {
        self.flags().marked()
    }

    fn set_deleted(&self, value: bool) {
        self.flags().set_deleted(value);
    }

    fn set_checked(&self, value: bool) {
        self.flags().set_checked(value);
    }

    fn set_marked(&self, value: bool) {
        self.flags().set_marked(value);
    }

    fn unset(&self) -> bool {
        self.flags().unset()
    }

    fn empty(&self) -> bool {
        self.flags().empty()
    }

    fn reset(&self) {
        self.flags().reset();
    }

    fn clear(&self) {
        self.flags().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_states() -> Vec<Flags> {
        (0..8u8)
            .map(|bits| {
                let flags = Flags::new();
                flags.set_deleted(bits & DELETED != 0);
                flags.set_checked(bits & CHECKED != 0);
                flags.set_marked(bits & MARKED != 0);
                flags
            })
            .collect()
    }

    #[test]
    fn unset_matches_definition_for_every_state() {
        for flags in all_states() {
            assert_eq!(
                flags.unset(),
                flags.deleted() || (!flags.checked() && !flags.marked()),
                "state {flags}"
            );
        }
    }

    #[test]
    fn reset_never_changes_deleted() {
        for flags in all_states() {
            let deleted = flags.deleted();
            flags.reset();
            assert_eq!(flags.deleted(), deleted);
            assert!(!flags.checked());
            assert!(!flags.marked());
        }
    }

    #[test]
    fn clear_always_yields_empty() {
        for flags in all_states() {
            flags.clear();
            assert!(flags.empty());
            assert!(flags.unset());
        }
    }

    #[test]
    fn bits_toggle_independently() {
        let flags = Flags::new();
        flags.set_marked(true);
        flags.set_checked(true);
        flags.set_checked(false);
        assert!(flags.marked());
        assert!(!flags.checked());
        assert!(!flags.deleted());
        assert!(!flags.unset());
    }

    #[test]
    fn deleted_dominates_unset() {
        let flags = Flags::new();
        flags.set_deleted(true);
        flags.set_checked(true);
        assert!(flags.unset());
        assert!(!flags.empty());
        assert_eq!(flags.to_string(), "DC-");
    }

    struct Entity(Flags);

    impl Flagged for Entity {
        fn flags(&self) -> &Flags {
            &self.0
        }
    }

    #[test]
    fn entities_forward_empty() {
        let entity = Entity(Flags::new());
        assert!(entity.empty());
        entity.set_deleted(true);
        assert!(!entity.empty());
        assert!(entity.unset());
        entity.clear();
        assert!(entity.empty());
    }

    #[test]
    fn display_renders_mask() {
        let flags = Flags::new();
        assert_eq!(flags.to_string(), "---");
        flags.set_marked(true);
        assert_eq!(flags.to_string(), "--M");
    }
}
