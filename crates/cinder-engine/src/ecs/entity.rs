use std::fmt;

/// Opaque entity identity.
///
/// Ids are allocated from 0 upwards and never reused while the owning
/// [`World`](super::World) is alive. Holding an `EntityId` does not keep the
/// entity alive; it is a weak, lookup-only reference.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EntityId(pub(crate) u64);

impl EntityId {
    /// Returns the raw integer value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id counter.
#[derive(Debug, Default, Clone)]
pub(crate) struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub(crate) fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Moves the counter back. Only used to exercise the collision check.
    #[cfg(test)]
    pub(crate) fn rewind_to(&mut self, next: u64) {
        self.next = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_from_zero_in_order() {
        let mut ids = IdAllocator::default();
        let got: Vec<u64> = (0..4).map(|_| ids.allocate().raw()).collect();
        assert_eq!(got, vec![0, 1, 2, 3]);
    }

    #[test]
    fn display_uses_hash_prefix() {
        assert_eq!(EntityId(7).to_string(), "#7");
    }
}
