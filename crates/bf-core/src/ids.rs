use core::fmt;
use core::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};

/// Compact, stable identifier.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        // index+1 must be nonzero
        Self(NonZeroU32::new(index.wrapping_add(1)).unwrap_or(NonZeroU32::MIN))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Identity of one constructed machine; every state it allocates carries it.
pub type MachineId = Id;

static NEXT_MACHINE: AtomicU32 = AtomicU32::new(0);

/// Hand out a process-unique machine id.
pub fn next_machine_id() -> MachineId {
    Id::from_index(NEXT_MACHINE.fetch_add(1, Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip_index() {
        for i in [0_u32, 1, 2, 42, 10_000] {
            let id = Id::from_index(i);
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<Id>(),
            core::mem::size_of::<Option<Id>>()
        );
    }

    #[test]
    fn machine_ids_are_distinct() {
        let a = next_machine_id();
        let b = next_machine_id();
        assert_ne!(a, b);
    }
}
