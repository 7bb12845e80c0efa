//! Element-by-element propagation over a locked state block.

use std::collections::BTreeSet;

use bf_lattice::Lattice;
use tracing::trace;

use crate::error::SimResult;
use crate::snapshot::Snapshot;
use crate::state::StateBlock;

/// Observation results: element index and the state right after it.
pub type Observations = Vec<(usize, Snapshot)>;

/// One bounded pass over a lattice.
pub(crate) struct Propagator<'a> {
    pub lattice: &'a Lattice,
    /// First element to apply; clamped to the lattice length.
    pub start: usize,
    /// Maximum number of elements to apply.
    pub max: usize,
    pub observe: Option<&'a [usize]>,
}

impl Propagator<'_> {
    pub(crate) fn run(&self, block: &mut StateBlock) -> SimResult<Option<Observations>> {
        let len = self.lattice.len();
        let start = self.start.min(len);
        let end = start.saturating_add(self.max).min(len);
        let watch: Option<BTreeSet<usize>> = self.observe.map(|o| o.iter().copied().collect());
        let mut seen = watch.as_ref().map(|_| Vec::new());

        block.next_elem = start;
        for (index, element) in self.lattice.elements()[start..end].iter().enumerate() {
            let index = start + index;
            element.apply(&mut block.payload)?;
            block.next_elem = index + 1;
            trace!(index, element = element.name(), kind = %element.kind(), "applied element");

            if let (Some(watch), Some(seen)) = (&watch, &mut seen) {
                if watch.contains(&index) {
                    seen.push((index, Snapshot::new(block.payload.clone(), block.next_elem)));
                }
            }
        }
        Ok(seen)
    }
}
