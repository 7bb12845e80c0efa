//! Ordered element sequence.

use crate::element::ElementSpec;
use crate::error::{LatticeError, LatticeResult};

/// Flat, ordered list of elements; line composition is already expanded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lattice {
    elements: Vec<ElementSpec>,
}

impl Lattice {
    pub fn new(elements: Vec<ElementSpec>) -> Self {
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[ElementSpec] {
        &self.elements
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementSpec> {
        self.elements.iter()
    }

    pub fn get(&self, index: usize) -> LatticeResult<&ElementSpec> {
        self.elements.get(index).ok_or(LatticeError::IndexOutOfRange {
            index,
            len: self.elements.len(),
        })
    }

    /// Indices of every element called `name` (names may repeat).
    pub fn find(&self, name: &str) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.name() == name)
            .map(|(i, _)| i)
            .collect()
    }

    /// Swap in a replacement element at `index`.
    pub fn replace(&mut self, index: usize, element: ElementSpec) -> LatticeResult<ElementSpec> {
        let len = self.elements.len();
        let slot = self
            .elements
            .get_mut(index)
            .ok_or(LatticeError::IndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, element))
    }
}

impl<'a> IntoIterator for &'a Lattice {
    type Item = &'a ElementSpec;
    type IntoIter = std::slice::Iter<'a, ElementSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl FromIterator<ElementSpec> for Lattice {
    fn from_iter<I: IntoIterator<Item = ElementSpec>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
