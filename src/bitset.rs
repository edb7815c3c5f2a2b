//! Bond-incidence vectors over GF(2).
//!
//! A ring is an element of the cycle space; its vector has one bit per bond.
//! Ring perception reduces candidate vectors against a growing basis, and the
//! aromaticity classifier XORs fused rings into their perimeter.

use petgraph::graph::EdgeIndex;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct BondSet {
    words: Vec<u64>,
}

impl BondSet {
    pub fn new(num_bonds: usize) -> Self {
        Self {
            words: vec![0; num_bonds.div_ceil(64)],
        }
    }

    pub fn from_bonds(num_bonds: usize, bonds: impl IntoIterator<Item = EdgeIndex>) -> Self {
        let mut set = Self::new(num_bonds);
        for bond in bonds {
            set.insert(bond);
        }
        set
    }

    pub fn insert(&mut self, bond: EdgeIndex) {
        let i = bond.index();
        self.words[i / 64] |= 1u64 << (i % 64);
    }

    pub fn contains(&self, bond: EdgeIndex) -> bool {
        let i = bond.index();
        self.words
            .get(i / 64)
            .is_some_and(|w| w & (1u64 << (i % 64)) != 0)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn xor_with(&mut self, other: &Self) {
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a ^= *b;
        }
    }

    pub fn union_with(&mut self, other: &Self) {
        for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
            *a |= *b;
        }
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    fn leading_bit(&self) -> Option<usize> {
        self.words
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
    }

    fn has_bit(&self, bit: usize) -> bool {
        self.words[bit / 64] & (1u64 << (bit % 64)) != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..64)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| EdgeIndex::new(i * 64 + bit))
        })
    }
}

/// Row-reduced set of independent cycle vectors.
///
/// Every stored row lacks the pivot bit of each row stored before it, so a
/// single sweep in insertion order fully reduces a candidate.
#[derive(Debug, Clone, Default)]
pub(crate) struct CycleBasis {
    rows: Vec<(usize, BondSet)>,
}

impl CycleBasis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rank(&self) -> usize {
        self.rows.len()
    }

    fn reduce(&self, candidate: &BondSet) -> BondSet {
        let mut v = candidate.clone();
        for (pivot, row) in &self.rows {
            if v.has_bit(*pivot) {
                v.xor_with(row);
            }
        }
        v
    }

    /// Adds `candidate` if it is independent of the stored rows.
    pub fn try_insert(&mut self, candidate: &BondSet) -> bool {
        let reduced = self.reduce(candidate);
        match reduced.leading_bit() {
            Some(pivot) => {
                self.rows.push((pivot, reduced));
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub fn spans(&self, candidate: &BondSet) -> bool {
        self.reduce(candidate).is_empty()
    }
}
