//! Topological distances, connected components and the cycle rank.
//!
//! All distances are unweighted bond counts. Pairs of atoms in different
//! components are at distance [`UNREACHABLE`]; zero is reserved for the
//! distance of an atom to itself.

use std::collections::VecDeque;

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::unionfind::UnionFind;

use crate::error::MolError;
use crate::mol::Mol;

/// Distance between atoms that are not connected.
pub const UNREACHABLE: usize = usize::MAX;

/// Symmetric all-pairs distance matrix stored as a packed lower triangle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DistanceMatrix {
    size: usize,
    data: Vec<usize>,
}

impl DistanceMatrix {
    fn filled(size: usize, value: usize) -> Self {
        Self {
            size,
            data: vec![value; size * (size + 1) / 2],
        }
    }

    fn offset(i: usize, j: usize) -> usize {
        let (hi, lo) = if i >= j { (i, j) } else { (j, i) };
        hi * (hi + 1) / 2 + lo
    }

    fn set(&mut self, i: usize, j: usize, value: usize) {
        self.data[Self::offset(i, j)] = value;
    }

    /// Number of rows (= atoms).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// # Panics
    ///
    /// Panics if either index is `>= size()`; see [`try_get`](DistanceMatrix::try_get).
    pub fn get(&self, i: usize, j: usize) -> usize {
        assert!(i < self.size && j < self.size, "distance index out of range");
        self.data[Self::offset(i, j)]
    }

    pub fn try_get(&self, i: usize, j: usize) -> Result<usize, MolError> {
        for idx in [i, j] {
            if idx >= self.size {
                return Err(MolError::atom_index(idx, self.size));
            }
        }
        Ok(self.data[Self::offset(i, j)])
    }

    pub fn row(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.size).map(move |j| self.get(i, j))
    }

    /// Largest finite distance. `0` for an empty or fully disconnected graph.
    pub fn diameter(&self) -> usize {
        self.data
            .iter()
            .copied()
            .filter(|&d| d != UNREACHABLE)
            .max()
            .unwrap_or(0)
    }
}

/// A connected subgraph given by sorted atom and bond indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Fragment {
    pub atoms: Vec<NodeIndex>,
    pub bonds: Vec<EdgeIndex>,
}

impl Fragment {
    pub fn contains_atom(&self, atom: NodeIndex) -> bool {
        self.atoms.binary_search(&atom).is_ok()
    }

    pub fn contains_bond(&self, bond: EdgeIndex) -> bool {
        self.bonds.binary_search(&bond).is_ok()
    }
}

/// Distances from `source` to every atom, by breadth-first search.
pub fn bfs_distances<A, B>(mol: &Mol<A, B>, source: NodeIndex) -> Result<Vec<usize>, MolError> {
    mol.check_atom(source)?;
    let mut dist = vec![UNREACHABLE; mol.atom_count()];
    dist[source.index()] = 0;
    let mut queue = VecDeque::new();
    queue.push_back(source);
    while let Some(current) = queue.pop_front() {
        let d = dist[current.index()];
        for neighbor in mol.neighbors(current) {
            if dist[neighbor.index()] == UNREACHABLE {
                dist[neighbor.index()] = d + 1;
                queue.push_back(neighbor);
            }
        }
    }
    Ok(dist)
}

pub fn distance_matrix<A, B>(mol: &Mol<A, B>) -> DistanceMatrix {
    let n = mol.atom_count();
    let adjacency: Vec<Vec<usize>> = mol
        .atoms()
        .map(|a| mol.neighbors(a).map(|nb| nb.index()).collect())
        .collect();

    let mut matrix = DistanceMatrix::filled(n, UNREACHABLE);
    let mut row = vec![UNREACHABLE; n];
    let mut queue = VecDeque::new();
    for source in 0..n {
        row.fill(UNREACHABLE);
        row[source] = 0;
        queue.push_back(source);
        while let Some(current) = queue.pop_front() {
            let d = row[current];
            for &neighbor in &adjacency[current] {
                if row[neighbor] == UNREACHABLE {
                    row[neighbor] = d + 1;
                    queue.push_back(neighbor);
                }
            }
        }
        for (target, &d) in row.iter().enumerate().take(source + 1) {
            matrix.set(source, target, d);
        }
    }
    matrix
}

/// Maximal connected subgraphs, ordered by their lowest atom index.
/// A graph without atoms has no components.
pub fn connected_components<A, B>(mol: &Mol<A, B>) -> Vec<Fragment> {
    let n = mol.atom_count();
    let mut sets = UnionFind::<usize>::new(n);
    for bond in mol.bonds() {
        if let Some((u, v)) = mol.bond_endpoints(bond) {
            sets.union(u.index(), v.index());
        }
    }

    let mut slot_of_root = vec![usize::MAX; n];
    let mut fragments: Vec<Fragment> = Vec::new();
    for atom in mol.atoms() {
        let root = sets.find(atom.index());
        if slot_of_root[root] == usize::MAX {
            slot_of_root[root] = fragments.len();
            fragments.push(Fragment::default());
        }
        fragments[slot_of_root[root]].atoms.push(atom);
    }
    for bond in mol.bonds() {
        if let Some((u, _)) = mol.bond_endpoints(bond) {
            let slot = slot_of_root[sets.find(u.index())];
            fragments[slot].bonds.push(bond);
        }
    }
    fragments
}

pub fn component_count<A, B>(mol: &Mol<A, B>) -> usize {
    petgraph::algo::connected_components(mol.graph())
}

/// Adjacency over the bonds that can take part in a ring: self-loops and
/// all but the lowest-index bond between any atom pair are left out.
#[derive(Debug, Clone)]
pub(crate) struct RingSkeleton {
    /// Per atom, `(neighbor, bond)` pairs in bond index order.
    pub adjacency: Vec<Vec<(NodeIndex, EdgeIndex)>>,
    /// Per bond, whether it belongs to the skeleton.
    pub eligible: Vec<bool>,
    pub bond_count: usize,
}

impl RingSkeleton {
    pub fn new<A, B>(mol: &Mol<A, B>) -> Self {
        let mut adjacency = vec![Vec::new(); mol.atom_count()];
        let mut eligible = vec![false; mol.bond_count()];
        let mut bond_count = 0;
        for bond in mol.bonds() {
            let Some((u, v)) = mol.bond_endpoints(bond) else {
                continue;
            };
            if u == v || mol.bond_between(u, v) != Some(bond) {
                continue;
            }
            adjacency[u.index()].push((v, bond));
            adjacency[v.index()].push((u, bond));
            eligible[bond.index()] = true;
            bond_count += 1;
        }
        Self {
            adjacency,
            eligible,
            bond_count,
        }
    }

    pub fn atom_count(&self) -> usize {
        self.adjacency.len()
    }
}

/// Dimension of the cycle space, `bonds − atoms + components`, counted over
/// ring-eligible bonds only. This is the size of every SSSR.
pub fn cycle_rank<A, B>(mol: &Mol<A, B>) -> usize {
    let skeleton = RingSkeleton::new(mol);
    (skeleton.bond_count + component_count(mol)).saturating_sub(mol.atom_count())
}
