use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};

use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::debug;

use crate::bitset::{BondSet, CycleBasis};
use crate::mol::Mol;
use crate::topology::{component_count, RingSkeleton};

/// An elementary cycle: `bonds[i]` joins `atoms[i]` and `atoms[(i + 1) % len]`.
///
/// Rings produced by perception are normalized: the lowest atom index comes
/// first and the walk continues toward the lower-indexed of its two ring
/// neighbors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ring {
    atoms: Vec<NodeIndex>,
    bonds: Vec<EdgeIndex>,
}

impl Ring {
    /// Builds a ring from caller-supplied parts without checking them. Use
    /// [`validate`](Ring::validate) before trusting such a ring.
    pub fn from_parts(atoms: Vec<NodeIndex>, bonds: Vec<EdgeIndex>) -> Self {
        Self { atoms, bonds }
    }

    /// Builds a ring from an atom cycle, looking up the bond between each
    /// consecutive pair. Returns `None` if a pair is not bonded.
    pub fn from_atoms<A, B>(mol: &Mol<A, B>, atoms: &[NodeIndex]) -> Option<Self> {
        let len = atoms.len();
        let bonds = (0..len)
            .map(|i| mol.bond_between(atoms[i], atoms[(i + 1) % len]))
            .collect::<Option<Vec<_>>>()?;
        let ring = Self {
            atoms: atoms.to_vec(),
            bonds,
        };
        ring.validate(mol).ok()?;
        Some(ring.normalized())
    }

    /// Recovers the single elementary cycle whose bonds are exactly `set`.
    pub(crate) fn from_bond_set<A, B>(mol: &Mol<A, B>, set: &BondSet) -> Option<Self> {
        let mut incident: Vec<Vec<EdgeIndex>> = vec![Vec::new(); mol.atom_count()];
        let mut num_bonds = 0;
        for bond in set.iter() {
            let (u, v) = mol.bond_endpoints(bond)?;
            if u == v {
                return None;
            }
            incident[u.index()].push(bond);
            incident[v.index()].push(bond);
            num_bonds += 1;
        }
        if incident.iter().any(|b| !b.is_empty() && b.len() != 2) {
            return None;
        }

        let start = NodeIndex::new(incident.iter().position(|b| !b.is_empty())?);
        let mut atoms = vec![start];
        let mut bonds = Vec::with_capacity(num_bonds);
        let mut current = start;
        let mut via = incident[start.index()][0];
        loop {
            bonds.push(via);
            let next = mol.other_atom(via, current)?;
            if next == start {
                break;
            }
            atoms.push(next);
            let pair = &incident[next.index()];
            via = if pair[0] == via { pair[1] } else { pair[0] };
            current = next;
        }

        // A disconnected set (two disjoint cycles) walks only one of them.
        if bonds.len() != num_bonds {
            return None;
        }
        Some(Self { atoms, bonds }.normalized())
    }

    pub fn size(&self) -> usize {
        self.atoms.len()
    }

    pub fn atoms(&self) -> &[NodeIndex] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[EdgeIndex] {
        &self.bonds
    }

    pub fn contains_atom(&self, atom: NodeIndex) -> bool {
        self.atoms.contains(&atom)
    }

    pub fn contains_bond(&self, bond: EdgeIndex) -> bool {
        self.bonds.contains(&bond)
    }

    /// Bond indices in ascending order; the tie-break key between rings of
    /// equal size.
    pub fn sorted_bonds(&self) -> Vec<EdgeIndex> {
        let mut bonds = self.bonds.clone();
        bonds.sort_unstable();
        bonds
    }

    pub(crate) fn bond_set(&self, num_bonds: usize) -> BondSet {
        BondSet::from_bonds(num_bonds, self.bonds.iter().copied())
    }

    /// Checks that the ring is an elementary cycle of `mol`.
    pub fn validate<A, B>(&self, mol: &Mol<A, B>) -> Result<(), String> {
        let len = self.atoms.len();
        if len != self.bonds.len() {
            return Err(format!("{} atoms but {} bonds", len, self.bonds.len()));
        }
        if len < 3 {
            return Err(format!("{} atoms cannot form a ring", len));
        }
        if let Some(atom) = self.atoms.iter().find(|a| a.index() >= mol.atom_count()) {
            return Err(format!("atom {} does not exist", atom.index()));
        }
        if let Some(bond) = self.bonds.iter().find(|b| b.index() >= mol.bond_count()) {
            return Err(format!("bond {} does not exist", bond.index()));
        }
        let distinct_atoms: HashSet<_> = self.atoms.iter().collect();
        let distinct_bonds: HashSet<_> = self.bonds.iter().collect();
        if distinct_atoms.len() != len || distinct_bonds.len() != len {
            return Err("repeated atom or bond".to_owned());
        }
        for i in 0..len {
            let (a, b) = (self.atoms[i], self.atoms[(i + 1) % len]);
            match mol.bond_endpoints(self.bonds[i]) {
                Some((u, v)) if (u == a && v == b) || (u == b && v == a) => {}
                _ => {
                    return Err(format!(
                        "bond {} does not join atoms {} and {}",
                        self.bonds[i].index(),
                        a.index(),
                        b.index()
                    ))
                }
            }
        }
        Ok(())
    }

    fn normalized(mut self) -> Self {
        let len = self.atoms.len();
        if len == 0 {
            return self;
        }
        let start = (0..len).min_by_key(|&i| self.atoms[i]).unwrap_or(0);
        self.atoms.rotate_left(start);
        self.bonds.rotate_left(start);
        if len > 2 && self.atoms[1] > self.atoms[len - 1] {
            self.atoms[1..].reverse();
            self.bonds.reverse();
        }
        self
    }

    fn order(&self, other: &Self) -> Ordering {
        self.size()
            .cmp(&other.size())
            .then_with(|| self.sorted_bonds().cmp(&other.sorted_bonds()))
    }
}

/// An ordered collection of rings, smallest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RingSet {
    rings: Vec<Ring>,
}

impl RingSet {
    /// Wraps rings as given, preserving their order.
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    /// Smallest Set of Smallest Rings.
    ///
    /// Candidates are the fundamental cycles of a breadth-first spanning
    /// forest together with the Horton cycles (two shortest paths from a
    /// common atom closed by one bond). They are ordered by size, then by
    /// their ascending bond-index lists, and accepted greedily whenever they
    /// are independent over GF(2) of the rings accepted so far. The result
    /// is a minimum cycle basis with `bonds − atoms + components` rings,
    /// identical for identical input.
    ///
    /// Self-loops and duplicate bonds are not ring bonds.
    pub fn sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let skeleton = RingSkeleton::new(mol);
        let expected =
            (skeleton.bond_count + component_count(mol)).saturating_sub(mol.atom_count());
        if expected == 0 {
            return Self::default();
        }

        let num_bonds = mol.bond_count();
        let mut candidates = fundamental_cycles(mol, &skeleton);
        candidates.extend(horton_candidates(mol, &skeleton));
        let mut seen = HashSet::new();
        candidates.retain(|ring| seen.insert(ring.bond_set(num_bonds)));
        candidates.sort_by(Ring::order);

        let mut basis = CycleBasis::new();
        let mut rings = Vec::with_capacity(expected);
        for ring in candidates.iter() {
            if basis.rank() == expected {
                break;
            }
            if basis.try_insert(&ring.bond_set(num_bonds)) {
                rings.push(ring.clone());
            }
        }
        debug_assert_eq!(rings.len(), expected, "fundamental cycles span the cycle space");
        debug!(
            rings = rings.len(),
            candidates = candidates.len(),
            "perceived SSSR"
        );
        rings.sort_by(Ring::order);
        Self { rings }
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ring> {
        self.rings.iter()
    }

    pub fn ring_sizes(&self) -> Vec<usize> {
        self.rings.iter().map(Ring::size).collect()
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.rings.iter().any(|ring| ring.contains_atom(atom))
    }

    pub fn is_ring_bond(&self, bond: EdgeIndex) -> bool {
        self.rings.iter().any(|ring| ring.contains_bond(bond))
    }

    pub fn smallest_ring_size(&self, atom: NodeIndex) -> Option<usize> {
        self.rings
            .iter()
            .filter(|ring| ring.contains_atom(atom))
            .map(Ring::size)
            .min()
    }

    pub fn atom_rings(&self, atom: NodeIndex) -> Vec<&Ring> {
        self.rings
            .iter()
            .filter(|ring| ring.contains_atom(atom))
            .collect()
    }

    pub fn bond_rings(&self, bond: EdgeIndex) -> Vec<&Ring> {
        self.rings
            .iter()
            .filter(|ring| ring.contains_bond(bond))
            .collect()
    }

    pub(crate) fn sort(&mut self) {
        self.rings.sort_by(Ring::order);
    }
}

impl FromIterator<Ring> for RingSet {
    fn from_iter<I: IntoIterator<Item = Ring>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RingSet {
    type Item = &'a Ring;
    type IntoIter = std::slice::Iter<'a, Ring>;

    fn into_iter(self) -> Self::IntoIter {
        self.rings.iter()
    }
}

/// Breadth-first tree rooted at one atom over the ring skeleton.
struct BfsTree {
    /// `(parent, bond to parent)` per reached atom; `None` for the root and
    /// for unreached atoms.
    parent: Vec<Option<(NodeIndex, EdgeIndex)>>,
    depth: Vec<usize>,
}

impl BfsTree {
    fn grow(
        skeleton: &RingSkeleton,
        root: NodeIndex,
        depth: &mut [usize],
        parent: &mut [Option<(NodeIndex, EdgeIndex)>],
    ) {
        depth[root.index()] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(root);
        while let Some(current) = queue.pop_front() {
            for &(nb, bond) in &skeleton.adjacency[current.index()] {
                if depth[nb.index()] == usize::MAX {
                    depth[nb.index()] = depth[current.index()] + 1;
                    parent[nb.index()] = Some((current, bond));
                    queue.push_back(nb);
                }
            }
        }
    }

    fn rooted_at(skeleton: &RingSkeleton, root: NodeIndex) -> Self {
        let n = skeleton.atom_count();
        let mut tree = Self {
            parent: vec![None; n],
            depth: vec![usize::MAX; n],
        };
        Self::grow(skeleton, root, &mut tree.depth, &mut tree.parent);
        tree
    }

    /// Spanning forest: one tree per component, rooted at its lowest atom.
    fn forest(skeleton: &RingSkeleton) -> Self {
        let n = skeleton.atom_count();
        let mut tree = Self {
            parent: vec![None; n],
            depth: vec![usize::MAX; n],
        };
        for root in 0..n {
            if tree.depth[root] == usize::MAX {
                Self::grow(skeleton, NodeIndex::new(root), &mut tree.depth, &mut tree.parent);
            }
        }
        tree
    }

    fn is_tree_bond(&self, bond: EdgeIndex) -> bool {
        self.parent.iter().flatten().any(|&(_, b)| b == bond)
    }

    /// Atoms and bonds from `atom` up to the root.
    fn path_to_root(&self, atom: NodeIndex) -> (Vec<NodeIndex>, Vec<EdgeIndex>) {
        let mut atoms = vec![atom];
        let mut bonds = Vec::new();
        let mut current = atom;
        while let Some((up, bond)) = self.parent[current.index()] {
            atoms.push(up);
            bonds.push(bond);
            current = up;
        }
        (atoms, bonds)
    }
}

/// Joins two tree paths that start at the endpoints of `closing` and meet at
/// a common atom into one ring. `None` if the paths overlap anywhere past
/// their meeting point or the ring would have fewer than three atoms.
fn close_paths(
    (path_u, bonds_u): (&[NodeIndex], &[EdgeIndex]),
    (path_v, bonds_v): (&[NodeIndex], &[EdgeIndex]),
    closing: EdgeIndex,
) -> Option<Ring> {
    // Both paths end at the same atom; drop it from the second.
    let tail_v = &path_v[..path_v.len() - 1];
    if tail_v.iter().any(|a| path_u.contains(a)) {
        return None;
    }
    if path_u.len() + tail_v.len() < 3 {
        return None;
    }
    let mut atoms = path_u.to_vec();
    atoms.extend(tail_v.iter().rev());
    let mut bonds = bonds_u.to_vec();
    bonds.extend(bonds_v.iter().rev());
    bonds.push(closing);
    Some(Ring { atoms, bonds }.normalized())
}

fn fundamental_cycles<A, B>(mol: &Mol<A, B>, skeleton: &RingSkeleton) -> Vec<Ring> {
    let forest = BfsTree::forest(skeleton);
    let mut cycles = Vec::new();
    for bond in mol.bonds() {
        if !skeleton.eligible[bond.index()] || forest.is_tree_bond(bond) {
            continue;
        }
        let Some((u, v)) = mol.bond_endpoints(bond) else {
            continue;
        };
        let (mut path_u, mut bonds_u) = forest.path_to_root(u);
        let (mut path_v, mut bonds_v) = forest.path_to_root(v);
        // Trim the shared stretch above the lowest common ancestor.
        while path_u.len() > 1
            && path_v.len() > 1
            && path_u[path_u.len() - 2] == path_v[path_v.len() - 2]
        {
            path_u.pop();
            path_v.pop();
            bonds_u.pop();
            bonds_v.pop();
        }
        if let Some(ring) = close_paths((&path_u, &bonds_u), (&path_v, &bonds_v), bond) {
            cycles.push(ring);
        }
    }
    cycles
}

fn horton_candidates<A, B>(mol: &Mol<A, B>, skeleton: &RingSkeleton) -> Vec<Ring> {
    let mut candidates = Vec::new();
    for root in mol.atoms() {
        if skeleton.adjacency[root.index()].len() < 2 {
            continue;
        }
        let tree = BfsTree::rooted_at(skeleton, root);
        for bond in mol.bonds() {
            if !skeleton.eligible[bond.index()] {
                continue;
            }
            let Some((u, v)) = mol.bond_endpoints(bond) else {
                continue;
            };
            let (du, dv) = (tree.depth[u.index()], tree.depth[v.index()]);
            if du == usize::MAX || dv == usize::MAX || du.abs_diff(dv) > 1 {
                continue;
            }
            let (path_u, bonds_u) = tree.path_to_root(u);
            let (path_v, bonds_v) = tree.path_to_root(v);
            if let Some(ring) = close_paths((&path_u, &bonds_u), (&path_v, &bonds_v), bond) {
                candidates.push(ring);
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use crate::topology::cycle_rank;
    use crate::BondOrder;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn assert_well_formed<A, B>(mol: &Mol<A, B>, rings: &RingSet) {
        for ring in rings {
            assert_eq!(ring.atoms().len(), ring.bonds().len());
            assert_eq!(ring.validate(mol), Ok(()));
        }
    }

    #[test]
    fn cyclohexane() {
        let mol = ring_of_carbons(&[BondOrder::Single; 6]);
        let ri = RingSet::sssr(&mol);
        assert_eq!(ri.num_rings(), 1);
        assert_eq!(ri.rings()[0].size(), 6);
        assert_well_formed(&mol, &ri);
    }

    #[test]
    fn cyclopropane() {
        let mol = ring_of_carbons(&[BondOrder::Single; 3]);
        let ri = RingSet::sssr(&mol);
        assert_eq!(ri.ring_sizes(), vec![3]);
    }

    #[test]
    fn acyclic() {
        let ri = RingSet::sssr(&chain(4));
        assert!(ri.is_empty());
    }

    #[test]
    fn empty_graph() {
        let ri = RingSet::sssr(&mol_from(&[], &[]));
        assert!(ri.is_empty());
    }

    #[test]
    fn naphthalene_shares_fusion_bond() {
        let mol = naphthalene(true);
        let ri = RingSet::sssr(&mol);
        assert_eq!(ri.ring_sizes(), vec![6, 6]);
        assert_well_formed(&mol, &ri);
        let shared: Vec<NodeIndex> = mol
            .atoms()
            .filter(|&a| ri.atom_rings(a).len() == 2)
            .collect();
        assert_eq!(shared, vec![n(4), n(9)]);
        assert_eq!(ri.bond_rings(EdgeIndex::new(10)).len(), 2);
    }

    #[test]
    fn anthracene_rings() {
        let ri = RingSet::sssr(&anthracene());
        assert_eq!(ri.ring_sizes(), vec![6, 6, 6]);
    }

    #[test]
    fn spiro_rings_share_one_atom() {
        let mol = spiro_decane();
        let ri = RingSet::sssr(&mol);
        assert_eq!(ri.ring_sizes(), vec![5, 6]);
        assert_eq!(ri.atom_rings(n(0)).len(), 2);
    }

    #[test]
    fn bridged_bicycle() {
        let mol = norbornane();
        let ri = RingSet::sssr(&mol);
        assert_eq!(ri.ring_sizes(), vec![5, 5]);
        assert_well_formed(&mol, &ri);
    }

    #[test]
    fn cubane_faces() {
        let mol = cubane();
        assert_eq!(cycle_rank(&mol), 5);
        let ri = RingSet::sssr(&mol);
        assert_eq!(ri.ring_sizes(), vec![4; 5]);
        assert_well_formed(&mol, &ri);
    }

    #[test]
    fn disconnected_rings_follow_cycle_rank() {
        let mut mol = ring_of_carbons(&[BondOrder::Single; 5]);
        let base = mol.atom_count();
        for _ in 0..4 {
            mol.add_atom(crate::Atom::new(6));
        }
        for i in 0..4 {
            mol.add_bond(n(base + i), n(base + (i + 1) % 4), Default::default())
                .unwrap();
        }
        let ri = RingSet::sssr(&mol);
        assert_eq!(ri.ring_sizes(), vec![4, 5]);
        assert_eq!(ri.num_rings(), cycle_rank(&mol));
    }

    #[test]
    fn self_loop_is_not_a_ring() {
        let mut mol = chain(3);
        mol.add_bond(n(1), n(1), Default::default()).unwrap();
        assert!(RingSet::sssr(&mol).is_empty());
    }

    #[test]
    fn duplicate_bond_is_not_a_ring() {
        let mut mol = chain(2);
        mol.add_parallel_bond(n(0), n(1), Default::default()).unwrap();
        assert_eq!(mol.bond_count(), 2);
        assert!(RingSet::sssr(&mol).is_empty());

        let mut ring = ring_of_carbons(&[BondOrder::Single; 4]);
        let dup = ring.add_parallel_bond(n(2), n(3), Default::default()).unwrap();
        let ri = RingSet::sssr(&ring);
        assert_eq!(ri.ring_sizes(), vec![4]);
        assert!(!ri.is_ring_bond(dup));
    }

    #[test]
    fn deterministic_across_runs() {
        let mol = cubane();
        let first = RingSet::sssr(&mol);
        for _ in 0..5 {
            assert_eq!(RingSet::sssr(&mol), first);
        }
    }

    #[test]
    fn rings_are_normalized() {
        let ri = RingSet::sssr(&ring_of_carbons(&[BondOrder::Single; 6]));
        let ring = &ri.rings()[0];
        assert_eq!(ring.atoms()[0], n(0));
        assert_eq!(ring.atoms()[1], n(1));
        assert_eq!(ring.atoms()[5], n(5));
        assert_eq!(ring.bonds()[0], EdgeIndex::new(0));
        assert_eq!(ring.bonds()[5], EdgeIndex::new(5));
    }

    #[test]
    fn ring_membership_queries() {
        let mol = phenol();
        let ri = RingSet::sssr(&mol);
        assert!(!ri.is_ring_atom(n(6)));
        for i in 0..6 {
            assert!(ri.is_ring_atom(n(i)), "atom {} should be in ring", i);
        }
        assert_eq!(ri.smallest_ring_size(n(0)), Some(6));
        assert_eq!(ri.smallest_ring_size(n(6)), None);
        let exocyclic = mol.bond_between(n(0), n(6)).unwrap();
        assert!(!ri.is_ring_bond(exocyclic));
    }

    #[test]
    fn from_atoms_checks_bonds() {
        let mol = ring_of_carbons(&[BondOrder::Single; 4]);
        let ring = Ring::from_atoms(&mol, &[n(2), n(1), n(0), n(3)]).unwrap();
        assert_eq!(ring.atoms(), &[n(0), n(1), n(2), n(3)]);
        assert!(Ring::from_atoms(&mol, &[n(0), n(2), n(1), n(3)]).is_none());
    }

    #[test]
    fn validate_reports_mismatch() {
        let mol = ring_of_carbons(&[BondOrder::Single; 4]);
        let ring = Ring::from_parts(vec![n(0), n(1), n(2)], vec![EdgeIndex::new(0)]);
        assert_eq!(ring.validate(&mol), Err("3 atoms but 1 bonds".to_owned()));
        let ring = Ring::from_parts(
            vec![n(0), n(1), n(2)],
            vec![EdgeIndex::new(0), EdgeIndex::new(1), EdgeIndex::new(2)],
        );
        assert!(ring.validate(&mol).is_err());
    }

    #[test]
    fn bond_set_walk() {
        let mol = naphthalene(true);
        let ri = RingSet::sssr(&mol);
        let mut perimeter = ri.rings()[0].bond_set(mol.bond_count());
        perimeter.xor_with(&ri.rings()[1].bond_set(mol.bond_count()));
        let ring = Ring::from_bond_set(&mol, &perimeter).unwrap();
        assert_eq!(ring.size(), 10);
        assert!(!ring.contains_bond(EdgeIndex::new(10)));

        let mut both = ri.rings()[0].bond_set(mol.bond_count());
        both.union_with(&ri.rings()[1].bond_set(mol.bond_count()));
        assert!(Ring::from_bond_set(&mol, &both).is_none());
    }
}
