//! Hückel aromaticity over a candidate ring set.
//!
//! Rings are classified in passes. An independent pass checks every pending
//! ring against the bonds confirmed by earlier passes; a bond confirmed
//! aromatic lets a neighboring ring count its exocyclic double bond as part
//! of the π system. When an independent pass confirms nothing, a fused pass
//! tries the perimeters of connected groups of pending rings. Passes repeat
//! until one confirms nothing new.

use std::collections::{BTreeSet, HashSet};

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::bitset::BondSet;
use crate::bond::BondOrder;
use crate::error::MolError;
use crate::mol::Mol;
use crate::rings::{Ring, RingSet};
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

const SP2_CAPABLE: [u8; 9] = [
    5,  // B
    6,  // C
    7,  // N
    8,  // O
    15, // P
    16, // S
    33, // As
    34, // Se
    52, // Te
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AromaticityOptions {
    /// Stop after this many passes even if the last one confirmed rings.
    pub max_passes: Option<usize>,
    /// Try fused-ring perimeters when independent passes stall.
    pub fused_systems: bool,
    /// Largest number of rings combined into one perimeter.
    pub max_fused_rings: usize,
}

impl Default for AromaticityOptions {
    fn default() -> Self {
        Self {
            max_passes: None,
            fused_systems: true,
            max_fused_rings: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Independent,
    Fused,
}

/// One classification pass and the number of rings it confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub kind: PassKind,
    pub confirmed: usize,
}

/// Result of aromaticity perception.
///
/// An atom or bond is aromatic iff it belongs to at least one aromatic ring.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Aromaticity {
    rings: RingSet,
    atoms: Vec<bool>,
    bonds: Vec<bool>,
    passes: Vec<PassSummary>,
}

impl Aromaticity {
    /// Nothing aromatic.
    pub fn none<A, B>(mol: &Mol<A, B>) -> Self {
        Self {
            rings: RingSet::default(),
            atoms: vec![false; mol.atom_count()],
            bonds: vec![false; mol.bond_count()],
            passes: Vec::new(),
        }
    }

    /// Aromatic rings, in candidate order.
    pub fn rings(&self) -> &RingSet {
        &self.rings
    }

    pub fn is_aromatic_atom(&self, atom: NodeIndex) -> bool {
        self.atoms.get(atom.index()).copied().unwrap_or(false)
    }

    pub fn is_aromatic_bond(&self, bond: EdgeIndex) -> bool {
        self.bonds.get(bond.index()).copied().unwrap_or(false)
    }

    pub fn aromatic_atoms(&self) -> &[bool] {
        &self.atoms
    }

    pub fn aromatic_bonds(&self) -> &[bool] {
        &self.bonds
    }

    pub fn passes(&self) -> &[PassSummary] {
        &self.passes
    }
}

#[derive(Debug, Clone, Default)]
pub struct AromaticityClassifier {
    options: AromaticityOptions,
    strict: bool,
}

impl AromaticityClassifier {
    pub fn new(options: AromaticityOptions) -> Self {
        Self {
            options,
            strict: false,
        }
    }

    /// Reject malformed candidates with [`MolError::MalformedRing`] instead
    /// of skipping them.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Classifies `candidates`, which need not come from `mol`'s SSSR: any
    /// set of elementary cycles works, including a previous result's rings.
    pub fn classify<A, B>(
        &self,
        mol: &Mol<A, B>,
        candidates: &RingSet,
    ) -> Result<Aromaticity, MolError>
    where
        A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
        B: HasBondOrder,
    {
        let mut valid = Vec::with_capacity(candidates.num_rings());
        for (index, ring) in candidates.iter().enumerate() {
            match ring.validate(mol) {
                Ok(()) => valid.push(ring),
                Err(reason) if self.strict => {
                    return Err(MolError::MalformedRing { index, reason })
                }
                Err(reason) => warn!(index, %reason, "skipping malformed ring candidate"),
            }
        }
        Ok(self.run(mol, &valid))
    }

    fn run<A, B>(&self, mol: &Mol<A, B>, candidates: &[&Ring]) -> Aromaticity
    where
        A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
        B: HasBondOrder,
    {
        let num_bonds = mol.bond_count();
        let bond_sets: Vec<BondSet> = candidates.iter().map(|r| r.bond_set(num_bonds)).collect();
        let mut used = BondSet::from_bonds(
            num_bonds,
            mol.bonds()
                .filter(|&b| mol.bond(b).bond_order() == BondOrder::Aromatic),
        );
        let mut confirmed = vec![false; candidates.len()];
        let mut passes = Vec::new();
        let max_passes = self.options.max_passes.unwrap_or(usize::MAX);

        while passes.len() < max_passes && confirmed.contains(&false) {
            // Every pass reads the bonds confirmed before it started.
            let snapshot = used.clone();
            let newly: Vec<usize> = (0..candidates.len())
                .filter(|&i| !confirmed[i] && ring_is_aromatic(mol, candidates[i], &snapshot))
                .collect();
            passes.push(PassSummary {
                kind: PassKind::Independent,
                confirmed: newly.len(),
            });
            for &i in &newly {
                trace!(ring = i, size = candidates[i].size(), "aromatic ring");
                confirmed[i] = true;
                used.union_with(&bond_sets[i]);
            }
            if !newly.is_empty() {
                continue;
            }

            let pending: Vec<usize> = (0..candidates.len()).filter(|&i| !confirmed[i]).collect();
            if !self.options.fused_systems || pending.len() < 2 || passes.len() >= max_passes {
                break;
            }
            let newly = self.fused_pass(mol, candidates, &pending, &bond_sets, &used);
            passes.push(PassSummary {
                kind: PassKind::Fused,
                confirmed: newly.len(),
            });
            if newly.is_empty() {
                break;
            }
            for i in newly {
                trace!(ring = i, size = candidates[i].size(), "aromatic ring in fused system");
                confirmed[i] = true;
                used.union_with(&bond_sets[i]);
            }
        }
        debug_assert!(passes.len() <= 2 * candidates.len() + 1);

        let mut atoms = vec![false; mol.atom_count()];
        let mut bonds = vec![false; num_bonds];
        let mut rings = Vec::new();
        for (ring, _) in candidates.iter().zip(&confirmed).filter(|(_, c)| **c) {
            for atom in ring.atoms() {
                atoms[atom.index()] = true;
            }
            for bond in ring.bonds() {
                bonds[bond.index()] = true;
            }
            rings.push((*ring).clone());
        }
        debug!(
            candidates = candidates.len(),
            aromatic = rings.len(),
            passes = passes.len(),
            "perceived aromaticity"
        );
        Aromaticity {
            rings: RingSet::new(rings),
            atoms,
            bonds,
            passes,
        }
    }

    /// Evaluates the perimeter of every connected group of pending rings,
    /// smallest groups first. Returns the members of aromatic perimeters.
    fn fused_pass<A, B>(
        &self,
        mol: &Mol<A, B>,
        candidates: &[&Ring],
        pending: &[usize],
        bond_sets: &[BondSet],
        used: &BondSet,
    ) -> Vec<usize>
    where
        A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
        B: HasBondOrder,
    {
        let mut newly = BTreeSet::new();
        for group in fused_groups(pending, bond_sets, self.options.max_fused_rings) {
            if group.iter().any(|i| newly.contains(i)) {
                continue;
            }
            let mut perimeter = bond_sets[group[0]].clone();
            for &i in &group[1..] {
                perimeter.xor_with(&bond_sets[i]);
            }
            let Some(ring) = Ring::from_bond_set(mol, &perimeter) else {
                continue;
            };
            if !ring_is_aromatic(mol, &ring, used) {
                continue;
            }
            let members: Vec<&Ring> = group.iter().map(|&i| candidates[i]).collect();
            if !interior_is_conjugated(mol, &ring, &members, used) {
                trace!(?group, "aromatic perimeter around a non-conjugated center");
                continue;
            }
            trace!(?group, size = ring.size(), "aromatic perimeter");
            newly.extend(group);
        }
        newly.into_iter().collect()
    }
}

/// Member-ring atoms that the perimeter walks around (the center of a
/// peri-fused system) must still be sp2 centers of every member ring they
/// belong to.
fn interior_is_conjugated<A, B>(
    mol: &Mol<A, B>,
    perimeter: &Ring,
    members: &[&Ring],
    used: &BondSet,
) -> bool
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    members.iter().all(|member| {
        member
            .atoms()
            .iter()
            .filter(|&&atom| !perimeter.contains_atom(atom))
            .all(|&atom| {
                SP2_CAPABLE.contains(&mol.atom(atom).atomic_num())
                    && pi_electrons(mol, atom, member, used).is_some()
            })
    })
}

/// Connected groups of 2..=`max_size` rings that pairwise chain through
/// shared bonds, ordered by size and then by member indices.
fn fused_groups(pending: &[usize], bond_sets: &[BondSet], max_size: usize) -> Vec<Vec<usize>> {
    let fused_with = |a: usize, b: usize| bond_sets[a].intersects(&bond_sets[b]);
    let mut groups = Vec::new();
    let mut level: Vec<Vec<usize>> = pending.iter().map(|&i| vec![i]).collect();
    for _ in 1..max_size {
        let mut seen = HashSet::new();
        let mut next = Vec::new();
        for group in &level {
            for &candidate in pending {
                if group.contains(&candidate) || !group.iter().any(|&m| fused_with(m, candidate)) {
                    continue;
                }
                let mut grown = group.clone();
                grown.push(candidate);
                grown.sort_unstable();
                if seen.insert(grown.clone()) {
                    next.push(grown);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        next.sort();
        groups.extend(next.iter().cloned());
        level = next;
    }
    groups
}

/// Aromaticity of the SSSR, skipping nothing (SSSR rings are always
/// well formed).
pub fn perceive_aromaticity<A, B>(
    mol: &Mol<A, B>,
    sssr: &RingSet,
    options: &AromaticityOptions,
) -> Aromaticity
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let candidates: Vec<&Ring> = sssr.iter().collect();
    AromaticityClassifier::new(options.clone()).run(mol, &candidates)
}

fn ring_is_aromatic<A, B>(mol: &Mol<A, B>, ring: &Ring, used: &BondSet) -> bool
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    for &bond in ring.bonds() {
        match mol.bond(bond).bond_order() {
            BondOrder::Triple => return false,
            BondOrder::Unspecified if !used.contains(bond) => return false,
            _ => {}
        }
    }

    let mut pi_total: u32 = 0;
    for &atom in ring.atoms() {
        if !SP2_CAPABLE.contains(&mol.atom(atom).atomic_num()) {
            return false;
        }
        match pi_electrons(mol, atom, ring, used) {
            Some(e) => pi_total += u32::from(e),
            None => return false,
        }
    }
    is_huckel(pi_total)
}

/// Bonding situation of one ring atom.
struct Environment {
    charge: i8,
    degree: usize,
    /// Double bond to another atom of the ring.
    ring_double: bool,
    /// Exocyclic double bond already part of a confirmed aromatic system.
    exo_conjugated: bool,
    /// Atomic number of the partner of any other exocyclic double bond.
    exo_double: Option<u8>,
    /// Bond of aromatic order, or one confirmed aromatic.
    aromatic_bond: bool,
}

impl Environment {
    fn of<A, B>(mol: &Mol<A, B>, atom: NodeIndex, ring: &Ring, used: &BondSet) -> Option<Self>
    where
        A: HasFormalCharge + HasHydrogenCount + HasAtomicNum,
        B: HasBondOrder,
    {
        let mut env = Self {
            charge: mol.atom(atom).formal_charge(),
            degree: mol.degree(atom) + usize::from(mol.atom(atom).hydrogen_count()),
            ring_double: false,
            exo_conjugated: false,
            exo_double: None,
            aromatic_bond: false,
        };
        let mut doubles = 0;
        for bond in mol.bonds_of(atom) {
            let partner = mol.other_atom(bond, atom)?;
            match mol.bond(bond).bond_order() {
                BondOrder::Triple => return None,
                BondOrder::Double => {
                    doubles += 1;
                    if ring.contains_atom(partner) {
                        env.ring_double = true;
                    } else if used.contains(bond) {
                        env.exo_conjugated = true;
                    } else {
                        env.exo_double = Some(mol.atom(partner).atomic_num());
                    }
                }
                BondOrder::Aromatic => env.aromatic_bond = true,
                _ if used.contains(bond) => env.aromatic_bond = true,
                _ => {}
            }
        }
        if doubles > 1 {
            return None;
        }
        Some(env)
    }

    fn has_double(&self) -> bool {
        self.ring_double || self.exo_conjugated
    }
}

fn pi_electrons<A, B>(mol: &Mol<A, B>, atom: NodeIndex, ring: &Ring, used: &BondSet) -> Option<u8>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let env = Environment::of(mol, atom, ring, used)?;
    let q = env.charge;

    match mol.atom(atom).atomic_num() {
        6 => {
            if env.has_double() {
                Some(1)
            } else if let Some(partner) = env.exo_double {
                // Exocyclic C=N, C=O, C=S withdraws the carbon's electron.
                matches!(partner, 7 | 8 | 16).then_some(0)
            } else {
                match q {
                    0 if env.aromatic_bond => Some(1),
                    -1 => Some(2),
                    1 => Some(0),
                    _ => None,
                }
            }
        }
        7 | 15 | 33 => {
            if env.has_double() {
                matches!(q, 0 | 1).then_some(1)
            } else if env.exo_double.is_some() {
                None
            } else if env.aromatic_bond {
                match (q, env.degree) {
                    (0, 3) => Some(2),
                    (0, 2) => Some(1),
                    (1, _) => Some(1),
                    (-1, 2) => Some(2),
                    _ => None,
                }
            } else {
                match q {
                    0 if env.degree <= 3 => Some(2),
                    -1 => Some(2),
                    _ => None,
                }
            }
        }
        8 | 16 | 34 | 52 => {
            if env.has_double() {
                (q == 1).then_some(1)
            } else if env.exo_double.is_some() || env.degree > 2 {
                None
            } else {
                match q {
                    0 => Some(2),
                    1 if env.aromatic_bond => Some(1),
                    _ => None,
                }
            }
        }
        5 => {
            if env.has_double() {
                Some(1)
            } else if env.exo_double.is_some() {
                None
            } else {
                Some(0)
            }
        }
        _ => None,
    }
}

pub fn is_huckel(pi_electrons: u32) -> bool {
    if pi_electrons < 2 {
        return false;
    }
    (pi_electrons - 2) % 4 == 0
}
