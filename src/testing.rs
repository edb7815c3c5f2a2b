//! Hand-built molecules shared by the unit tests.

use petgraph::graph::NodeIndex;

use crate::{Atom, Bond, BondOrder, Mol};

use crate::bond::BondOrder::{Double as D, Single as S};

pub const KEKULE_6: [BondOrder; 6] = [D, S, D, S, D, S];
/// Five-ring with atom 0 between the two single bonds.
pub const KEKULE_5: [BondOrder; 5] = [S, D, S, D, S];

pub fn mol_from(atoms: &[Atom], bonds: &[(usize, usize, BondOrder)]) -> Mol {
    let mut mol = Mol::new();
    for atom in atoms {
        mol.add_atom(atom.clone());
    }
    for &(a, b, order) in bonds {
        mol.add_bond(NodeIndex::new(a), NodeIndex::new(b), Bond::new(order))
            .unwrap();
    }
    mol
}

/// Ring where bond `i` joins atom `i` and atom `(i + 1) % n`.
pub fn ring_of(atoms: &[Atom], orders: &[BondOrder]) -> Mol {
    assert_eq!(atoms.len(), orders.len());
    let n = atoms.len();
    let bonds: Vec<_> = orders
        .iter()
        .enumerate()
        .map(|(i, &order)| (i, (i + 1) % n, order))
        .collect();
    mol_from(atoms, &bonds)
}

pub fn ring_of_carbons(orders: &[BondOrder]) -> Mol {
    ring_of(&vec![Atom::new(6).with_hydrogens(1); orders.len()], orders)
}

pub fn chain(n: usize) -> Mol {
    let bonds: Vec<_> = (1..n).map(|i| (i - 1, i, S)).collect();
    mol_from(&vec![Atom::new(6).with_hydrogens(2); n], &bonds)
}

pub fn benzene() -> Mol {
    ring_of_carbons(&KEKULE_6)
}

/// Five-membered ring with `heteroatom` at index 0 and CH elsewhere.
pub fn five_ring(heteroatom: Atom) -> Mol {
    let mut atoms = vec![Atom::new(6).with_hydrogens(1); 5];
    atoms[0] = heteroatom;
    ring_of(&atoms, &KEKULE_5)
}

/// Benzene ring 0..6 with a hydroxyl oxygen at 6 on atom 0.
pub fn phenol() -> Mol {
    let mut mol = benzene();
    mol.atom_mut(NodeIndex::new(0)).hydrogen_count = 0;
    let o = mol.add_atom(Atom::new(8).with_hydrogens(1));
    mol.add_bond(NodeIndex::new(0), o, Bond::new(S)).unwrap();
    mol
}

/// 2-pyridone: N(H) at 0, carbonyl carbon at 1 with oxygen at 6.
pub fn pyridone() -> Mol {
    let mut atoms = vec![Atom::new(6).with_hydrogens(1); 6];
    atoms[0] = Atom::new(7).with_hydrogens(1);
    atoms[1] = Atom::new(6);
    atoms.push(Atom::new(8));
    mol_from(
        &atoms,
        &[
            (0, 1, S),
            (1, 2, S),
            (2, 3, D),
            (3, 4, S),
            (4, 5, D),
            (5, 0, S),
            (1, 6, D),
        ],
    )
}

pub fn benzoquinone() -> Mol {
    let mut atoms = vec![Atom::new(6).with_hydrogens(1); 6];
    atoms[0] = Atom::new(6);
    atoms[3] = Atom::new(6);
    atoms.push(Atom::new(8));
    atoms.push(Atom::new(8));
    mol_from(
        &atoms,
        &[
            (0, 1, S),
            (1, 2, D),
            (2, 3, S),
            (3, 4, S),
            (4, 5, D),
            (5, 0, S),
            (0, 6, D),
            (3, 7, D),
        ],
    )
}

/// Naphthalene skeleton: perimeter bonds 0..10 join atom `i` to `i + 1`
/// (bond 9 closes 9-0) and bond 10 is the fusion bond 4-9. Ring A is
/// 0-1-2-3-4-9, ring B is 4-5-6-7-8-9.
fn naphthalene_skeleton(atoms: &[Atom], doubles: &[usize]) -> Mol {
    let mut bonds: Vec<_> = (0..10).map(|i| (i, (i + 1) % 10, S)).collect();
    bonds.push((4, 9, S));
    for &d in doubles {
        bonds[d].2 = D;
    }
    mol_from(atoms, &bonds)
}

fn naphthalene_atoms() -> Vec<Atom> {
    let mut atoms = vec![Atom::new(6).with_hydrogens(1); 10];
    atoms[4] = Atom::new(6);
    atoms[9] = Atom::new(6);
    atoms
}

/// With `shared_double`, the fusion bond is double and each ring holds three
/// double bonds. Otherwise ring B holds only two and needs ring A's
/// confirmation to count the exocyclic ones.
pub fn naphthalene(shared_double: bool) -> Mol {
    let doubles: &[usize] = if shared_double {
        &[10, 0, 2, 5, 7]
    } else {
        &[9, 1, 3, 5, 7]
    };
    naphthalene_skeleton(&naphthalene_atoms(), doubles)
}

/// Naphthalene skeleton where ring A counts 4 and ring B 8 π electrons, but
/// the 10-atom perimeter counts 10.
pub fn fused_zwitterion() -> Mol {
    let mut atoms = naphthalene_atoms();
    for i in [2, 3] {
        atoms[i] = Atom::new(6).with_hydrogens(1).with_charge(1);
    }
    for i in [5, 8] {
        atoms[i] = Atom::new(6).with_hydrogens(1).with_charge(-1);
    }
    naphthalene_skeleton(&atoms, &[10, 0, 6])
}

/// Five-ring 0-1-2-3-4 fused through bond 3-4 to seven-ring 3-5-6-7-8-9-4.
pub fn azulene() -> Mol {
    let mut atoms = vec![Atom::new(6).with_hydrogens(1); 10];
    atoms[3] = Atom::new(6);
    atoms[4] = Atom::new(6);
    mol_from(
        &atoms,
        &[
            (0, 1, D),
            (1, 2, S),
            (2, 3, D),
            (3, 4, S),
            (4, 0, S),
            (3, 5, S),
            (5, 6, D),
            (6, 7, S),
            (7, 8, D),
            (8, 9, S),
            (9, 4, D),
        ],
    )
}

/// Three six-rings around `center` (atom 0), which is bonded to perimeter
/// atoms 1, 5 and 9. The twelve-atom perimeter 1..=12 holds five double bonds
/// and two carbanions (atoms 11 and 12), 14 π electrons in all.
pub fn phenalene(center: Atom) -> Mol {
    let mut atoms = vec![center];
    for i in 0..12 {
        let charge = if i >= 10 { -1 } else { 0 };
        let hydrogens = if i % 4 == 0 { 0 } else { 1 };
        atoms.push(Atom::new(6).with_hydrogens(hydrogens).with_charge(charge));
    }
    let mut bonds: Vec<_> = (0..12)
        .map(|i| {
            let order = if i % 2 == 0 && i < 10 { D } else { S };
            (1 + i, 1 + (i + 1) % 12, order)
        })
        .collect();
    for p in [1, 5, 9] {
        bonds.push((0, p, S));
    }
    mol_from(&atoms, &bonds)
}

/// Three linearly fused six-rings: perimeter 0..14 with chords 4-13 and 6-11.
pub fn anthracene() -> Mol {
    let mut bonds: Vec<_> = (0..14).map(|i| (i, (i + 1) % 14, S)).collect();
    bonds.push((4, 13, S));
    bonds.push((6, 11, S));
    mol_from(&vec![Atom::new(6); 14], &bonds)
}

/// Five-ring 0-1-2-3-4 and six-ring 0-5-6-7-8-9 sharing atom 0.
pub fn spiro_decane() -> Mol {
    mol_from(
        &vec![Atom::new(6); 10],
        &[
            (0, 1, S),
            (1, 2, S),
            (2, 3, S),
            (3, 4, S),
            (4, 0, S),
            (0, 5, S),
            (5, 6, S),
            (6, 7, S),
            (7, 8, S),
            (8, 9, S),
            (9, 0, S),
        ],
    )
}

/// Bridgeheads 0 and 3 joined by bridges 1-2, 4-5 and 6.
pub fn norbornane() -> Mol {
    mol_from(
        &vec![Atom::new(6); 7],
        &[
            (0, 1, S),
            (1, 2, S),
            (2, 3, S),
            (3, 5, S),
            (5, 4, S),
            (4, 0, S),
            (0, 6, S),
            (6, 3, S),
        ],
    )
}

/// Corners of a cube, bonded when their indices differ in one bit.
pub fn cubane() -> Mol {
    let mut bonds = Vec::new();
    for a in 0..8usize {
        for bit in [1, 2, 4] {
            let b = a ^ bit;
            if a < b {
                bonds.push((a, b, S));
            }
        }
    }
    mol_from(&vec![Atom::new(6).with_hydrogens(1); 8], &bonds)
}

/// Square lattice of `n` by `n` saturated carbons.
pub fn grid(n: usize) -> Mol {
    let mut bonds = Vec::new();
    for r in 0..n {
        for c in 0..n {
            let here = r * n + c;
            if c + 1 < n {
                bonds.push((here, here + 1, S));
            }
            if r + 1 < n {
                bonds.push((here, here + n, S));
            }
        }
    }
    mol_from(&vec![Atom::new(6); n * n], &bonds)
}

/// Complete graph on four atoms.
pub fn tetrahedrane() -> Mol {
    let mut bonds = Vec::new();
    for a in 0..4 {
        for b in a + 1..4 {
            bonds.push((a, b, S));
        }
    }
    mol_from(&vec![Atom::new(6).with_hydrogens(1); 4], &bonds)
}
