//! Complete ring set: every elementary cycle, not just a basis.
//!
//! The number of elementary cycles grows exponentially with the number of
//! fused rings, so the search is bounded. Callers bound it by ring size,
//! by ring count, by wall-clock time, or through a [`CancellationToken`]
//! shared with another thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::{debug, warn};

use crate::error::{AbortReason, MolError};
use crate::mol::Mol;
use crate::rings::{Ring, RingSet};

/// Steps between two checks of the clock and the cancellation flag.
const CHECK_INTERVAL: usize = 256;

/// A flag that aborts a running ring search when set.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RingSearchLimits {
    /// Rings larger than this are not enumerated (and do not count towards
    /// `max_rings`).
    pub max_ring_size: Option<usize>,
    /// Abort once more than this many rings have been found.
    pub max_rings: Option<usize>,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

struct Budget<'a> {
    limits: &'a RingSearchLimits,
    deadline: Option<Instant>,
    steps: usize,
}

impl<'a> Budget<'a> {
    fn new(limits: &'a RingSearchLimits) -> Self {
        Self {
            limits,
            deadline: limits.timeout.map(|t| Instant::now() + t),
            steps: 0,
        }
    }

    fn check_now(&self) -> Result<(), AbortReason> {
        if self.limits.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            return Err(AbortReason::Cancelled);
        }
        if let (Some(deadline), Some(timeout)) = (self.deadline, self.limits.timeout) {
            if Instant::now() >= deadline {
                return Err(AbortReason::Timeout(timeout));
            }
        }
        Ok(())
    }

    fn step(&mut self) -> Result<(), AbortReason> {
        self.steps += 1;
        if self.steps % CHECK_INTERVAL == 0 {
            self.check_now()
        } else {
            Ok(())
        }
    }

    fn found(&self, count: usize) -> Result<(), AbortReason> {
        match self.limits.max_rings {
            Some(max) if count > max => Err(AbortReason::RingLimit(max)),
            _ => Ok(()),
        }
    }
}

/// Enumerates every elementary cycle of `mol`, smallest first.
pub fn complete_ring_set<A, B>(
    mol: &Mol<A, B>,
    limits: &RingSearchLimits,
) -> Result<RingSet, MolError> {
    complete_ring_set_with(mol, &RingSet::sssr(mol), limits)
}

/// Like [`complete_ring_set`], reusing an already perceived SSSR to find the
/// ring bonds.
pub(crate) fn complete_ring_set_with<A, B>(
    mol: &Mol<A, B>,
    sssr: &RingSet,
    limits: &RingSearchLimits,
) -> Result<RingSet, MolError> {
    let mut budget = Budget::new(limits);
    budget.check_now().map_err(abort)?;

    // Every elementary cycle lies within the bonds of the SSSR.
    let mut adjacency: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![Vec::new(); mol.atom_count()];
    let mut ring_bonds: Vec<EdgeIndex> = sssr
        .iter()
        .flat_map(|r| r.bonds().iter().copied())
        .collect();
    ring_bonds.sort_unstable();
    ring_bonds.dedup();
    for &bond in &ring_bonds {
        if let Some((u, v)) = mol.bond_endpoints(bond) {
            adjacency[u.index()].push((v, bond));
            adjacency[v.index()].push((u, bond));
        }
    }

    let max_size = limits.max_ring_size.unwrap_or(usize::MAX);
    let mut rings = Vec::new();
    let mut on_path = vec![false; mol.atom_count()];

    for start in 0..mol.atom_count() {
        if adjacency[start].len() < 2 {
            continue;
        }
        let start = NodeIndex::new(start);
        let mut atoms = vec![start];
        let mut bonds: Vec<EdgeIndex> = Vec::new();
        let mut cursors = vec![0usize];
        on_path[start.index()] = true;

        while let Some(cursor) = cursors.last_mut() {
            let current = atoms[atoms.len() - 1];
            let Some(&(next, bond)) = adjacency[current.index()].get(*cursor) else {
                cursors.pop();
                on_path[current.index()] = false;
                atoms.pop();
                bonds.pop();
                continue;
            };
            *cursor += 1;
            budget.step().map_err(abort)?;

            if next == start {
                // Each cycle is walked in both directions; keep one.
                if atoms.len() >= 3 && atoms[1] < atoms[atoms.len() - 1] {
                    let mut ring_bonds = bonds.clone();
                    ring_bonds.push(bond);
                    rings.push(Ring::from_parts(atoms.clone(), ring_bonds));
                    budget.found(rings.len()).map_err(abort)?;
                }
                continue;
            }
            // Only atoms above `start` are visited, so each cycle is rooted at
            // its lowest atom.
            if next < start || on_path[next.index()] || atoms.len() >= max_size {
                continue;
            }
            on_path[next.index()] = true;
            atoms.push(next);
            bonds.push(bond);
            cursors.push(0);
        }
    }

    let mut set = RingSet::new(rings);
    set.sort();
    debug!(rings = set.num_rings(), steps = budget.steps, "enumerated complete ring set");
    Ok(set)
}

fn abort(reason: AbortReason) -> MolError {
    warn!(%reason, "complete ring search aborted");
    MolError::ComputationAborted(reason)
}
