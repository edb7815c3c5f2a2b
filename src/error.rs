//! Error type shared by the graph store, the property cache and the
//! perception algorithms.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::property::PropertyKey;

/// The kind of item an index or lookup refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Atom,
    Bond,
    Property,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom => write!(f, "atom"),
            Self::Bond => write!(f, "bond"),
            Self::Property => write!(f, "property"),
        }
    }
}

/// Why an unbounded computation stopped before finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// More rings were found than the caller allowed.
    RingLimit(usize),
    /// The wall-clock budget was exhausted.
    Timeout(Duration),
    /// A [`CancellationToken`](crate::CancellationToken) was triggered.
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RingLimit(n) => write!(f, "more than {} rings", n),
            Self::Timeout(t) => write!(f, "timeout after {:?}", t),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Errors produced by [`Mol`](crate::Mol) and the perception algorithms.
///
/// Structural errors (bad indices, missing items) are never recovered
/// internally. Malformed ring candidates and mistyped explicit properties
/// only surface as errors when
/// [`strict_error_checking`](crate::PerceptionConfig::strict_error_checking)
/// is enabled; otherwise they are skipped with a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MolError {
    /// An atom or bond index is not in `[0, count)`.
    #[error("{kind} index {index} out of range (count {count})")]
    IndexOutOfRange {
        kind: ItemKind,
        index: usize,
        count: usize,
    },

    /// A queried atom, bond or property does not exist.
    #[error("{kind} not found: {detail}")]
    ItemNotFound { kind: ItemKind, detail: String },

    /// A bulk operation received a container of the wrong length.
    #[error("size mismatch: expected {expected}, found {found}")]
    SizeMismatch { expected: usize, found: usize },

    /// A bounded computation exceeded its caller-specified limit.
    #[error("computation aborted: {0}")]
    ComputationAborted(AbortReason),

    /// An explicit property value has a different variant than its key expects.
    #[error("property {key} does not hold a {expected} value")]
    PropertyType {
        key: PropertyKey,
        expected: &'static str,
    },

    /// A ring candidate is not an elementary cycle of the graph.
    #[error("ring candidate {index} is malformed: {reason}")]
    MalformedRing { index: usize, reason: String },
}

impl MolError {
    pub(crate) fn atom_index(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange {
            kind: ItemKind::Atom,
            index,
            count,
        }
    }

    pub(crate) fn bond_index(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange {
            kind: ItemKind::Bond,
            index,
            count,
        }
    }
}
