pub mod aromaticity;
pub mod atom;
mod bitset;
pub mod bond;
pub mod cache;
pub mod config;
pub mod error;
pub mod mol;
pub mod perception;
pub mod property;
pub mod ring_search;
pub mod rings;
pub mod topology;
pub mod traits;

pub use aromaticity::{
    is_huckel, perceive_aromaticity, Aromaticity, AromaticityClassifier, AromaticityOptions,
    PassKind, PassSummary,
};
pub use atom::Atom;
pub use bond::{Bond, BondOrder};
pub use cache::PropertyCache;
pub use config::{CompleteRingSetConfig, PerceptionConfig};
pub use error::{AbortReason, ItemKind, MolError};
pub use mol::Mol;
pub use property::{Entity, Property, PropertyKey, PropertyMap, PropertyType, PropertyValue};
pub use ring_search::{complete_ring_set, CancellationToken, RingSearchLimits};
pub use rings::{Ring, RingSet};
pub use topology::{
    bfs_distances, connected_components, cycle_rank, distance_matrix, DistanceMatrix, Fragment,
    UNREACHABLE,
};
pub use traits::{
    HasAtomicNum, HasBondOrder, HasBondOrderMut, HasFormalCharge, HasHydrogenCount, HasIsotope,
};

#[cfg(test)]
mod testing;
