//! Built-in cached properties and the query surface used by downstream
//! consumers (force fields, fingerprints, descriptors).
//!
//! Every query goes through [`Mol::get`], so repeated calls between edits
//! reuse one computation and any edit invalidates all of them at once.

use std::sync::Arc;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::aromaticity::{Aromaticity, AromaticityClassifier};
use crate::error::MolError;
use crate::mol::Mol;
use crate::property::{Entity, Property, PropertyKey};
use crate::ring_search::complete_ring_set_with;
use crate::rings::RingSet;
use crate::topology::{connected_components, distance_matrix, DistanceMatrix, Fragment};
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

/// Smallest set of smallest rings of the molecule.
pub struct Sssr;

impl<A, B> Property<A, B> for Sssr {
    type Value = Arc<RingSet>;
    const KEY: PropertyKey = PropertyKey::Sssr;

    fn compute(mol: &Mol<A, B>, entity: Entity) -> Result<Self::Value, MolError> {
        entity.expect_mol(&PropertyKey::Sssr)?;
        Ok(Arc::new(RingSet::sssr(mol)))
    }
}

/// Every elementary cycle, bounded by the molecule's
/// [`CompleteRingSetConfig`](crate::CompleteRingSetConfig).
pub struct CompleteRings;

impl<A, B> Property<A, B> for CompleteRings {
    type Value = Arc<RingSet>;
    const KEY: PropertyKey = PropertyKey::CompleteRings;

    fn compute(mol: &Mol<A, B>, entity: Entity) -> Result<Self::Value, MolError> {
        entity.expect_mol(&PropertyKey::CompleteRings)?;
        // An explicit SSSR may be partial; the search needs every ring bond.
        let sssr = match mol.property(Entity::Mol, &PropertyKey::Sssr)? {
            Some(_) => Arc::new(RingSet::sssr(mol)),
            None => mol.sssr()?,
        };
        let limits = mol.config().complete_ring_set.limits();
        complete_ring_set_with(mol, &sssr, &limits).map(Arc::new)
    }
}

pub struct RingAtom;

impl<A, B> Property<A, B> for RingAtom {
    type Value = bool;
    const KEY: PropertyKey = PropertyKey::RingAtom;

    fn compute(mol: &Mol<A, B>, entity: Entity) -> Result<bool, MolError> {
        let atom = entity.expect_atom(&PropertyKey::RingAtom)?;
        mol.check_atom(atom)?;
        Ok(mol.sssr()?.is_ring_atom(atom))
    }

    fn default_value(_mol: &Mol<A, B>, _entity: Entity) -> Option<bool> {
        Some(false)
    }
}

pub struct RingBond;

impl<A, B> Property<A, B> for RingBond {
    type Value = bool;
    const KEY: PropertyKey = PropertyKey::RingBond;

    fn compute(mol: &Mol<A, B>, entity: Entity) -> Result<bool, MolError> {
        let bond = entity.expect_bond(&PropertyKey::RingBond)?;
        mol.check_bond(bond)?;
        Ok(mol.sssr()?.is_ring_bond(bond))
    }

    fn default_value(_mol: &Mol<A, B>, _entity: Entity) -> Option<bool> {
        Some(false)
    }
}

/// Aromaticity of the SSSR rings, classified with the molecule's
/// [`AromaticityOptions`](crate::AromaticityOptions).
pub struct AromaticRings;

impl<A, B> Property<A, B> for AromaticRings
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    type Value = Arc<Aromaticity>;
    const KEY: PropertyKey = PropertyKey::Aromaticity;

    fn compute(mol: &Mol<A, B>, entity: Entity) -> Result<Self::Value, MolError> {
        entity.expect_mol(&PropertyKey::Aromaticity)?;
        let config = mol.config();
        let sssr = mol.sssr()?;
        AromaticityClassifier::new(config.aromaticity.clone())
            .strict(config.strict_error_checking)
            .classify(mol, &sssr)
            .map(Arc::new)
    }

    fn default_value(mol: &Mol<A, B>, _entity: Entity) -> Option<Self::Value> {
        Some(Arc::new(Aromaticity::none(mol)))
    }
}

pub struct AromaticAtom;

impl<A, B> Property<A, B> for AromaticAtom
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    type Value = bool;
    const KEY: PropertyKey = PropertyKey::AromaticAtom;

    fn compute(mol: &Mol<A, B>, entity: Entity) -> Result<bool, MolError> {
        let atom = entity.expect_atom(&PropertyKey::AromaticAtom)?;
        mol.check_atom(atom)?;
        Ok(mol.aromaticity()?.is_aromatic_atom(atom))
    }

    fn default_value(_mol: &Mol<A, B>, _entity: Entity) -> Option<bool> {
        Some(false)
    }
}

pub struct AromaticBond;

impl<A, B> Property<A, B> for AromaticBond
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    type Value = bool;
    const KEY: PropertyKey = PropertyKey::AromaticBond;

    fn compute(mol: &Mol<A, B>, entity: Entity) -> Result<bool, MolError> {
        let bond = entity.expect_bond(&PropertyKey::AromaticBond)?;
        mol.check_bond(bond)?;
        Ok(mol.aromaticity()?.is_aromatic_bond(bond))
    }

    fn default_value(_mol: &Mol<A, B>, _entity: Entity) -> Option<bool> {
        Some(false)
    }
}

pub struct Distances;

impl<A, B> Property<A, B> for Distances {
    type Value = Arc<DistanceMatrix>;
    const KEY: PropertyKey = PropertyKey::DistanceMatrix;

    fn compute(mol: &Mol<A, B>, entity: Entity) -> Result<Self::Value, MolError> {
        entity.expect_mol(&PropertyKey::DistanceMatrix)?;
        Ok(Arc::new(distance_matrix(mol)))
    }
}

pub struct Components;

impl<A, B> Property<A, B> for Components {
    type Value = Arc<Vec<Fragment>>;
    const KEY: PropertyKey = PropertyKey::Components;

    fn compute(mol: &Mol<A, B>, entity: Entity) -> Result<Self::Value, MolError> {
        entity.expect_mol(&PropertyKey::Components)?;
        Ok(Arc::new(connected_components(mol)))
    }
}

impl<A, B> Mol<A, B> {
    pub fn sssr(&self) -> Result<Arc<RingSet>, MolError> {
        Ok(self.get::<Sssr>(Entity::Mol, true, false)?.unwrap_or_default())
    }

    /// Every elementary cycle, or `None` while complete ring perception is
    /// disabled in the configuration (and no explicit value is set).
    ///
    /// The number of cycles is exponential in the number of fused rings;
    /// configure `max_rings` or `timeout_ms` for untrusted input.
    pub fn complete_ring_set(&self) -> Result<Option<Arc<RingSet>>, MolError> {
        let enabled = self.config().complete_ring_set.enabled;
        self.get::<CompleteRings>(Entity::Mol, enabled, false)
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> Result<bool, MolError> {
        Ok(self.get::<RingAtom>(Entity::Atom(atom), true, true)?.unwrap_or(false))
    }

    pub fn is_ring_bond(&self, bond: EdgeIndex) -> Result<bool, MolError> {
        Ok(self.get::<RingBond>(Entity::Bond(bond), true, true)?.unwrap_or(false))
    }

    pub fn distance_matrix(&self) -> Result<Arc<DistanceMatrix>, MolError> {
        Ok(self.get::<Distances>(Entity::Mol, true, false)?.unwrap_or_default())
    }

    /// Number of bonds on a shortest path, or
    /// [`UNREACHABLE`](crate::UNREACHABLE) across components.
    pub fn topological_distance(&self, a: NodeIndex, b: NodeIndex) -> Result<usize, MolError> {
        self.check_atom(a)?;
        self.check_atom(b)?;
        self.distance_matrix()?.try_get(a.index(), b.index())
    }

    pub fn topological_diameter(&self) -> Result<usize, MolError> {
        Ok(self.distance_matrix()?.diameter())
    }

    pub fn components(&self) -> Result<Arc<Vec<Fragment>>, MolError> {
        Ok(self.get::<Components>(Entity::Mol, true, false)?.unwrap_or_default())
    }
}

impl<A, B> Mol<A, B>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    /// Aromaticity of the SSSR. With `perceive_aromaticity` off, only an
    /// explicitly set value is returned; otherwise nothing is aromatic.
    pub fn aromaticity(&self) -> Result<Arc<Aromaticity>, MolError> {
        let perceive = self.config().perceive_aromaticity;
        let value = self.get::<AromaticRings>(Entity::Mol, perceive, true)?;
        Ok(value.unwrap_or_else(|| Arc::new(Aromaticity::none(self))))
    }

    pub fn aromatic_rings(&self) -> Result<RingSet, MolError> {
        Ok(self.aromaticity()?.rings().clone())
    }

    pub fn is_aromatic_atom(&self, atom: NodeIndex) -> Result<bool, MolError> {
        Ok(self.get::<AromaticAtom>(Entity::Atom(atom), true, true)?.unwrap_or(false))
    }

    pub fn is_aromatic_bond(&self, bond: EdgeIndex) -> Result<bool, MolError> {
        Ok(self.get::<AromaticBond>(Entity::Bond(bond), true, true)?.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::{AbortReason, ItemKind};
    use crate::testing::*;
    use crate::{Atom, Bond, BondOrder, PerceptionConfig, UNREACHABLE};

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn e(i: usize) -> EdgeIndex {
        EdgeIndex::new(i)
    }

    static RING_COUNT_CALLS: AtomicUsize = AtomicUsize::new(0);

    struct RingCount;

    impl Property<Atom, Bond> for RingCount {
        type Value = usize;
        const KEY: PropertyKey = PropertyKey::custom("ring_count");

        fn compute(mol: &Mol, _entity: Entity) -> Result<usize, MolError> {
            RING_COUNT_CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(mol.sssr()?.num_rings())
        }
    }

    #[test]
    fn computed_once_between_mutations() {
        let mut mol = naphthalene(true);
        let calls = || RING_COUNT_CALLS.load(Ordering::SeqCst);
        assert_eq!(mol.get::<RingCount>(Entity::Mol, true, false), Ok(Some(2)));
        assert_eq!(mol.get::<RingCount>(Entity::Mol, true, false), Ok(Some(2)));
        assert_eq!(calls(), 1);

        mol.remove_bond(e(10)).unwrap();
        assert_eq!(mol.get::<RingCount>(Entity::Mol, true, false), Ok(Some(1)));
        assert_eq!(mol.get::<RingCount>(Entity::Mol, true, false), Ok(Some(1)));
        assert_eq!(calls(), 2);

        mol.bond_mut(e(0)).order = BondOrder::Single;
        assert_eq!(mol.get::<RingCount>(Entity::Mol, true, false), Ok(Some(1)));
        assert_eq!(calls(), 3);
    }

    #[test]
    fn not_computed_without_request() {
        let mol = benzene();
        assert_eq!(mol.get::<Sssr>(Entity::Mol, false, false), Ok(None));
        assert_eq!(mol.get::<RingAtom>(Entity::Atom(n(0)), false, true), Ok(Some(false)));
        assert!(mol.cache().is_empty());
        mol.sssr().unwrap();
        assert_eq!(mol.cache().len(), 1);
        assert_eq!(mol.get::<Sssr>(Entity::Mol, false, false).unwrap().unwrap().num_rings(), 1);
    }

    #[test]
    fn sssr_shared_until_edit() {
        let mut mol = benzene();
        let first = mol.sssr().unwrap();
        assert!(Arc::ptr_eq(&first, &mol.sssr().unwrap()));
        let c = mol.add_atom(Atom::new(6));
        mol.add_bond(n(0), c, Bond::default()).unwrap();
        let second = mol.sssr().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn explicit_value_wins() {
        let mut mol = benzene();
        mol.set_property(Entity::Mol, PropertyKey::Sssr, Arc::new(RingSet::default()))
            .unwrap();
        assert!(mol.sssr().unwrap().is_empty());
        assert!(!mol.is_ring_atom(n(0)).unwrap());

        mol.clear_property(Entity::Mol, &PropertyKey::Sssr).unwrap();
        assert_eq!(mol.sssr().unwrap().num_rings(), 1);

        mol.set_property(Entity::Atom(n(2)), PropertyKey::AromaticAtom, false)
            .unwrap();
        assert!(!mol.is_aromatic_atom(n(2)).unwrap());
        assert!(mol.is_aromatic_atom(n(3)).unwrap());
    }

    #[test]
    fn mistyped_explicit_value() {
        let mut mol = benzene();
        mol.set_property(Entity::Mol, PropertyKey::Sssr, 7usize).unwrap();
        assert_eq!(mol.sssr().unwrap().num_rings(), 1);

        let mut config = PerceptionConfig::default();
        config.strict_error_checking = true;
        mol.set_config(config);
        assert_eq!(
            mol.sssr(),
            Err(MolError::PropertyType {
                key: PropertyKey::Sssr,
                expected: "rings",
            })
        );
    }

    #[test]
    fn property_on_wrong_entity() {
        let mol = benzene();
        let err = mol.get::<Sssr>(Entity::Atom(n(0)), true, false).unwrap_err();
        assert!(matches!(err, MolError::ItemNotFound { kind: ItemKind::Property, .. }));
        assert!(mol.is_ring_atom(n(42)).is_err());
    }

    #[test]
    fn ring_flags() {
        let mol = phenol();
        assert!(mol.is_ring_atom(n(0)).unwrap());
        assert!(!mol.is_ring_atom(n(6)).unwrap());
        assert!(mol.is_ring_bond(e(0)).unwrap());
        assert!(!mol.is_ring_bond(e(6)).unwrap());
    }

    #[test]
    fn benzene_aromatic_until_bond_cleared() {
        let mut mol = benzene();
        assert!(mol.is_aromatic_atom(n(0)).unwrap());
        assert!(mol.is_aromatic_bond(e(3)).unwrap());
        assert_eq!(mol.aromatic_rings().unwrap().num_rings(), 1);

        mol.bond_mut(e(2)).order = BondOrder::Unspecified;
        assert!(!mol.is_aromatic_atom(n(0)).unwrap());
        assert!(!mol.is_aromatic_bond(e(3)).unwrap());
        assert!(mol.aromatic_rings().unwrap().is_empty());
    }

    #[test]
    fn bulk_bond_orders_invalidate() {
        let mut mol = ring_of_carbons(&[BondOrder::Single; 6]);
        assert!(!mol.is_aromatic_atom(n(0)).unwrap());
        mol.set_bond_orders(&KEKULE_6).unwrap();
        assert!(mol.is_aromatic_atom(n(0)).unwrap());
        assert_eq!(
            mol.set_bond_orders(&[BondOrder::Single]),
            Err(MolError::SizeMismatch {
                expected: 6,
                found: 1
            })
        );
    }

    #[test]
    fn aromaticity_can_be_switched_off() {
        let mut config = PerceptionConfig::default();
        config.perceive_aromaticity = false;
        let mut mol = benzene();
        mol.set_config(config);
        assert!(!mol.is_aromatic_atom(n(0)).unwrap());
        assert!(mol.aromatic_rings().unwrap().is_empty());
        assert!(mol.aromaticity().unwrap().passes().is_empty());
    }

    #[test]
    fn fused_system_needs_second_pass() {
        let mut mol = fused_zwitterion();
        let mut config = PerceptionConfig::default();
        config.aromaticity.max_passes = Some(1);
        mol.set_config(config.clone());
        assert!(mol.aromatic_rings().unwrap().is_empty());

        config.aromaticity.max_passes = Some(2);
        mol.set_config(config);
        assert_eq!(mol.aromatic_rings().unwrap().num_rings(), 2);
        assert!(mol.atoms().all(|a| mol.is_aromatic_atom(a).unwrap()));
    }

    #[test]
    fn complete_ring_set_follows_config() {
        let mut mol = naphthalene(true);
        assert_eq!(mol.complete_ring_set(), Ok(None));

        let mut config = PerceptionConfig::default();
        config.complete_ring_set.enabled = true;
        mol.set_config(config.clone());
        assert_eq!(mol.complete_ring_set().unwrap().unwrap().ring_sizes(), vec![6, 6, 10]);

        config.complete_ring_set.max_rings = Some(1);
        mol.set_config(config);
        assert_eq!(
            mol.complete_ring_set(),
            Err(MolError::ComputationAborted(AbortReason::RingLimit(1)))
        );
    }

    #[test]
    fn complete_ring_set_ignores_explicit_sssr() {
        let mut mol = naphthalene(true);
        let mut config = PerceptionConfig::default();
        config.complete_ring_set.enabled = true;
        mol.set_config(config);

        let one_ring = RingSet::new(vec![RingSet::sssr(&mol).rings()[0].clone()]);
        mol.set_property(Entity::Mol, PropertyKey::Sssr, Arc::new(one_ring))
            .unwrap();
        assert_eq!(mol.sssr().unwrap().num_rings(), 1);
        assert_eq!(
            mol.complete_ring_set().unwrap().unwrap().ring_sizes(),
            vec![6, 6, 10]
        );
    }

    #[test]
    fn distances_across_components() {
        let mut mol = chain(3);
        let lone = mol.add_atom(Atom::new(8));
        assert_eq!(mol.topological_distance(n(0), n(2)), Ok(2));
        assert_eq!(mol.topological_distance(n(0), lone), Ok(UNREACHABLE));
        assert_eq!(mol.topological_diameter(), Ok(2));
        assert_eq!(mol.components().unwrap().len(), 2);
        assert!(mol.topological_distance(n(0), n(9)).is_err());
    }

    #[test]
    fn empty_molecule_queries() {
        let mol: Mol = Mol::new();
        assert!(mol.sssr().unwrap().is_empty());
        assert!(mol.aromatic_rings().unwrap().is_empty());
        assert!(mol.distance_matrix().unwrap().is_empty());
        assert_eq!(mol.topological_diameter(), Ok(0));
        assert!(mol.components().unwrap().is_empty());
    }
}
