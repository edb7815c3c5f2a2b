use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use tracing::{trace, warn};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::cache::PropertyCache;
use crate::config::PerceptionConfig;
use crate::error::{ItemKind, MolError};
use crate::property::{Entity, Property, PropertyKey, PropertyMap, PropertyType, PropertyValue};
use crate::traits::HasBondOrderMut;

/// A mutable molecular graph with a lazily populated property cache.
///
/// Atoms and bonds are addressed by dense indices: after any sequence of
/// edits, atom indices are exactly `0..atom_count()` and bond indices exactly
/// `0..bond_count()`. Removing an item shifts every higher index down by
/// one, so indices held across a removal must be treated as invalid.
///
/// Every edit advances [`generation`](Mol::generation); cached properties
/// computed at an older generation are never returned.
pub struct Mol<A = Atom, B = Bond> {
    graph: UnGraph<A, B>,
    atom_props: Vec<PropertyMap>,
    bond_props: Vec<PropertyMap>,
    mol_props: PropertyMap,
    config: PerceptionConfig,
    generation: u64,
    cache: PropertyCache,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self::with_config(PerceptionConfig::default())
    }

    pub fn with_config(config: PerceptionConfig) -> Self {
        Self {
            graph: UnGraph::default(),
            atom_props: Vec::new(),
            bond_props: Vec::new(),
            mol_props: PropertyMap::new(),
            config,
            generation: 0,
            cache: PropertyCache::new(),
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PerceptionConfig) {
        self.config = config;
        self.touch();
    }

    /// Monotonic counter advanced by every edit.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cache(&self) -> &PropertyCache {
        &self.cache
    }

    /// # Panics
    ///
    /// Panics if `idx` is out of range; see [`try_atom`](Mol::try_atom).
    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn try_atom(&self, idx: NodeIndex) -> Result<&A, MolError> {
        self.check_atom(idx)?;
        Ok(&self.graph[idx])
    }

    /// Mutable access to an atom. Advances the generation because any atom
    /// field may feed a perceived property.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range; see [`try_atom_mut`](Mol::try_atom_mut).
    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        self.touch();
        &mut self.graph[idx]
    }

    pub fn try_atom_mut(&mut self, idx: NodeIndex) -> Result<&mut A, MolError> {
        self.check_atom(idx)?;
        Ok(self.atom_mut(idx))
    }

    /// # Panics
    ///
    /// Panics if `idx` is out of range; see [`try_bond`](Mol::try_bond).
    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn try_bond(&self, idx: EdgeIndex) -> Result<&B, MolError> {
        self.check_bond(idx)?;
        Ok(&self.graph[idx])
    }

    /// Mutable access to a bond. Advances the generation (bond orders drive
    /// aromaticity).
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of range; see [`try_bond_mut`](Mol::try_bond_mut).
    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        self.touch();
        &mut self.graph[idx]
    }

    pub fn try_bond_mut(&mut self, idx: EdgeIndex) -> Result<&mut B, MolError> {
        self.check_bond(idx)?;
        Ok(self.bond_mut(idx))
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        let idx = self.graph.add_node(atom);
        self.atom_props.push(PropertyMap::new());
        self.touch();
        idx
    }

    /// Connects two atoms.
    ///
    /// If a bond already joins `a` and `b`, its index is returned and `bond`
    /// is discarded. `a == b` creates a self-loop.
    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> Result<EdgeIndex, MolError> {
        self.check_atom(a)?;
        self.check_atom(b)?;
        if let Some(existing) = self.bond_between(a, b) {
            return Ok(existing);
        }
        Ok(self.push_bond(a, b, bond))
    }

    /// Connects two atoms even if they are already bonded, producing a
    /// multigraph. Duplicate bonds never take part in ring perception.
    pub fn add_parallel_bond(
        &mut self,
        a: NodeIndex,
        b: NodeIndex,
        bond: B,
    ) -> Result<EdgeIndex, MolError> {
        self.check_atom(a)?;
        self.check_atom(b)?;
        Ok(self.push_bond(a, b, bond))
    }

    fn push_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        let idx = self.graph.add_edge(a, b, bond);
        self.bond_props.push(PropertyMap::new());
        self.touch();
        idx
    }

    /// Removes an atom together with every bond incident to it, then
    /// compacts atom and bond indices.
    pub fn remove_atom(&mut self, idx: NodeIndex) -> Result<A, MolError> {
        self.check_atom(idx)?;
        let incident: Vec<EdgeIndex> = self.bonds_of(idx).collect();
        let (atom, _) = self.compact(Some(idx), &incident);
        self.atom_props.remove(idx.index());
        for bond in incident.iter().rev() {
            self.bond_props.remove(bond.index());
        }
        atom.ok_or_else(|| MolError::atom_index(idx.index(), self.atom_count()))
    }

    /// Removes one bond and compacts bond indices.
    pub fn remove_bond(&mut self, idx: EdgeIndex) -> Result<B, MolError> {
        self.check_bond(idx)?;
        let (_, mut bonds) = self.compact(None, &[idx]);
        self.bond_props.remove(idx.index());
        bonds
            .pop()
            .ok_or_else(|| MolError::bond_index(idx.index(), self.bond_count()))
    }

    /// Rebuilds the graph without `atom` and the sorted `bonds`, keeping the
    /// relative order of every surviving item.
    fn compact(&mut self, atom: Option<NodeIndex>, bonds: &[EdgeIndex]) -> (Option<A>, Vec<B>) {
        let (nodes, edges) = std::mem::take(&mut self.graph).into_nodes_edges();
        let mut graph = UnGraph::with_capacity(nodes.len(), edges.len());
        let mut removed_atom = None;
        for (i, node) in nodes.into_iter().enumerate() {
            if atom.is_some_and(|a| a.index() == i) {
                removed_atom = Some(node.weight);
            } else {
                graph.add_node(node.weight);
            }
        }

        let shift = |n: NodeIndex| match atom {
            Some(a) if n.index() > a.index() => NodeIndex::new(n.index() - 1),
            _ => n,
        };
        let mut removed_bonds = Vec::with_capacity(bonds.len());
        for (i, edge) in edges.into_iter().enumerate() {
            if bonds.binary_search(&EdgeIndex::new(i)).is_ok() {
                removed_bonds.push(edge.weight);
                continue;
            }
            graph.add_edge(shift(edge.source()), shift(edge.target()), edge.weight);
        }

        self.graph = graph;
        self.touch();
        self.cache.evict_stale(self.generation);
        (removed_atom, removed_bonds)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.atom_count() == 0
    }

    /// Bonds incident to `idx` in creation order. A self-loop appears once.
    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        let mut bonds: Vec<EdgeIndex> = self.graph.edges(idx).map(|e| e.id()).collect();
        bonds.sort_unstable();
        bonds.dedup();
        bonds.into_iter()
    }

    /// Neighbors of `idx`, one per incident bond, in bond creation order.
    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.bonds_of(idx)
            .filter_map(move |bond| self.other_atom(bond, idx))
    }

    /// Number of incident bonds.
    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.bonds_of(idx).count()
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    /// The lowest-index bond joining `a` and `b`, if any.
    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        if a.index() >= self.atom_count() || b.index() >= self.atom_count() {
            return None;
        }
        self.graph.edges_connecting(a, b).map(|e| e.id()).min()
    }

    /// Like [`bond_between`](Mol::bond_between), but reports a missing bond
    /// as [`MolError::ItemNotFound`].
    pub fn find_bond(&self, a: NodeIndex, b: NodeIndex) -> Result<EdgeIndex, MolError> {
        self.check_atom(a)?;
        self.check_atom(b)?;
        self.bond_between(a, b).ok_or_else(|| MolError::ItemNotFound {
            kind: ItemKind::Bond,
            detail: format!("no bond between atoms {} and {}", a.index(), b.index()),
        })
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    /// The endpoint of `bond` that is not `atom`; for a self-loop, `atom`.
    pub fn other_atom(&self, bond: EdgeIndex, atom: NodeIndex) -> Option<NodeIndex> {
        let (u, v) = self.bond_endpoints(bond)?;
        if u == atom {
            Some(v)
        } else if v == atom {
            Some(u)
        } else {
            None
        }
    }

    pub fn check_atom(&self, idx: NodeIndex) -> Result<(), MolError> {
        if idx.index() < self.atom_count() {
            Ok(())
        } else {
            Err(MolError::atom_index(idx.index(), self.atom_count()))
        }
    }

    pub fn check_bond(&self, idx: EdgeIndex) -> Result<(), MolError> {
        if idx.index() < self.bond_count() {
            Ok(())
        } else {
            Err(MolError::bond_index(idx.index(), self.bond_count()))
        }
    }

    /// Assigns every bond order at once, in bond index order.
    pub fn set_bond_orders(&mut self, orders: &[BondOrder]) -> Result<(), MolError>
    where
        B: HasBondOrderMut,
    {
        if orders.len() != self.bond_count() {
            return Err(MolError::SizeMismatch {
                expected: self.bond_count(),
                found: orders.len(),
            });
        }
        for (bond, &order) in self.graph.edge_weights_mut().zip(orders) {
            bond.set_bond_order(order);
        }
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.generation += 1;
    }

    /// Explicit properties of `entity`.
    pub fn properties(&self, entity: Entity) -> Result<&PropertyMap, MolError> {
        match entity {
            Entity::Mol => Ok(&self.mol_props),
            Entity::Atom(idx) => {
                self.check_atom(idx)?;
                Ok(&self.atom_props[idx.index()])
            }
            Entity::Bond(idx) => {
                self.check_bond(idx)?;
                Ok(&self.bond_props[idx.index()])
            }
        }
    }

    fn properties_mut(&mut self, entity: Entity) -> Result<&mut PropertyMap, MolError> {
        match entity {
            Entity::Mol => Ok(&mut self.mol_props),
            Entity::Atom(idx) => {
                self.check_atom(idx)?;
                Ok(&mut self.atom_props[idx.index()])
            }
            Entity::Bond(idx) => {
                self.check_bond(idx)?;
                Ok(&mut self.bond_props[idx.index()])
            }
        }
    }

    pub fn property(&self, entity: Entity, key: &PropertyKey) -> Result<Option<&PropertyValue>, MolError> {
        Ok(self.properties(entity)?.get(key))
    }

    /// Sets an explicit value, which takes precedence over any computed one.
    /// Returns the previous explicit value.
    pub fn set_property(
        &mut self,
        entity: Entity,
        key: PropertyKey,
        value: impl Into<PropertyValue>,
    ) -> Result<Option<PropertyValue>, MolError> {
        let previous = self.properties_mut(entity)?.insert(key, value.into());
        self.touch();
        Ok(previous)
    }

    pub fn clear_property(
        &mut self,
        entity: Entity,
        key: &PropertyKey,
    ) -> Result<Option<PropertyValue>, MolError> {
        let previous = self.properties_mut(entity)?.remove(key);
        if previous.is_some() {
            self.touch();
        }
        Ok(previous)
    }

    /// Resolves property `P` of `entity`.
    ///
    /// An explicit value wins. Otherwise a value cached at the current
    /// generation is returned; failing that, the value is computed and cached
    /// when `compute_if_missing` is set, or `P`'s structural default is
    /// returned (uncached) when `use_default` is set.
    pub fn get<P: Property<A, B>>(
        &self,
        entity: Entity,
        compute_if_missing: bool,
        use_default: bool,
    ) -> Result<Option<P::Value>, MolError> {
        let key = P::KEY;
        if let Some(value) = self.properties(entity)?.get(&key) {
            match P::Value::try_from(value.clone()) {
                Ok(value) => return Ok(Some(value)),
                Err(found) => {
                    if self.config.strict_error_checking {
                        return Err(MolError::PropertyType {
                            key,
                            expected: <P::Value as PropertyType>::TYPE_NAME,
                        });
                    }
                    warn!(
                        %key,
                        %entity,
                        found = found.type_name(),
                        "ignoring explicit property of the wrong type"
                    );
                }
            }
        }

        if let Some(value) = self.cache.lookup(entity, &key, self.generation) {
            if let Ok(value) = P::Value::try_from(value) {
                return Ok(Some(value));
            }
        }

        if compute_if_missing {
            trace!(%key, %entity, generation = self.generation, "computing property");
            let value = P::compute(self, entity)?;
            self.cache
                .store(entity, key, value.clone().into(), self.generation);
            return Ok(Some(value));
        }

        if use_default {
            return Ok(P::default_value(self, entity));
        }
        Ok(None)
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    /// Clones the graph, explicit properties and configuration. The clone
    /// starts with an empty cache.
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            atom_props: self.atom_props.clone(),
            bond_props: self.bond_props.clone(),
            mol_props: self.mol_props.clone(),
            config: self.config.clone(),
            generation: self.generation,
            cache: PropertyCache::new(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        for idx in self.atoms() {
            if self.atom(idx) != other.atom(idx) {
                return false;
            }
        }
        for idx in self.bonds() {
            if self.bond(idx) != other.bond(idx) {
                return false;
            }
            if self.bond_endpoints(idx) != other.bond_endpoints(idx) {
                return false;
            }
        }
        self.atom_props == other.atom_props
            && self.bond_props == other.bond_props
            && self.mol_props == other.mol_props
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("generation", &self.generation)
            .field("cached", &self.cache.len())
            .finish()
    }
}
