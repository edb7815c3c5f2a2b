//! Property keys, tagged property values and the typed [`Property`] trait.
//!
//! Every derived attribute of a [`Mol`] is a [`Property`]: a typed key that
//! knows how to compute its value from the graph. Values are stored as the
//! [`PropertyValue`] sum type, both in the explicit per-entity maps and in the
//! generation-stamped [`PropertyCache`](crate::cache::PropertyCache).

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::aromaticity::Aromaticity;
use crate::error::{ItemKind, MolError};
use crate::mol::Mol;
use crate::rings::RingSet;
use crate::topology::{DistanceMatrix, Fragment};

/// The owner of a property: the molecule itself, one atom, or one bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Entity {
    Mol,
    Atom(NodeIndex),
    Bond(EdgeIndex),
}

impl Entity {
    pub(crate) fn expect_mol(self, key: &PropertyKey) -> Result<(), MolError> {
        match self {
            Self::Mol => Ok(()),
            other => Err(other.undefined(key)),
        }
    }

    pub(crate) fn expect_atom(self, key: &PropertyKey) -> Result<NodeIndex, MolError> {
        match self {
            Self::Atom(idx) => Ok(idx),
            other => Err(other.undefined(key)),
        }
    }

    pub(crate) fn expect_bond(self, key: &PropertyKey) -> Result<EdgeIndex, MolError> {
        match self {
            Self::Bond(idx) => Ok(idx),
            other => Err(other.undefined(key)),
        }
    }

    fn undefined(self, key: &PropertyKey) -> MolError {
        MolError::ItemNotFound {
            kind: ItemKind::Property,
            detail: format!("{} is not defined for {}", key, self),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mol => write!(f, "molecule"),
            Self::Atom(idx) => write!(f, "atom {}", idx.index()),
            Self::Bond(idx) => write!(f, "bond {}", idx.index()),
        }
    }
}

/// Identifies a property. Built-in perception results have dedicated
/// variants; user properties use [`PropertyKey::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
    Sssr,
    CompleteRings,
    Aromaticity,
    AromaticAtom,
    AromaticBond,
    RingAtom,
    RingBond,
    DistanceMatrix,
    Components,
    Custom(Cow<'static, str>),
}

impl PropertyKey {
    pub const fn custom(name: &'static str) -> Self {
        Self::Custom(Cow::Borrowed(name))
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sssr => write!(f, "sssr"),
            Self::CompleteRings => write!(f, "complete_rings"),
            Self::Aromaticity => write!(f, "aromaticity"),
            Self::AromaticAtom => write!(f, "aromatic_atom"),
            Self::AromaticBond => write!(f, "aromatic_bond"),
            Self::RingAtom => write!(f, "ring_atom"),
            Self::RingBond => write!(f, "ring_bond"),
            Self::DistanceMatrix => write!(f, "distance_matrix"),
            Self::Components => write!(f, "components"),
            Self::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// A property value. Large perception results are shared behind [`Arc`] so
/// that cache hits are cheap.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    UInt(usize),
    Float(f64),
    Text(String),
    Rings(Arc<RingSet>),
    Distances(Arc<DistanceMatrix>),
    Fragments(Arc<Vec<Fragment>>),
    Aromaticity(Arc<Aromaticity>),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => bool::TYPE_NAME,
            Self::Int(_) => i64::TYPE_NAME,
            Self::UInt(_) => usize::TYPE_NAME,
            Self::Float(_) => f64::TYPE_NAME,
            Self::Text(_) => String::TYPE_NAME,
            Self::Rings(_) => <Arc<RingSet>>::TYPE_NAME,
            Self::Distances(_) => <Arc<DistanceMatrix>>::TYPE_NAME,
            Self::Fragments(_) => <Arc<Vec<Fragment>>>::TYPE_NAME,
            Self::Aromaticity(_) => <Arc<Aromaticity>>::TYPE_NAME,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

/// A Rust type that maps onto exactly one [`PropertyValue`] variant.
pub trait PropertyType:
    Clone + Into<PropertyValue> + TryFrom<PropertyValue, Error = PropertyValue>
{
    const TYPE_NAME: &'static str;
}

macro_rules! property_type {
    ($($variant:ident => $ty:ty, $name:literal;)*) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }

            impl TryFrom<PropertyValue> for $ty {
                type Error = PropertyValue;

                fn try_from(value: PropertyValue) -> Result<Self, PropertyValue> {
                    match value {
                        PropertyValue::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }

            impl PropertyType for $ty {
                const TYPE_NAME: &'static str = $name;
            }
        )*
    };
}

property_type! {
    Bool => bool, "bool";
    Int => i64, "int";
    UInt => usize, "uint";
    Float => f64, "float";
    Text => String, "text";
    Rings => Arc<RingSet>, "rings";
    Distances => Arc<DistanceMatrix>, "distances";
    Fragments => Arc<Vec<Fragment>>, "fragments";
    Aromaticity => Arc<Aromaticity>, "aromaticity";
}

/// Sparse explicit properties of one entity.
pub type PropertyMap = BTreeMap<PropertyKey, PropertyValue>;

/// A typed, lazily computed property of a [`Mol`].
///
/// [`Mol::get`] resolves a property through three tiers: an explicit value
/// set with [`Mol::set_property`], then a cached or freshly computed value,
/// then [`default_value`](Property::default_value). `compute` may itself
/// call [`Mol::get`] for other properties; cached values are tagged with the
/// molecule's generation, so any structural edit invalidates the whole chain.
///
/// # Examples
///
/// ```
/// use ringcrab::{Atom, Bond, Entity, Mol, MolError, Property, PropertyKey};
///
/// struct HeavyDegree;
///
/// impl Property<Atom, Bond> for HeavyDegree {
///     type Value = usize;
///     const KEY: PropertyKey = PropertyKey::custom("heavy_degree");
///
///     fn compute(mol: &Mol, entity: Entity) -> Result<usize, MolError> {
///         let idx = match entity {
///             Entity::Atom(idx) => idx,
///             _ => return Ok(0),
///         };
///         Ok(mol.neighbors(idx).filter(|&n| mol.atom(n).atomic_num > 1).count())
///     }
/// }
///
/// let mut mol: Mol = Mol::new();
/// let c = mol.add_atom(Atom::new(6));
/// let o = mol.add_atom(Atom::new(8));
/// mol.add_bond(c, o, Bond::default())?;
/// assert_eq!(mol.get::<HeavyDegree>(Entity::Atom(c), true, false)?, Some(1));
/// # Ok::<(), MolError>(())
/// ```
pub trait Property<A, B> {
    type Value: PropertyType;

    const KEY: PropertyKey;

    fn compute(mol: &Mol<A, B>, entity: Entity) -> Result<Self::Value, MolError>;

    /// Structural default returned (uncached) when computation is not requested.
    fn default_value(_mol: &Mol<A, B>, _entity: Entity) -> Option<Self::Value> {
        None
    }
}
