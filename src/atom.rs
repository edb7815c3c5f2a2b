/// Default atom type for a molecular graph node.
///
/// `Atom` stores intrinsic atomic properties, the things a format reader
/// assigns. Everything derived from the graph (ring membership, aromaticity,
/// distances) is perceived on demand and cached by the owning
/// [`Mol`](crate::Mol); sparse user data goes through
/// [`Mol::set_property`](crate::Mol::set_property).
///
/// # Examples
///
/// ```
/// use ringcrab::Atom;
///
/// let carbon = Atom {
///     atomic_num: 6,
///     hydrogen_count: 1,
///     ..Atom::default()
/// };
/// assert_eq!(carbon.formal_charge, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, 7 = N, …). `0` is a dummy/unknown atom.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    /// Number of implicit hydrogens carried by this atom.
    pub hydrogen_count: u8,
}

impl Atom {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }

    pub fn with_hydrogens(mut self, count: u8) -> Self {
        self.hydrogen_count = count;
        self
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.formal_charge = charge;
        self
    }
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasIsotope for Atom {
    fn isotope(&self) -> u16 {
        self.isotope
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.hydrogen_count
    }
}
