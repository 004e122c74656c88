use std::collections::HashMap;

use crate::atom::Atom;

use super::ContractedGaussian;

#[derive(Debug)]
pub struct BasisSet {
    atomic_mapping: HashMap<u32, AtomicBasis>,
}

impl BasisSet {
    /// Returns the basis of a given atom, if it exists.
    pub fn for_atom(&self, atom: &Atom) -> Option<&AtomicBasis> {
        self.atomic_mapping.get(&atom.atomic_number)
    }

    /// Create a new basis set given mappings from atomic number to the basis of that element
    pub(crate) fn new(atomic_mapping: HashMap<u32, AtomicBasis>) -> Self {
        Self { atomic_mapping }
    }
}

/// Represents the basis functions for a single atom.
#[derive(Debug)]
pub struct AtomicBasis {
    pub(crate) shells: Vec<ElectronShell>,
}

impl AtomicBasis {
    pub(crate) fn empty() -> Self {
        Self { shells: Vec::new() }
    }

    pub fn basis_functions(&self) -> impl Iterator<Item = &ContractedGaussian> {
        self.shells.iter().flat_map(|shell| &shell.basis_functions)
    }

    pub fn shells(&self) -> &[ElectronShell] {
        &self.shells
    }
}

/// All cartesian functions of one angular momentum within a shell.
#[derive(Debug, Clone)]
pub struct ElectronShell {
    pub(crate) angular_magnitude: i32,
    pub(crate) basis_functions: Vec<ContractedGaussian>,
}

impl ElectronShell {
    pub(crate) fn new(angular_magnitude: i32) -> Self {
        Self {
            angular_magnitude,
            basis_functions: Vec::new(),
        }
    }

    pub fn angular_magnitude(&self) -> i32 {
        self.angular_magnitude
    }
}
