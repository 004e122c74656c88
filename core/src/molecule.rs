use crate::{
    atom::Atom,
    basis::{BasisFunction, BasisSet, MolecularBasis},
    error::DoriError,
};

/// Represents a molecule
#[derive(Debug)]
pub struct Molecule {
    pub(crate) atoms: Vec<Atom>,
}

impl Molecule {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Places the basis functions of every atom at its position. Functions are ordered by
    /// atom, then by shell, then by cartesian component, which is the order density
    /// matrices and fitting coefficients are expected in.
    pub fn basis(&self, basis_set: &BasisSet) -> Result<MolecularBasis, DoriError> {
        let mut functions = Vec::new();

        for atom in &self.atoms {
            let atomic_basis = basis_set.for_atom(atom).ok_or(DoriError::MissingBasis {
                atomic_number: atom.atomic_number,
            })?;

            functions.extend(
                atomic_basis
                    .basis_functions()
                    .map(|contracted_gaussian| BasisFunction {
                        contracted_gaussian: contracted_gaussian.clone(),
                        position: atom.position,
                    }),
            );
        }

        log::debug!(
            "{} basis functions on {} atoms",
            functions.len(),
            self.atoms.len()
        );
        Ok(MolecularBasis(functions))
    }
}
