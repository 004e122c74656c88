use nalgebra::Vector3;
use serde::Deserialize;

use crate::{atom::Atom, error::DoriError, molecule::Molecule};

/// Represents a full molecule in a config file.
/// A molecule is just a list of positioned atoms.
#[derive(Deserialize)]
pub struct ConfigMolecule(Vec<ConfigAtom>);

#[derive(Deserialize)]
struct ConfigAtom {
    atomic_number: u32,
    /// in bohr
    position: Vec<f64>,
}

pub(super) fn to_position(coordinates: &[f64]) -> Result<Vector3<f64>, DoriError> {
    match *coordinates {
        [x, y, z] => Ok(Vector3::new(x, y, z)),
        _ => Err(DoriError::InvalidPosition(coordinates.len())),
    }
}

impl TryFrom<ConfigMolecule> for Molecule {
    type Error = DoriError;

    fn try_from(value: ConfigMolecule) -> Result<Self, Self::Error> {
        let ConfigMolecule(config_atoms) = value;

        let atoms = config_atoms
            .into_iter()
            .map(|atom| Ok(Atom::new(atom.atomic_number, to_position(&atom.position)?)))
            .collect::<Result<Vec<_>, DoriError>>()?;

        Ok(Molecule::new(atoms))
    }
}
