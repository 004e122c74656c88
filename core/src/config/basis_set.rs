use std::collections::HashMap;

use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    basis::{AtomicBasis, BasisSet, ContractedGaussian, ElectronShell, Gaussian},
    error::DoriError,
};

/// A basis set in the JSON format of the Basis Set Exchange, keyed by atomic number.
#[derive(Deserialize)]
pub struct ConfigBasisSet {
    elements: HashMap<u32, ConfigElectronicConfiguration>,
}

#[derive(Deserialize)]
struct ConfigElectronicConfiguration {
    electron_shells: Vec<ConfigElectronShell>,
}

#[derive(Deserialize)]
struct ConfigElectronShell {
    function_type: String,
    angular_momentum: Vec<i32>,
    exponents: Vec<String>,
    coefficients: Vec<Vec<String>>,
}

fn parse_number(value: &str) -> Result<f64, DoriError> {
    value
        .trim()
        .parse()
        .map_err(|_| DoriError::InvalidBasisSet(format!("'{value}' is not a number")))
}

impl ConfigElectronShell {
    /// One shell per angular momentum: Pople style "sp" shells share their exponents
    /// between an s and a p shell.
    fn into_shells(self, atomic_number: u32) -> Result<Vec<ElectronShell>, DoriError> {
        if !self.function_type.starts_with("gto") {
            return Err(DoriError::InvalidBasisSet(format!(
                "element {atomic_number}: unsupported function type '{}'",
                self.function_type
            )));
        }
        if self.coefficients.len() != self.angular_momentum.len() {
            return Err(DoriError::InvalidBasisSet(format!(
                "element {atomic_number}: {} coefficient sets for {} angular momenta",
                self.coefficients.len(),
                self.angular_momentum.len()
            )));
        }

        let exponents = self
            .exponents
            .iter()
            .map(|exponent| parse_number(exponent))
            .collect::<Result<Vec<_>, _>>()?;

        let mut shells = Vec::with_capacity(self.angular_momentum.len());
        let shell_coefficients = self.angular_momentum.iter().zip(&self.coefficients);
        for (&angular_magnitude, coefficients) in shell_coefficients {
            if angular_magnitude < 0 {
                return Err(DoriError::InvalidBasisSet(format!(
                    "element {atomic_number}: negative angular momentum {angular_magnitude}"
                )));
            }
            if coefficients.len() != exponents.len() {
                return Err(DoriError::InvalidBasisSet(format!(
                    "element {atomic_number}: {} coefficients for {} exponents",
                    coefficients.len(),
                    exponents.len()
                )));
            }
            let coefficients = coefficients
                .iter()
                .map(|coefficient| parse_number(coefficient))
                .collect::<Result<Vec<_>, _>>()?;

            let mut shell = ElectronShell::new(angular_magnitude);
            for angular in generate_angular_vectors(angular_magnitude) {
                let primitives: SmallVec<[Gaussian; 6]> = exponents
                    .iter()
                    .zip(&coefficients)
                    .map(|(&exponent, &coefficient)| Gaussian {
                        exponent,
                        coefficient: coefficient * Gaussian::norm(exponent, angular),
                        angular,
                    })
                    .collect();

                shell.basis_functions.push(ContractedGaussian(primitives));
            }
            shells.push(shell);
        }

        Ok(shells)
    }
}

impl TryFrom<ConfigBasisSet> for BasisSet {
    type Error = DoriError;

    fn try_from(value: ConfigBasisSet) -> Result<Self, Self::Error> {
        let mut atomic_mapping = HashMap::with_capacity(value.elements.len());

        for (atomic_number, configuration) in value.elements {
            let mut atomic_basis = AtomicBasis::empty();
            for electron_shell in configuration.electron_shells {
                atomic_basis
                    .shells
                    .extend(electron_shell.into_shells(atomic_number)?);
            }
            atomic_mapping.insert(atomic_number, atomic_basis);
        }

        Ok(Self::new(atomic_mapping))
    }
}

// generate all (i, j, k) such that i + j + k = angular
fn generate_angular_vectors(angular_magnitude: i32) -> Vec<(i32, i32, i32)> {
    let mut angular_vectors = Vec::with_capacity(8);

    for (i, j, k) in itertools::iproduct!(
        0..=angular_magnitude,
        0..=angular_magnitude,
        0..=angular_magnitude
    ) {
        if i + j + k == angular_magnitude {
            angular_vectors.push((i, j, k));
        }
    }

    angular_vectors
}
