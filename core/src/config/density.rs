use nalgebra::{DMatrix, DVector};
use serde::Deserialize;

use crate::{density::DensitySource, error::DoriError};

/// The density of a config file: exactly one of a density matrix (as a list of rows) or
/// density fitting coefficients.
#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDensity {
    pub density_matrix: Option<Vec<Vec<f64>>>,
    pub coefficients: Option<Vec<f64>>,
}

impl TryFrom<ConfigDensity> for DensitySource {
    type Error = DoriError;

    fn try_from(value: ConfigDensity) -> Result<Self, Self::Error> {
        match (value.density_matrix, value.coefficients) {
            (Some(rows), None) => {
                let n = rows.len();
                if let Some(row) = rows.iter().find(|row| row.len() != n) {
                    return Err(DoriError::DimensionMismatch {
                        what: "density matrix row",
                        expected: n,
                        found: row.len(),
                    });
                }
                Ok(DensitySource::Matrix(DMatrix::from_fn(n, n, |i, j| rows[i][j])))
            }
            (None, Some(coefficients)) => {
                Ok(DensitySource::Fitted(DVector::from_vec(coefficients)))
            }
            _ => Err(DoriError::AmbiguousDensitySource),
        }
    }
}
