use nalgebra::Vector3;
use serde::Deserialize;

use super::molecule::to_position;
use crate::error::DoriError;

/// Grid points as a list of `[x, y, z]` coordinates, in bohr.
#[derive(Deserialize)]
pub struct ConfigGrid(Vec<Vec<f64>>);

impl TryFrom<ConfigGrid> for Vec<Vector3<f64>> {
    type Error = DoriError;

    fn try_from(value: ConfigGrid) -> Result<Self, Self::Error> {
        value.0.iter().map(|point| to_position(point)).collect()
    }
}
