use serde::{Deserialize, Serialize};

use crate::{
    dori::{Algorithm, DensityMask, MaskConvention, DEFAULT_STEP},
    error::DoriError,
};

/// Settings of a DORI run. Every field has a default, so a config file only lists what
/// it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DoriConfig {
    /// density threshold below which points are reported as zero
    pub eps: f64,
    pub algorithm: Algorithm,
    /// memory budget of one basis tensor chunk, in GiB
    pub memory_gib: f64,
    /// finite difference step of the numerical algorithm, in bohr
    pub step: f64,
    /// overrides the mask convention of both algorithms
    pub mask_convention: Option<MaskConvention>,
}

impl Default for DoriConfig {
    fn default() -> Self {
        Self {
            eps: 1e-4,
            algorithm: Algorithm::default(),
            memory_gib: 1.0,
            step: DEFAULT_STEP,
            mask_convention: None,
        }
    }
}

impl DoriConfig {
    /// The density mask, falling back to `default` if no convention is configured.
    pub fn mask(&self, default: MaskConvention) -> DensityMask {
        DensityMask {
            eps: self.eps,
            convention: self.mask_convention.unwrap_or(default),
        }
    }

    pub fn validate(&self) -> Result<(), DoriError> {
        let checks = [
            ("eps", self.eps, self.eps >= 0.0),
            ("memory_gib", self.memory_gib, self.memory_gib > 0.0),
            ("step", self.step, self.step > 0.0),
        ];

        for (name, value, valid) in checks {
            if !valid || !value.is_finite() {
                return Err(DoriError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}
