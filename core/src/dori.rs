//! Density Overlap Regions Indicator.
//!
//! With the reduced gradient `k = grad(rho) / rho`, DORI is
//!
//! ```text
//!   theta = |grad(k^2)|^2 / k^6,    dori = theta / (1 + theta)
//! ```
//!
//! which lies in [0, 1). Reference: J. Chem. Theory Comput. 2014, 10, 9, 3745–3756
//! (10.1021/ct500490b).
//!
//! `grad(k^2)` is either derived in closed form from the density hessian ([`analytical`])
//! or obtained by finite differences of `k^2` ([`numerical`]). The numerical path exists
//! to cross-check the analytical one.
pub mod analytical;
pub mod numerical;

use std::{fmt, str::FromStr};

use nalgebra::{DVector, Vector3};
use serde::{Deserialize, Serialize};

pub use analytical::compute_dori;
pub use numerical::{compute_dori_numeric, DEFAULT_STEP};

use crate::{
    basis::BasisEvaluator,
    config::DoriConfig,
    curvature::signed_density,
    density::{compute_density_hessian_at, DensitySource},
    error::DoriError,
};

/// How the density threshold is compared against the density.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskConvention {
    /// `|rho| >= eps`
    Magnitude,
    /// `rho >= eps`
    Positive,
}

/// Decides which grid points carry enough density to be evaluated. Every other point is
/// reported as zero.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DensityMask {
    pub eps: f64,
    pub convention: MaskConvention,
}

impl DensityMask {
    pub fn magnitude(eps: f64) -> Self {
        Self {
            eps,
            convention: MaskConvention::Magnitude,
        }
    }

    pub fn positive(eps: f64) -> Self {
        Self {
            eps,
            convention: MaskConvention::Positive,
        }
    }

    #[inline(always)]
    pub fn admits(&self, rho: f64) -> bool {
        match self.convention {
            MaskConvention::Magnitude => rho.abs() >= self.eps,
            MaskConvention::Positive => rho >= self.eps,
        }
    }
}

/// Largest double below one
const MAX_INDICATOR: f64 = 1.0 - f64::EPSILON / 2.0;

/// `theta / (1 + theta)` for `theta = |grad(k^2)|^2 / k2^3`, or `None` if theta is not
/// finite (the reduced gradient vanishes at a critical point of the density).
///
/// Close to a critical point theta can exceed 2^53, where the quotient rounds to one. The
/// result is kept strictly below one.
#[inline(always)]
pub(crate) fn indicator(dk2_dr_square: f64, k2: f64) -> Option<f64> {
    let theta = dk2_dr_square / k2.powi(3);
    theta
        .is_finite()
        .then(|| (theta / (1.0 + theta)).min(MAX_INDICATOR))
}

/// Fields evaluated on a grid.
#[derive(Clone, Debug, PartialEq)]
pub struct DoriOutput {
    pub dori: DVector<f64>,
    pub rho: DVector<f64>,
    /// density signed by the second eigenvalue of its hessian. Only the analytical
    /// algorithm computes it.
    pub s2rho: Option<DVector<f64>>,
}

impl DoriOutput {
    pub(crate) fn zeros(n_points: usize, with_signed_density: bool) -> Self {
        Self {
            dori: DVector::zeros(n_points),
            rho: DVector::zeros(n_points),
            s2rho: with_signed_density.then(|| DVector::zeros(n_points)),
        }
    }

    pub fn len(&self) -> usize {
        self.rho.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rho.is_empty()
    }

    /// Copies the fields of a chunk into the index range starting at `start`.
    pub(crate) fn write_chunk(&mut self, start: usize, chunk: &DoriOutput) {
        let n = chunk.len();
        self.dori.rows_mut(start, n).copy_from(&chunk.dori);
        self.rho.rows_mut(start, n).copy_from(&chunk.rho);
        if let (Some(s2rho), Some(chunk_s2rho)) = (self.s2rho.as_mut(), chunk.s2rho.as_ref()) {
            s2rho.rows_mut(start, n).copy_from(chunk_s2rho);
        }
    }
}

/// The way `grad(k^2)` is obtained.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    /// closed form from the density hessian
    #[default]
    Analytical,
    /// fourth order central differences of `k^2`
    Numerical,
}

impl Algorithm {
    const ALL: [Algorithm; 2] = [Algorithm::Analytical, Algorithm::Numerical];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Analytical => "analytical",
            Algorithm::Numerical => "numerical",
        }
    }

    /// Whether this algorithm produces the signed density.
    pub fn computes_signed_density(&self) -> bool {
        matches!(self, Algorithm::Analytical)
    }

    /// Evaluates DORI and the density (and, for the analytical algorithm, the signed
    /// density) on `points`.
    ///
    /// Unless the config forces a convention, analytical DORI admits points by `|rho|`,
    /// while the signed density and numerical DORI only admit positive densities.
    pub fn evaluate(
        &self,
        basis: &impl BasisEvaluator,
        points: &[Vector3<f64>],
        source: &DensitySource,
        config: &DoriConfig,
    ) -> Result<DoriOutput, DoriError> {
        use MaskConvention::{Magnitude, Positive};

        match self {
            Algorithm::Analytical => {
                let (rho, gradient, hessian) = compute_density_hessian_at(basis, points, source)?;

                let dori = compute_dori(&rho, &gradient, &hessian, config.mask(Magnitude));
                let s2rho = signed_density(&rho, &hessian, config.mask(Positive))?;

                Ok(DoriOutput {
                    dori,
                    rho,
                    s2rho: Some(s2rho),
                })
            }
            Algorithm::Numerical => {
                let mask = config.mask(Positive);
                let (dori, rho) = compute_dori_numeric(basis, points, source, mask, config.step)?;

                Ok(DoriOutput {
                    dori,
                    rho,
                    s2rho: None,
                })
            }
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts any non-empty prefix of an algorithm name, ignoring case: "a", "Anal" and
/// "NUMERICAL" are all valid.
impl FromStr for Algorithm {
    type Err = DoriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let selector = s.to_lowercase();

        Self::ALL
            .into_iter()
            .find(|algorithm| !selector.is_empty() && algorithm.name().starts_with(&selector))
            .ok_or_else(|| DoriError::UnknownAlgorithm(s.to_owned()))
    }
}

impl TryFrom<String> for Algorithm {
    type Error = DoriError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Algorithm> for String {
    fn from(value: Algorithm) -> Self {
        value.name().to_owned()
    }
}
