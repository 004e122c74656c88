//! Closed-form DORI.
//!
//! Differentiating `k = grad(rho) / rho` with the quotient rule gives the reduced curvature
//! `H = hess(rho) / rho - k k^T`, and with it
//!
//! ```text
//!   grad(k^2) = 2 (hess(rho) rho - grad(rho) grad(rho)^T) grad(rho) / rho^3 = 2 H k
//! ```
//!
//! This is exact, so the only errors come from the density derivatives themselves.
//!
//! Near a critical point of the density `k^2` goes to zero and `theta` blows up. The density
//! mask keeps most of those points out, but the threshold does not guarantee that `k^2`
//! stays away from zero; points where `theta` is not finite are reported as zero.
use nalgebra::{DVector, Matrix3, Matrix3xX};

use super::{indicator, DensityMask};

/// DORI from the density, its gradient (one column per point) and its hessian.
pub fn compute_dori(
    rho: &DVector<f64>,
    gradient: &Matrix3xX<f64>,
    hessian: &[Matrix3<f64>],
    mask: DensityMask,
) -> DVector<f64> {
    assert_eq!(rho.len(), gradient.ncols(), "one gradient per grid point");
    assert_eq!(rho.len(), hessian.len(), "one hessian per grid point");

    let mut dori = DVector::zeros(rho.len());
    let mut degenerate = 0;

    for (p, &rho_p) in rho.iter().enumerate() {
        if !mask.admits(rho_p) {
            continue;
        }

        let k = gradient.column(p) / rho_p;
        let k2 = k.norm_squared();
        let reduced_curvature = hessian[p] / rho_p - k * k.transpose();
        let dk2_dr = 2.0 * reduced_curvature * k;

        match indicator(dk2_dr.norm_squared(), k2) {
            Some(value) => dori[p] = value,
            None => degenerate += 1,
        }
    }

    if degenerate > 0 {
        log::debug!("{degenerate} points with vanishing reduced gradient set to zero");
    }

    dori
}
