//! DORI with `grad(k^2)` from finite differences.
//!
//! `k^2 = |grad(rho)|^2 / rho^2` only needs first derivatives of the density. Its gradient
//! is taken with the five point central difference
//!
//! ```text
//!   f'(x) = (8 f(x + h) - 8 f(x - h) + f(x - 2h) - f(x + 2h)) / 12h
//! ```
//!
//! along every axis, which costs twelve extra first order density evaluations per point.
use nalgebra::{DVector, Vector3};

use super::{indicator, DensityMask};
use crate::{
    basis::{BasisEvaluator, DerivOrder},
    density::{compute_density_at, compute_density_gradient_at, DensitySource},
    error::DoriError,
};

/// Finite difference step, in bohr
pub const DEFAULT_STEP: f64 = 1e-4;

/// Stencil offsets in units of the step, in the order (+h, -h, +2h, -2h)
const OFFSETS: [f64; 4] = [1.0, -1.0, 2.0, -2.0];

/// `k^2` at every point
fn reduced_gradient_squared(
    basis: &impl BasisEvaluator,
    points: &[Vector3<f64>],
    source: &DensitySource,
) -> Result<DVector<f64>, DoriError> {
    let (rho, gradient) = compute_density_gradient_at(basis, points, source)?;

    Ok(DVector::from_iterator(
        points.len(),
        gradient
            .column_iter()
            .zip(rho.iter())
            .map(|(g, &rho)| (g / rho).norm_squared()),
    ))
}

#[inline(always)]
fn central_difference(
    forward: f64,
    backward: f64,
    forward2: f64,
    backward2: f64,
    step: f64,
) -> f64 {
    (8.0 * forward - 8.0 * backward + backward2 - forward2) / (12.0 * step)
}

/// DORI and the density on `points`, with `grad(k^2)` from finite differences of size
/// `step`. Only points the mask admits are differentiated.
pub fn compute_dori_numeric(
    basis: &impl BasisEvaluator,
    points: &[Vector3<f64>],
    source: &DensitySource,
    mask: DensityMask,
    step: f64,
) -> Result<(DVector<f64>, DVector<f64>), DoriError> {
    let rho = compute_density_at(basis, points, source, DerivOrder::Value)?.rho;
    let admitted: Vec<usize> = (0..points.len())
        .filter(|&p| mask.admits(rho[p]))
        .collect();

    let admitted_points: Vec<Vector3<f64>> = admitted.iter().map(|&p| points[p]).collect();
    let k2 = reduced_gradient_squared(basis, &admitted_points, source)?;

    // gradient of k^2 at each admitted point
    let mut dk2_dr = vec![Vector3::zeros(); admitted.len()];
    for axis in 0..3 {
        let mut shifted_k2 = Vec::with_capacity(OFFSETS.len());
        for offset in OFFSETS {
            let shifted: Vec<Vector3<f64>> = admitted_points
                .iter()
                .map(|point| {
                    let mut shifted = *point;
                    shifted[axis] += offset * step;
                    shifted
                })
                .collect();
            shifted_k2.push(reduced_gradient_squared(basis, &shifted, source)?);
        }

        for (i, derivative) in dk2_dr.iter_mut().enumerate() {
            derivative[axis] = central_difference(
                shifted_k2[0][i],
                shifted_k2[1][i],
                shifted_k2[2][i],
                shifted_k2[3][i],
                step,
            );
        }
    }

    let mut dori = DVector::zeros(points.len());
    let mut degenerate = 0;
    for ((&p, derivative), &k2) in admitted.iter().zip(&dk2_dr).zip(k2.iter()) {
        match indicator(derivative.norm_squared(), k2) {
            Some(value) => dori[p] = value,
            None => degenerate += 1,
        }
    }

    if degenerate > 0 {
        log::debug!("{degenerate} points with vanishing reduced gradient set to zero");
    }
    log::trace!(
        "differentiated k^2 at {} of {} points",
        admitted.len(),
        points.len()
    );

    Ok((dori, rho))
}
