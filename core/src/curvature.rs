//! Sign of the density curvature.
//!
//! The second (median) eigenvalue of the density hessian is negative where density
//! accumulates between nuclei and positive where it is depleted. Signing the density with
//! it gives the usual "sign(lambda_2) * rho" field of non-covalent interaction analysis.
use nalgebra::{DVector, Matrix3, SymmetricEigen};

use crate::{dori::DensityMask, error::DoriError};

/// Iteration cap of the symmetric eigensolver. A 3x3 matrix converges in a handful of
/// sweeps; hitting this means the hessian is not a finite symmetric matrix.
const MAX_EIGEN_ITERATIONS: usize = 1000;

/// Eigenvalues of a symmetric 3x3 matrix in ascending order, or `None` if the matrix is
/// not finite or the solver does not converge.
pub fn sorted_eigenvalues(matrix: &Matrix3<f64>) -> Option<[f64; 3]> {
    if !matrix.iter().all(|entry| entry.is_finite()) {
        return None;
    }
    let eigen = SymmetricEigen::try_new(*matrix, f64::EPSILON, MAX_EIGEN_ITERATIONS)?;

    let mut eigenvalues = [
        eigen.eigenvalues[0],
        eigen.eigenvalues[1],
        eigen.eigenvalues[2],
    ];
    eigenvalues.sort_unstable_by(f64::total_cmp);
    Some(eigenvalues)
}

/// Density signed by the second smallest eigenvalue of the density hessian, zero where the
/// mask rejects the density.
pub fn signed_density(
    rho: &DVector<f64>,
    hessian: &[Matrix3<f64>],
    mask: DensityMask,
) -> Result<DVector<f64>, DoriError> {
    assert_eq!(rho.len(), hessian.len(), "one hessian per grid point");

    let mut s2rho = DVector::zeros(rho.len());
    for (p, (&rho_p, hessian_p)) in rho.iter().zip(hessian).enumerate() {
        if !mask.admits(rho_p) {
            continue;
        }

        let [_, lambda_2, _] =
            sorted_eigenvalues(hessian_p).ok_or(DoriError::Eigendecomposition { point: p })?;
        s2rho[p] = rho_p.copysign(lambda_2);
    }

    Ok(s2rho)
}
