use nalgebra::{DMatrix, DVector, Matrix3, Matrix3xX};

use crate::basis::BasisTensor;

/// Contracts the basis tensor with a density matrix.
///
/// With `v = D^T phi`, the density is `phi . v` and its gradient `2 dphi_i . v`. The
/// hessian has one term from two first derivatives and one from the second derivative:
/// `H_ij = dphi_j . (2 D^T dphi_i) + 2 d2phi_ij . v`. The factors of two come from the
/// symmetry of `D`.
pub(super) fn evaluate(
    tensor: &BasisTensor,
    dm: &DMatrix<f64>,
    rho: &mut DVector<f64>,
    mut gradient: Option<&mut Matrix3xX<f64>>,
    mut hessian: Option<&mut [Matrix3<f64>]>,
) {
    for p in 0..tensor.n_points() {
        let phi = tensor.values().column(p);
        let dm_phi = dm.tr_mul(&phi);
        rho[p] = phi.dot(&dm_phi);

        if let Some(gradient) = gradient.as_mut() {
            for axis in 0..3 {
                gradient[(axis, p)] = 2.0 * tensor.first(axis).column(p).dot(&dm_phi);
            }
        }

        if let Some(hessian) = hessian.as_mut() {
            let hessian = &mut hessian[p];
            for i in 0..3 {
                let dm_dphi_i = 2.0 * dm.tr_mul(&tensor.first(i).column(p));
                for j in i..3 {
                    let value = tensor.first(j).column(p).dot(&dm_dphi_i)
                        + 2.0 * tensor.second(i, j).column(p).dot(&dm_phi);
                    hessian[(i, j)] = value;
                    hessian[(j, i)] = value;
                }
            }
        }

        log::trace!("point {p}: rho = {:1.6e}", rho[p]);
    }
}
