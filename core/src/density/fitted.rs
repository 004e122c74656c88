use nalgebra::{DMatrix, DVector, Matrix3, Matrix3xX};

use crate::{
    basis::BasisTensor,
    packing::{unpack_symmetric, TRIU_PAIRS},
};

/// Contracts the basis tensor with density fitting coefficients. The fit represents the
/// density itself, so every derivative is linear in the coefficients.
pub(super) fn evaluate(
    tensor: &BasisTensor,
    coefficients: &DVector<f64>,
    rho: &mut DVector<f64>,
    mut gradient: Option<&mut Matrix3xX<f64>>,
    mut hessian: Option<&mut [Matrix3<f64>]>,
) {
    let project = |component: &DMatrix<f64>, p: usize| component.column(p).dot(coefficients);

    for p in 0..tensor.n_points() {
        rho[p] = project(tensor.values(), p);

        if let Some(gradient) = gradient.as_mut() {
            for axis in 0..3 {
                gradient[(axis, p)] = project(tensor.first(axis), p);
            }
        }

        if let Some(hessian) = hessian.as_mut() {
            hessian[p] =
                unpack_symmetric(TRIU_PAIRS.map(|(i, j)| project(tensor.second(i, j), p)));
        }
    }
}
