//! Electron density and its first and second spatial derivatives on grid points.
mod fitted;
mod matrix;

use nalgebra::{DMatrix, DVector, Matrix3, Matrix3xX, Vector3};

use crate::{
    basis::{BasisEvaluator, BasisTensor, DerivOrder},
    error::DoriError,
};

/// The two representations a density can be reconstructed from.
#[derive(Clone, Debug, PartialEq)]
pub enum DensitySource {
    /// A (symmetric) one-particle density matrix in the basis: rho = phi^T D phi
    Matrix(DMatrix<f64>),
    /// Density fitting coefficients: rho = c^T phi
    Fitted(DVector<f64>),
}

impl DensitySource {
    /// Checks that this source is expressed in a basis of `n_basis` functions.
    pub fn check_basis(&self, n_basis: usize) -> Result<(), DoriError> {
        match self {
            DensitySource::Matrix(dm) if dm.shape() != (n_basis, n_basis) => {
                Err(DoriError::DimensionMismatch {
                    what: "density matrix",
                    expected: n_basis,
                    found: if dm.nrows() != n_basis {
                        dm.nrows()
                    } else {
                        dm.ncols()
                    },
                })
            }
            DensitySource::Fitted(c) if c.len() != n_basis => Err(DoriError::DimensionMismatch {
                what: "fitting coefficients",
                expected: n_basis,
                found: c.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// The density on a set of grid points and, depending on the requested order, its
/// gradient and hessian.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityFields {
    /// rho at every point
    pub rho: DVector<f64>,
    /// column p holds the density gradient at point p
    pub gradient: Option<Matrix3xX<f64>>,
    /// symmetric density hessian at every point
    pub hessian: Option<Vec<Matrix3<f64>>>,
}

impl DensityFields {
    fn empty(n_points: usize, order: DerivOrder) -> Self {
        Self {
            rho: DVector::zeros(n_points),
            gradient: (order >= DerivOrder::Gradient).then(|| Matrix3xX::zeros(n_points)),
            hessian: (order >= DerivOrder::Hessian).then(|| vec![Matrix3::zeros(); n_points]),
        }
    }
}

fn check_order(tensor: &BasisTensor, order: DerivOrder) -> Result<(), DoriError> {
    if tensor.order() < order {
        return Err(DoriError::MissingDerivatives {
            requested: order,
            available: tensor.order(),
        });
    }
    Ok(())
}

/// Contracts `tensor` with `source` into the given outputs. Derivatives are only computed
/// for the outputs that are present.
fn contract(
    tensor: &BasisTensor,
    source: &DensitySource,
    rho: &mut DVector<f64>,
    gradient: Option<&mut Matrix3xX<f64>>,
    hessian: Option<&mut [Matrix3<f64>]>,
) {
    match source {
        DensitySource::Matrix(dm) => matrix::evaluate(tensor, dm, rho, gradient, hessian),
        DensitySource::Fitted(coefficients) => {
            fitted::evaluate(tensor, coefficients, rho, gradient, hessian)
        }
    }
}

/// Computes the density and its derivatives up to `order` from an evaluated basis.
///
/// Every grid point is contracted on its own, so the result for a point does not depend
/// on which other points share the tensor.
pub fn compute_density(
    tensor: &BasisTensor,
    source: &DensitySource,
    order: DerivOrder,
) -> Result<DensityFields, DoriError> {
    check_order(tensor, order)?;
    source.check_basis(tensor.n_basis())?;

    let mut fields = DensityFields::empty(tensor.n_points(), order);
    contract(
        tensor,
        source,
        &mut fields.rho,
        fields.gradient.as_mut(),
        fields.hessian.as_deref_mut(),
    );
    Ok(fields)
}

/// Evaluates the basis on `points` and computes the density and its derivatives there.
pub fn compute_density_at(
    basis: &impl BasisEvaluator,
    points: &[Vector3<f64>],
    source: &DensitySource,
    order: DerivOrder,
) -> Result<DensityFields, DoriError> {
    source.check_basis(basis.n_basis())?;
    let tensor = basis.evaluate(points, order);
    compute_density(&tensor, source, order)
}

/// The density and its gradient (one column per point) on `points`.
pub fn compute_density_gradient_at(
    basis: &impl BasisEvaluator,
    points: &[Vector3<f64>],
    source: &DensitySource,
) -> Result<(DVector<f64>, Matrix3xX<f64>), DoriError> {
    source.check_basis(basis.n_basis())?;
    let tensor = basis.evaluate(points, DerivOrder::Gradient);
    check_order(&tensor, DerivOrder::Gradient)?;

    let mut rho = DVector::zeros(points.len());
    let mut gradient = Matrix3xX::zeros(points.len());
    contract(&tensor, source, &mut rho, Some(&mut gradient), None);
    Ok((rho, gradient))
}

/// The density, its gradient and its hessian on `points`.
pub fn compute_density_hessian_at(
    basis: &impl BasisEvaluator,
    points: &[Vector3<f64>],
    source: &DensitySource,
) -> Result<(DVector<f64>, Matrix3xX<f64>, Vec<Matrix3<f64>>), DoriError> {
    source.check_basis(basis.n_basis())?;
    let tensor = basis.evaluate(points, DerivOrder::Hessian);
    check_order(&tensor, DerivOrder::Hessian)?;

    let mut rho = DVector::zeros(points.len());
    let mut gradient = Matrix3xX::zeros(points.len());
    let mut hessian = vec![Matrix3::zeros(); points.len()];
    contract(
        &tensor,
        source,
        &mut rho,
        Some(&mut gradient),
        Some(&mut hessian),
    );
    Ok((rho, gradient, hessian))
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::{
        compute_density, compute_density_at, compute_density_gradient_at,
        compute_density_hessian_at, DensitySource,
    };
    use crate::{
        basis::{BasisEvaluator, BasisTensor, DerivOrder},
        error::DoriError,
        testing,
    };

    fn random_points(rng: &mut StdRng, n: usize) -> Vec<Vector3<f64>> {
        (0..n)
            .map(|_| Vector3::from_fn(|_, _| rng.gen_range(-2.0..2.0)))
            .collect()
    }

    fn random_density_matrix(rng: &mut StdRng, n_basis: usize) -> DMatrix<f64> {
        let coefficients = DMatrix::from_fn(n_basis, 3, |_, _| rng.gen_range(-1.0..1.0));
        testing::occupied_density_matrix(&coefficients)
    }

    #[test]
    fn single_function_density_is_its_square() {
        let basis = testing::unit_gaussian();
        let points = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.3, -0.7, 0.2),
            Vector3::new(1.5, 0.5, -1.0),
        ];
        let source = DensitySource::Matrix(DMatrix::from_element(1, 1, 1.0));

        let fields = compute_density_at(&basis, &points, &source, DerivOrder::Value).unwrap();

        for (p, &point) in points.iter().enumerate() {
            let phi = basis.functions()[0].evaluate(point);
            assert_relative_eq!(fields.rho[p], phi * phi, epsilon = 1e-15);
        }
        assert!(fields.gradient.is_none());
        assert!(fields.hessian.is_none());
    }

    #[test]
    fn fitted_gaussian_matches_closed_form() {
        // rho = exp(-r^2), grad = -2 r rho, hess = (4 r r^T - 2 I) rho
        let basis = testing::unit_gaussian();
        let source = DensitySource::Fitted(DVector::from_element(1, 1.0));
        let points = [Vector3::new(0.4, -0.3, 0.8), Vector3::new(-1.1, 0.2, 0.05)];

        let fields = compute_density_at(&basis, &points, &source, DerivOrder::Hessian).unwrap();
        let gradient = fields.gradient.unwrap();
        let hessian = fields.hessian.unwrap();

        for (p, r) in points.iter().enumerate() {
            let rho = (-r.norm_squared()).exp();
            assert_relative_eq!(fields.rho[p], rho, epsilon = 1e-14);
            assert_relative_eq!(
                gradient.column(p).into_owned(),
                -2.0 * r * rho,
                epsilon = 1e-14
            );

            let expected = (4.0 * r * r.transpose() - 2.0 * Matrix3::identity()) * rho;
            assert_relative_eq!(hessian[p], expected, epsilon = 1e-14);
        }
    }

    #[test]
    fn hessian_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(7);
        let (molecule, basis_set) = testing::water();
        let basis = molecule.basis(&basis_set).unwrap();
        let points = random_points(&mut rng, 16);

        let dm = random_density_matrix(&mut rng, basis.n_basis());
        let c = DVector::from_fn(basis.n_basis(), |_, _| rng.gen_range(-1.0..1.0));

        for source in [DensitySource::Matrix(dm), DensitySource::Fitted(c)] {
            let fields =
                compute_density_at(&basis, &points, &source, DerivOrder::Hessian).unwrap();
            for hessian in fields.hessian.unwrap() {
                assert_eq!(hessian, hessian.transpose());
            }
        }
    }

    #[test]
    fn fitted_density_is_linear_in_coefficients() {
        let mut rng = StdRng::seed_from_u64(11);
        let (molecule, basis_set) = testing::water();
        let basis = molecule.basis(&basis_set).unwrap();
        let points = random_points(&mut rng, 8);
        let c = DVector::from_fn(basis.n_basis(), |_, _| rng.gen_range(-1.0..1.0));
        let alpha = -2.5;

        let tensor = basis.evaluate(&points, DerivOrder::Hessian);
        let base =
            compute_density(&tensor, &DensitySource::Fitted(c.clone()), DerivOrder::Hessian)
                .unwrap();
        let scaled =
            compute_density(&tensor, &DensitySource::Fitted(alpha * c), DerivOrder::Hessian)
                .unwrap();

        assert_relative_eq!(
            scaled.rho,
            alpha * base.rho,
            epsilon = 1e-12,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            scaled.gradient.unwrap(),
            alpha * base.gradient.unwrap(),
            epsilon = 1e-12,
            max_relative = 1e-12
        );
        for (scaled, base) in scaled.hessian.unwrap().iter().zip(base.hessian.unwrap()) {
            assert_relative_eq!(*scaled, alpha * base, epsilon = 1e-12, max_relative = 1e-12);
        }
    }

    #[test]
    fn matrix_derivatives_match_finite_differences() {
        const H: f64 = 1e-5;
        let mut rng = StdRng::seed_from_u64(3);
        let (molecule, basis_set) = testing::water();
        let basis = molecule.basis(&basis_set).unwrap();
        let source = DensitySource::Matrix(random_density_matrix(&mut rng, basis.n_basis()));
        let at = Vector3::new(0.3, 0.9, -0.4);

        let fields = compute_density_at(&basis, &[at], &source, DerivOrder::Hessian).unwrap();
        let gradient = fields.gradient.unwrap();
        let hessian = fields.hessian.unwrap();

        for axis in 0..3 {
            let mut forward = at;
            forward[axis] += H;
            let mut backward = at;
            backward[axis] -= H;

            let shifted = compute_density_at(
                &basis,
                &[forward, backward],
                &source,
                DerivOrder::Gradient,
            )
            .unwrap();

            let numeric = (shifted.rho[0] - shifted.rho[1]) / (2.0 * H);
            assert_abs_diff_eq!(gradient[(axis, 0)], numeric, epsilon = 1e-6);

            let shifted_gradient = shifted.gradient.unwrap();
            for i in 0..3 {
                let numeric = (shifted_gradient[(i, 0)] - shifted_gradient[(i, 1)]) / (2.0 * H);
                assert_abs_diff_eq!(hessian[0][(i, axis)], numeric, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn lower_orders_leave_out_derivatives() {
        let (molecule, basis_set) = testing::hydrogen();
        let basis = molecule.basis(&basis_set).unwrap();
        let source = DensitySource::Matrix(testing::hydrogen_density_matrix());
        let points = [Vector3::new(0.1, 0.2, 0.7)];

        let value = compute_density_at(&basis, &points, &source, DerivOrder::Value).unwrap();
        let gradient =
            compute_density_at(&basis, &points, &source, DerivOrder::Gradient).unwrap();
        let hessian = compute_density_at(&basis, &points, &source, DerivOrder::Hessian).unwrap();

        assert!(value.gradient.is_none() && value.hessian.is_none());
        assert!(gradient.gradient.is_some() && gradient.hessian.is_none());
        assert!(hessian.gradient.is_some() && hessian.hessian.is_some());
        assert_eq!(value.rho, hessian.rho);
        assert_eq!(gradient.gradient, hessian.gradient);
    }

    #[test]
    fn density_is_nonnegative_for_occupied_density_matrix() {
        let mut rng = StdRng::seed_from_u64(5);
        let (molecule, basis_set) = testing::water();
        let basis = molecule.basis(&basis_set).unwrap();
        let source = DensitySource::Matrix(random_density_matrix(&mut rng, basis.n_basis()));

        let fields =
            compute_density_at(&basis, &random_points(&mut rng, 32), &source, DerivOrder::Value)
                .unwrap();
        assert!(fields.rho.iter().all(|&rho| rho >= 0.0));
    }

    #[test]
    fn missing_derivatives_are_reported() {
        let tensor = BasisTensor::zeros(DerivOrder::Gradient, 2, 5);
        let source = DensitySource::Fitted(DVector::zeros(2));

        assert_eq!(
            compute_density(&tensor, &source, DerivOrder::Hessian),
            Err(DoriError::MissingDerivatives {
                requested: DerivOrder::Hessian,
                available: DerivOrder::Gradient,
            })
        );
    }

    #[test]
    fn source_must_match_basis() {
        let tensor = BasisTensor::zeros(DerivOrder::Value, 3, 5);

        let wrong_matrix = DensitySource::Matrix(DMatrix::zeros(3, 2));
        assert!(matches!(
            compute_density(&tensor, &wrong_matrix, DerivOrder::Value),
            Err(DoriError::DimensionMismatch {
                what: "density matrix",
                expected: 3,
                found: 2,
            })
        ));

        let wrong_coefficients = DensitySource::Fitted(DVector::zeros(4));
        assert!(matches!(
            compute_density(&tensor, &wrong_coefficients, DerivOrder::Value),
            Err(DoriError::DimensionMismatch {
                what: "fitting coefficients",
                expected: 3,
                found: 4,
            })
        ));
    }

    #[test]
    fn typed_helpers_match_the_fields() {
        let mut rng = StdRng::seed_from_u64(23);
        let (molecule, basis_set) = testing::water();
        let basis = molecule.basis(&basis_set).unwrap();
        let source = DensitySource::Matrix(random_density_matrix(&mut rng, basis.n_basis()));
        let points = random_points(&mut rng, 9);

        let fields = compute_density_at(&basis, &points, &source, DerivOrder::Hessian).unwrap();
        let (rho, gradient) = compute_density_gradient_at(&basis, &points, &source).unwrap();
        assert_relative_eq!(rho, fields.rho, epsilon = 1e-12, max_relative = 1e-12);
        assert_relative_eq!(
            gradient,
            fields.gradient.clone().unwrap(),
            epsilon = 1e-12,
            max_relative = 1e-12
        );

        let (rho, gradient, hessian) =
            compute_density_hessian_at(&basis, &points, &source).unwrap();
        assert_eq!(rho, fields.rho);
        assert_eq!(Some(gradient), fields.gradient);
        assert_eq!(Some(hessian), fields.hessian);

        let wrong_size = DensitySource::Fitted(DVector::zeros(2));
        assert!(matches!(
            compute_density_hessian_at(&basis, &points, &wrong_size),
            Err(DoriError::DimensionMismatch { .. })
        ));
    }
}
