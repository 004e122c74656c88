use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::packing::{N_PACKED, TRIU_PAIRS};

/// Function of the form K*x^i*y^j*z^k*exp(-alpha*r^2)
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    pub exponent: f64,
    /// The coefficient of this gaussian and optionally the normalization constant
    pub coefficient: f64,
    /// (i, j, k) exponents of polynomial terms
    pub angular: (i32, i32, i32),
}

/// (2n)! / n!, in floating point so high angular momenta do not overflow
fn factorial_ratio(n: i32) -> f64 {
    (n + 1..=2 * n).map(f64::from).product()
}

impl Gaussian {
    pub fn norm(exponent: f64, angular: (i32, i32, i32)) -> f64 {
        let (i, j, k) = angular;

        (std::f64::consts::FRAC_2_PI * exponent)
            .powi(3)
            .sqrt()
            .sqrt()
            * f64::sqrt(
                (8.0 * exponent).powi(i + j + k)
                    / (factorial_ratio(i) * factorial_ratio(j) * factorial_ratio(k)),
            )
    }

    /// Value of this primitive at `r`, relative to its center. Performs the same operations
    /// as the value component of [`Gaussian::derivatives`], so both agree to the last bit.
    fn evaluate(&self, r: Vector3<f64>) -> f64 {
        let (i, j, k) = self.angular;
        let radial = self.coefficient * (-self.exponent * r.norm_squared()).exp();
        radial * r.x.powi(i) * r.y.powi(j) * r.z.powi(k)
    }

    /// Value, gradient and packed hessian of this primitive at `r`, relative to its center.
    ///
    /// The primitive factorizes into one polynomial-times-gaussian term per axis, so every
    /// derivative is a product of per-axis derivatives.
    fn derivatives(&self, r: Vector3<f64>) -> [f64; 1 + 3 + N_PACKED] {
        let (i, j, k) = self.angular;
        let axes = [
            axis_derivatives(r.x, i, self.exponent),
            axis_derivatives(r.y, j, self.exponent),
            axis_derivatives(r.z, k, self.exponent),
        ];
        let radial = self.coefficient * (-self.exponent * r.norm_squared()).exp();
        let term = |orders: [usize; 3]| {
            radial * axes[0][orders[0]] * axes[1][orders[1]] * axes[2][orders[2]]
        };

        let mut output = [0.0; 1 + 3 + N_PACKED];
        output[0] = term([0, 0, 0]);
        for axis in 0..3 {
            let mut orders = [0; 3];
            orders[axis] = 1;
            output[1 + axis] = term(orders);
        }
        for (slot, &(a, b)) in TRIU_PAIRS.iter().enumerate() {
            let mut orders = [0; 3];
            orders[a] += 1;
            orders[b] += 1;
            output[4 + slot] = term(orders);
        }

        output
    }
}

/// Polynomial factors of the 0th, 1st and 2nd derivative of `x^l exp(-a x^2)`, with the
/// common `exp(-a x^2)` left out.
fn axis_derivatives(x: f64, l: i32, a: f64) -> [f64; 3] {
    let pow = |n: i32| if n < 0 { 0.0 } else { x.powi(n) };
    let l_f = l as f64;

    [
        pow(l),
        l_f * pow(l - 1) - 2.0 * a * pow(l + 1),
        l_f * (l_f - 1.0) * pow(l - 2) - 2.0 * a * (2.0 * l_f + 1.0) * pow(l)
            + 4.0 * a * a * pow(l + 2),
    ]
}

/// Linear combination of many [`Gaussian`]s
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractedGaussian(pub SmallVec<[Gaussian; 6]>);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasisFunction {
    /// The type of basis function this basis function has
    pub contracted_gaussian: ContractedGaussian,
    /// The position of this basis function, in natural units
    pub position: Vector3<f64>,
}

impl BasisFunction {
    /// Evaluate this basis function at a given position
    pub fn evaluate(&self, at: Vector3<f64>) -> f64 {
        let r = at - self.position;
        let mut value = 0.0;
        for primitive in &self.contracted_gaussian.0 {
            value += primitive.evaluate(r);
        }
        value
    }

    /// Evaluate this basis function, its gradient and its packed hessian (xx, xy, xz, yy,
    /// yz, zz) at a given position
    pub fn derivatives(&self, at: Vector3<f64>) -> [f64; 1 + 3 + N_PACKED] {
        let r = at - self.position;
        let mut output = [0.0; 1 + 3 + N_PACKED];
        for primitive in &self.contracted_gaussian.0 {
            for (total, term) in output.iter_mut().zip(primitive.derivatives(r)) {
                *total += term;
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use smallvec::smallvec;

    use super::{BasisFunction, ContractedGaussian, Gaussian};
    use crate::packing::packed_index;

    fn function(angular: (i32, i32, i32)) -> BasisFunction {
        BasisFunction {
            contracted_gaussian: ContractedGaussian(smallvec![
                Gaussian {
                    exponent: 1.3,
                    coefficient: 0.7,
                    angular,
                },
                Gaussian {
                    exponent: 0.4,
                    coefficient: 0.3,
                    angular,
                },
            ]),
            position: Vector3::new(0.2, -0.1, 0.4),
        }
    }

    fn shifted(at: Vector3<f64>, axis: usize, step: f64) -> Vector3<f64> {
        let mut at = at;
        at[axis] += step;
        at
    }

    #[test]
    fn s_function_value() {
        let function = BasisFunction {
            contracted_gaussian: ContractedGaussian(smallvec![Gaussian {
                exponent: 1.0,
                coefficient: 1.0,
                angular: (0, 0, 0),
            }]),
            position: Vector3::zeros(),
        };
        let at = Vector3::new(0.5, -0.5, 1.0);

        assert_relative_eq!(function.evaluate(at), (-1.5f64).exp(), epsilon = 1e-15);
        assert_relative_eq!(function.derivatives(at)[0], (-1.5f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn derivatives_match_finite_differences() {
        const H: f64 = 1e-5;
        let at = Vector3::new(0.6, 0.3, -0.25);

        for angular in [(0, 0, 0), (1, 0, 0), (0, 1, 1), (2, 0, 0), (1, 1, 1)] {
            let function = function(angular);
            let derivatives = function.derivatives(at);

            assert_eq!(derivatives[0], function.evaluate(at));

            for axis in 0..3 {
                let numeric = (function.evaluate(shifted(at, axis, H))
                    - function.evaluate(shifted(at, axis, -H)))
                    / (2.0 * H);
                assert_relative_eq!(derivatives[1 + axis], numeric, epsilon = 1e-7);
            }

            for (i, j) in itertools::iproduct!(0..3, 0..3) {
                let forward = function.derivatives(shifted(at, j, H))[1 + i];
                let backward = function.derivatives(shifted(at, j, -H))[1 + i];
                let numeric = (forward - backward) / (2.0 * H);
                assert_relative_eq!(
                    derivatives[4 + packed_index(i, j)],
                    numeric,
                    epsilon = 1e-7
                );
            }
        }
    }

    #[test]
    fn derivatives_at_the_center_are_finite() {
        let function = function((1, 0, 2));
        let derivatives = function.derivatives(function.position);
        assert!(derivatives.iter().all(|d| d.is_finite()));
    }

    #[test]
    fn normalized_s_primitive() {
        // (2a/pi)^(3/4)
        let norm = Gaussian::norm(0.5, (0, 0, 0));
        assert_relative_eq!(norm, std::f64::consts::FRAC_1_PI.powf(0.75), epsilon = 1e-14);
    }

    #[test]
    fn high_angular_momentum_norm() {
        // (2a/pi)^(3/4) (4a)^(l/2) / sqrt((2l - 1)!!), with 19!! = 654729075
        let exponent = 0.7;
        let expected = (2.0 * exponent / std::f64::consts::PI).powf(0.75)
            * (4.0 * exponent).powi(5)
            / 654_729_075f64.sqrt();

        assert_relative_eq!(
            Gaussian::norm(exponent, (10, 0, 0)),
            expected,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            Gaussian::norm(exponent, (0, 0, 10)),
            expected,
            max_relative = 1e-12
        );
    }
}
