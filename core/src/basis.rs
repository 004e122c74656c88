mod functions;
mod set;

pub use functions::{BasisFunction, ContractedGaussian, Gaussian};
pub use set::{AtomicBasis, BasisSet, ElectronShell};

use nalgebra::{DMatrix, Vector3};
use serde::{Deserialize, Serialize};

use crate::{error::DoriError, packing::packed_index};

/// How many spatial derivatives of the basis functions are requested.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DerivOrder {
    /// Basis function values only
    Value,
    /// Values and first derivatives
    Gradient,
    /// Values, first and second derivatives
    Hessian,
}

impl DerivOrder {
    /// Number of components a basis tensor of this order carries: 1, 1+3 or 1+3+6.
    pub const fn n_components(self) -> usize {
        match self {
            DerivOrder::Value => 1,
            DerivOrder::Gradient => 4,
            DerivOrder::Hessian => 10,
        }
    }
}

impl TryFrom<u8> for DerivOrder {
    type Error = DoriError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DerivOrder::Value),
            1 => Ok(DerivOrder::Gradient),
            2 => Ok(DerivOrder::Hessian),
            other => Err(DoriError::UnsupportedDerivativeOrder(other)),
        }
    }
}

/// Basis function values and derivatives sampled on a chunk of grid points.
///
/// Every component is stored as an `n_basis x n_points` matrix, so that the data of a
/// single grid point is one contiguous column. Components are ordered as: value,
/// d/dx, d/dy, d/dz, followed by the packed second derivatives xx, xy, xz, yy, yz, zz.
#[derive(Clone, Debug, PartialEq)]
pub struct BasisTensor {
    order: DerivOrder,
    components: Vec<DMatrix<f64>>,
}

impl BasisTensor {
    /// Index of the first of the three first-derivative components
    const FIRST: usize = 1;
    /// Index of the first of the six packed second-derivative components
    const SECOND: usize = 4;

    /// Creates a tensor from already evaluated components.
    pub fn new(order: DerivOrder, components: Vec<DMatrix<f64>>) -> Result<Self, DoriError> {
        if components.len() != order.n_components() {
            return Err(DoriError::DimensionMismatch {
                what: "basis tensor component count",
                expected: order.n_components(),
                found: components.len(),
            });
        }

        let shape = components[0].shape();
        if let Some(component) = components.iter().find(|c| c.shape() != shape) {
            return Err(DoriError::DimensionMismatch {
                what: "basis tensor component rows",
                expected: shape.0,
                found: component.nrows(),
            });
        }

        Ok(Self { order, components })
    }

    pub fn zeros(order: DerivOrder, n_basis: usize, n_points: usize) -> Self {
        Self {
            order,
            components: vec![DMatrix::zeros(n_basis, n_points); order.n_components()],
        }
    }

    pub fn order(&self) -> DerivOrder {
        self.order
    }

    pub fn n_basis(&self) -> usize {
        self.components[0].nrows()
    }

    pub fn n_points(&self) -> usize {
        self.components[0].ncols()
    }

    /// All components in storage order.
    pub fn components(&self) -> &[DMatrix<f64>] {
        &self.components
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.components[0]
    }

    /// First derivatives along `axis`.
    ///
    /// # Panics
    /// if the tensor was evaluated without first derivatives
    pub fn first(&self, axis: usize) -> &DMatrix<f64> {
        assert!(axis < 3, "axis {axis} out of range");
        &self.components[Self::FIRST + axis]
    }

    /// Second derivatives along axes `i` and `j`, looked up in the packed storage.
    ///
    /// # Panics
    /// if the tensor was evaluated without second derivatives
    pub fn second(&self, i: usize, j: usize) -> &DMatrix<f64> {
        &self.components[Self::SECOND + packed_index(i, j)]
    }
}

/// Evaluates basis functions and their spatial derivatives on grid points.
pub trait BasisEvaluator {
    /// The number of basis functions
    fn n_basis(&self) -> usize;

    /// Evaluates all basis functions at `points`, up to the given derivative order.
    fn evaluate(&self, points: &[Vector3<f64>], order: DerivOrder) -> BasisTensor;
}

/// The basis functions of a whole molecule, in a fixed order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MolecularBasis(pub Vec<BasisFunction>);

impl MolecularBasis {
    pub fn functions(&self) -> &[BasisFunction] {
        &self.0
    }
}

impl BasisEvaluator for MolecularBasis {
    fn n_basis(&self) -> usize {
        self.0.len()
    }

    fn evaluate(&self, points: &[Vector3<f64>], order: DerivOrder) -> BasisTensor {
        let mut tensor = BasisTensor::zeros(order, self.n_basis(), points.len());

        for (p, &point) in points.iter().enumerate() {
            for (b, function) in self.0.iter().enumerate() {
                if order == DerivOrder::Value {
                    tensor.components[0][(b, p)] = function.evaluate(point);
                    continue;
                }

                let derivatives = function.derivatives(point);
                for (component, &value) in tensor.components.iter_mut().zip(&derivatives) {
                    component[(b, p)] = value;
                }
            }
        }

        tensor
    }
}
