use crate::basis::DerivOrder;

/// Everything that can go wrong while evaluating density-derived fields.
///
/// Configuration errors are returned as soon as they are detected. Near-zero
/// densities are not errors: they are masked and reported as zero.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DoriError {
    #[error("use either a density matrix or density fitting coefficients, not both or neither")]
    AmbiguousDensitySource,
    #[error("unsupported derivative order {0}, expected 0, 1 or 2")]
    UnsupportedDerivativeOrder(u8),
    #[error("unknown algorithm '{0}', expected a prefix of 'analytical' or 'numerical'")]
    UnknownAlgorithm(String),
    #[error("{what} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("basis tensor carries derivatives up to {available:?}, but {requested:?} was requested")]
    MissingDerivatives {
        requested: DerivOrder,
        available: DerivOrder,
    },
    #[error("symmetric eigendecomposition of the density hessian failed at point {point}")]
    Eigendecomposition { point: usize },
    #[error("no basis for element with atomic number {atomic_number}")]
    MissingBasis { atomic_number: u32 },
    #[error("invalid basis set: {0}")]
    InvalidBasisSet(String),
    #[error("atom position has {0} coordinates, expected 3")]
    InvalidPosition(usize),
    #[error("invalid value {value} for {name}")]
    InvalidParameter { name: &'static str, value: f64 },
}
