//! Packed upper-triangular storage of symmetric 3x3 second-derivative tensors.
//!
//! Basis evaluators store the six independent second derivatives of every basis
//! function in the order xx, xy, xz, yy, yz, zz. The two tables below are the fixed
//! bijection between unordered pairs of Cartesian axes and those six slots.
use nalgebra::Matrix3;

/// Number of independent entries of a symmetric 3x3 tensor.
pub const N_PACKED: usize = 6;

/// Cartesian axis pair stored in each packed slot.
pub const TRIU_PAIRS: [(usize, usize); N_PACKED] =
    [(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)];

/// Packed slot of each (ordered) pair of Cartesian axes.
pub const PACKED_INDEX: [[usize; 3]; 3] = [[0, 1, 2], [1, 3, 4], [2, 4, 5]];

// the two tables must be inverse to each other
const _: () = {
    let mut slot = 0;
    while slot < N_PACKED {
        let (i, j) = TRIU_PAIRS[slot];
        assert!(i <= j);
        assert!(PACKED_INDEX[i][j] == slot);
        assert!(PACKED_INDEX[j][i] == slot);
        slot += 1;
    }
};

/// Returns the packed slot holding the second derivative along axes `i` and `j`.
///
/// # Panics
/// if either axis is not 0, 1 or 2.
#[inline(always)]
pub const fn packed_index(i: usize, j: usize) -> usize {
    PACKED_INDEX[i][j]
}

/// Expands the six packed entries into the full symmetric tensor.
pub fn unpack_symmetric(packed: [f64; N_PACKED]) -> Matrix3<f64> {
    Matrix3::from_fn(|i, j| packed[packed_index(i, j)])
}

/// Collects the upper triangle of a 3x3 tensor in packed order.
pub fn pack_upper(tensor: &Matrix3<f64>) -> [f64; N_PACKED] {
    TRIU_PAIRS.map(|(i, j)| tensor[(i, j)])
}
