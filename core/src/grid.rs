//! Evaluation of DORI over a whole grid in memory-bounded chunks.
//!
//! The basis tensor of a chunk holds ten `n_basis x chunk` matrices of doubles. The chunk
//! length is chosen so that the tensor fits the configured memory budget. Every point is
//! computed independently of its chunk, so the result does not depend on the budget.
use nalgebra::Vector3;

use crate::{
    basis::{BasisEvaluator, DerivOrder},
    config::DoriConfig,
    density::DensitySource,
    dori::DoriOutput,
    error::DoriError,
};

const BYTES_PER_GIB: f64 = (1u64 << 30) as f64;

/// Number of grid points whose second order basis tensor fits in `memory_gib`. Never
/// less than one.
pub fn chunk_size_for_budget(memory_gib: f64, n_basis: usize) -> usize {
    let bytes_per_point =
        DerivOrder::Hessian.n_components() * n_basis * std::mem::size_of::<f64>();
    let chunk_size = (memory_gib * BYTES_PER_GIB / bytes_per_point as f64).floor() as usize;

    if chunk_size == 0 {
        log::warn!(
            "{memory_gib} GiB is too little for a single point with {n_basis} basis functions, \
             evaluating one point at a time"
        );
        return 1;
    }
    chunk_size
}

/// Evaluates the configured algorithm on every grid point, in chunks sized by the
/// configured memory budget.
pub fn evaluate_over_grid<B: BasisEvaluator + Sync>(
    basis: &B,
    points: &[Vector3<f64>],
    source: &DensitySource,
    config: &DoriConfig,
) -> Result<DoriOutput, DoriError> {
    evaluate_over_grid_with(basis, points, source, config, |n_basis| {
        chunk_size_for_budget(config.memory_gib, n_basis)
    })
}

/// Like [`evaluate_over_grid`], with the chunk length computed by `chunk_size` from the
/// number of basis functions.
pub fn evaluate_over_grid_with<B: BasisEvaluator + Sync>(
    basis: &B,
    points: &[Vector3<f64>],
    source: &DensitySource,
    config: &DoriConfig,
    chunk_size: impl FnOnce(usize) -> usize,
) -> Result<DoriOutput, DoriError> {
    config.validate()?;
    source.check_basis(basis.n_basis())?;

    let algorithm = config.algorithm;
    let mut output = DoriOutput::zeros(points.len(), algorithm.computes_signed_density());
    if points.is_empty() {
        return Ok(output);
    }

    let chunk_size = chunk_size(basis.n_basis()).max(1);
    let n_chunks = points.len().div_ceil(chunk_size);
    log::debug!(
        "{} points in {n_chunks} chunks of up to {chunk_size}, {algorithm} algorithm",
        points.len()
    );

    #[cfg(feature = "rayon")]
    {
        use rayon::{
            iter::{IndexedParallelIterator, ParallelIterator},
            slice::ParallelSlice,
        };

        // iterators are lazy - we collect to evaluate all chunks before writing them
        let chunks = points
            .par_chunks(chunk_size)
            .enumerate()
            .map(|(index, chunk)| {
                let result = algorithm.evaluate(basis, chunk, source, config);
                log::info!("chunk {}/{n_chunks} done", index + 1);
                result.map(|result| (index * chunk_size, result))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (start, chunk) in &chunks {
            output.write_chunk(*start, chunk);
        }
    }

    #[cfg(not(feature = "rayon"))]
    for (index, chunk) in points.chunks(chunk_size).enumerate() {
        let result = algorithm.evaluate(basis, chunk, source, config)?;
        output.write_chunk(index * chunk_size, &result);
        log::info!("chunk {}/{n_chunks} done", index + 1);
    }

    Ok(output)
}
