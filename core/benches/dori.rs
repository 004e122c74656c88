use dori_core::{
    config::DoriConfig, density::DensitySource, dori::Algorithm, evaluate_over_grid, testing,
};
use nalgebra::Vector3;

use criterion::{criterion_group, criterion_main, Criterion};

/// Points of a cube of side `2 * half_width` bohr, `n` per axis
fn cube(half_width: f64, n: usize) -> Vec<Vector3<f64>> {
    let axis = testing::line(
        Vector3::from_element(-half_width),
        Vector3::from_element(half_width),
        n,
    );
    itertools::iproduct!(&axis, &axis, &axis)
        .map(|(x, y, z)| Vector3::new(x.x, y.y, z.z))
        .collect()
}

fn bench_algorithms(c: &mut Criterion) {
    let systems = [
        ("hydrogen STO-3G", testing::hydrogen(), testing::hydrogen_density_matrix()),
        ("water 6-31G", testing::water(), testing::water_density_matrix()),
    ];
    let points = cube(3.0, 12);

    for (name, (molecule, basis_set), dm) in systems {
        let basis = molecule.basis(&basis_set).unwrap();
        let source = DensitySource::Matrix(dm);

        for algorithm in [Algorithm::Analytical, Algorithm::Numerical] {
            let config = DoriConfig {
                algorithm,
                ..DoriConfig::default()
            };

            c.bench_function(&format!("DORI {algorithm} {name}"), |b| {
                b.iter(|| evaluate_over_grid(&basis, &points, &source, &config).unwrap())
            });
        }
    }
}

criterion_group!(benches, bench_algorithms);
criterion_main!(benches);
