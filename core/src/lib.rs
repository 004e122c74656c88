pub mod atom;
pub mod basis;
pub mod config;
pub mod curvature;
pub mod density;
pub mod dori;
pub mod error;
pub mod grid;
pub mod molecule;
pub mod packing;

pub use dori::{Algorithm, DoriOutput};
pub use error::DoriError;
pub use grid::{evaluate_over_grid, evaluate_over_grid_with};

/// Small systems shared by tests and benchmarks.
pub mod testing {
    use nalgebra::{DMatrix, Vector3};
    use smallvec::smallvec;

    use crate::{
        atom::Atom,
        basis::{BasisFunction, BasisSet, ContractedGaussian, Gaussian, MolecularBasis},
        config::ConfigBasisSet,
        molecule::Molecule,
    };

    pub const B_STO_3G: &str = r#"{"molssi_bse_schema":{"schema_type":"complete","schema_version":"0.1"},"revision_description":"DatafromGaussian09","revision_date":"2018-06-19","elements":{"1":{"electron_shells":[{"function_type":"gto","region":"","angular_momentum":[0],"exponents":["0.3425250914E+01","0.6239137298E+00","0.1688554040E+00"],"coefficients":[["0.1543289673E+00","0.5353281423E+00","0.4446345422E+00"]]}],"references":[{"reference_description":"STO-3GMinimalBasis(3functions/AO)","reference_keys":["hehre1969a"]}]}},"version":"1","function_types":["gto"],"names":["STO-3G"],"tags":[],"family":"sto","description":"STO-3GMinimalBasis(3functions/AO)","role":"orbital","auxiliaries":{},"name":"STO-3G"}"#;

    pub const B_6_31G: &str = r#"{"molssi_bse_schema":{"schema_type":"complete","schema_version":"0.1"},"revision_description":"DatafromGaussian09/GAMESS","revision_date":"2018-06-19","elements":{"1":{"electron_shells":[{"function_type":"gto","region":"valence","angular_momentum":[0],"exponents":["0.1873113696E+02","0.2825394365E+01","0.6401216923E+00"],"coefficients":[["0.3349460434E-01","0.2347269535E+00","0.8137573261E+00"]]},{"function_type":"gto","region":"valence","angular_momentum":[0],"exponents":["0.1612777588E+00"],"coefficients":[["1.0000000"]]}],"references":[{"reference_description":"31GSplit-valencebasissetforH,He","reference_keys":["ditchfield1971a"]}]},"8":{"electron_shells":[{"function_type":"gto","region":"valence","angular_momentum":[0],"exponents":["0.5484671660E+04","0.8252349460E+03","0.1880469580E+03","0.5296450000E+02","0.1689757040E+02","0.5799635340E+01"],"coefficients":[["0.1831074430E-02","0.1395017220E-01","0.6844507810E-01","0.2327143360E+00","0.4701928980E+00","0.3585208530E+00"]]},{"function_type":"gto","region":"valence","angular_momentum":[0,1],"exponents":["0.1553961625E+02","0.3599933586E+01","0.1013761750E+01"],"coefficients":[["-0.1107775495E+00","-0.1480262627E+00","0.1130767015E+01"],["0.7087426823E-01","0.3397528391E+00","0.7271585773E+00"]]},{"function_type":"gto","region":"valence","angular_momentum":[0,1],"exponents":["0.2700058226E+00"],"coefficients":[["0.1000000000E+01"],["0.1000000000E+01"]]}],"references":[{"reference_description":"6-31GSplit-valencebasisset","reference_keys":["hehre1972a"]}]}},"version":"1","function_types":["gto"],"names":["6-31G"],"tags":[],"family":"pople","description":"6-31Gvalencedouble-zeta","role":"orbital","auxiliaries":{},"name":"6-31G"}"#;

    /// Overlap of the two STO-3G 1s functions of H2 at 1.4 bohr
    const H2_OVERLAP: f64 = 0.6593;

    fn basis_set(json: &str) -> BasisSet {
        let basis_set: ConfigBasisSet = serde_json::from_str(json).unwrap();
        BasisSet::try_from(basis_set).unwrap()
    }

    /// H2 along z with a bond length of 1.4 bohr, in STO-3G
    pub fn hydrogen() -> (Molecule, BasisSet) {
        let molecule = Molecule::new(vec![
            Atom::new(1, Vector3::new(0.0, 0.0, 0.0)),
            Atom::new(1, Vector3::new(0.0, 0.0, 1.4)),
        ]);
        (molecule, basis_set(B_STO_3G))
    }

    /// Doubly occupied bonding orbital of [`hydrogen`]
    pub fn hydrogen_density_matrix() -> DMatrix<f64> {
        DMatrix::from_element(2, 2, 1.0 / (1.0 + H2_OVERLAP))
    }

    /// Water in the yz plane, in 6-31G
    pub fn water() -> (Molecule, BasisSet) {
        let molecule = Molecule::new(vec![
            Atom::new(8, Vector3::new(0.0, 0.0, 0.0)),
            Atom::new(1, Vector3::new(0.0, 1.43, 1.11)),
            Atom::new(1, Vector3::new(0.0, -1.43, 1.11)),
        ]);
        (molecule, basis_set(B_6_31G))
    }

    /// A closed shell density matrix for [`water`] built from five made-up orbitals
    pub fn water_density_matrix() -> DMatrix<f64> {
        let n_basis = 13;
        let coefficients = DMatrix::from_fn(n_basis, 5, |i, j| {
            ((i + 2 * j) as f64 * 0.7).cos() / (1.0 + j as f64)
        });
        occupied_density_matrix(&coefficients)
    }

    /// `2 C C^T` for orbital coefficients `C` (one orbital per column)
    pub fn occupied_density_matrix(coefficients: &DMatrix<f64>) -> DMatrix<f64> {
        2.0 * coefficients * coefficients.transpose()
    }

    /// A single unnormalized `exp(-r^2)` at the origin
    pub fn unit_gaussian() -> MolecularBasis {
        MolecularBasis(vec![BasisFunction {
            contracted_gaussian: ContractedGaussian(smallvec![Gaussian {
                exponent: 1.0,
                coefficient: 1.0,
                angular: (0, 0, 0),
            }]),
            position: Vector3::zeros(),
        }])
    }

    /// `n` evenly spaced points from `start` to `end`, both included
    pub fn line(start: Vector3<f64>, end: Vector3<f64>, n: usize) -> Vec<Vector3<f64>> {
        (0..n)
            .map(|i| start.lerp(&end, i as f64 / (n - 1).max(1) as f64))
            .collect()
    }
}
