//! Serialized inputs and their conversion into the library types.
pub use basis_set::ConfigBasisSet;
pub use density::ConfigDensity;
pub use grid::ConfigGrid;
pub use molecule::ConfigMolecule;
pub use settings::DoriConfig;

mod basis_set;
mod density;
mod grid;
mod molecule;
mod settings;
