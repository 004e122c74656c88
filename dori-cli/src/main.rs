use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dori_core::{
    basis::BasisSet,
    config::{ConfigBasisSet, ConfigDensity, ConfigGrid, ConfigMolecule, DoriConfig},
    density::DensitySource,
    dori::Algorithm,
    evaluate_over_grid,
    molecule::Molecule,
    DoriOutput,
};
use nalgebra::Vector3;
use serde::{de::DeserializeOwned, Serialize};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: DoriCommand,
}

#[derive(Subcommand, Debug)]
enum DoriCommand {
    /// Evaluate the density overlap regions indicator on a grid
    #[command(name = "dori")]
    Dori {
        /// Basis set in the JSON format of the Basis Set Exchange
        #[arg(long, short)]
        basis_set: PathBuf,
        /// A path to the molecule, a list of atomic numbers and positions in bohr
        #[arg(long, short)]
        molecule: PathBuf,
        /// Either a density matrix or density fitting coefficients
        #[arg(long, short)]
        density: PathBuf,
        /// The grid points, a list of [x, y, z] in bohr
        #[arg(long, short)]
        grid: PathBuf,
        /// A settings file, overridden by the options below
        #[arg(long, short)]
        config: Option<PathBuf>,
        /// "analytical" or "numerical", or any prefix of either
        #[arg(long, short)]
        algorithm: Option<Algorithm>,
        /// Points with less density than this are reported as zero
        #[arg(long)]
        eps: Option<f64>,
        /// Memory budget of a single chunk of grid points, in GiB
        #[arg(long)]
        memory: Option<f64>,
        /// Finite difference step of the numerical algorithm, in bohr
        #[arg(long)]
        step: Option<f64>,
        /// Where to write the report, stdout if not given
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// The fields written by the `dori` command
#[derive(Serialize)]
struct Report {
    algorithm: Algorithm,
    n_points: usize,
    dori: Vec<f64>,
    rho: Vec<f64>,
    /// `null` for the numerical algorithm
    s2rho: Option<Vec<f64>>,
}

impl From<(Algorithm, DoriOutput)> for Report {
    fn from((algorithm, output): (Algorithm, DoriOutput)) -> Self {
        Self {
            algorithm,
            n_points: output.len(),
            dori: output.dori.as_slice().to_vec(),
            rho: output.rho.as_slice().to_vec(),
            s2rho: output.s2rho.map(|s2rho| s2rho.as_slice().to_vec()),
        }
    }
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("could not parse {}", path.display()))
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args: Args = Args::parse();

    match args.command {
        DoriCommand::Dori {
            basis_set,
            molecule,
            density,
            grid,
            config,
            algorithm,
            eps,
            memory,
            step,
            output,
        } => {
            let basis_set = BasisSet::try_from(load::<ConfigBasisSet>(&basis_set)?)
                .context("invalid basis set")?;
            let molecule =
                Molecule::try_from(load::<ConfigMolecule>(&molecule)?).context("invalid molecule")?;
            let source =
                DensitySource::try_from(load::<ConfigDensity>(&density)?).context("invalid density")?;
            let points = Vec::<Vector3<f64>>::try_from(load::<ConfigGrid>(&grid)?)
                .context("invalid grid")?;

            let mut config = match config {
                Some(path) => load::<DoriConfig>(&path)?,
                None => DoriConfig::default(),
            };
            config.algorithm = algorithm.unwrap_or(config.algorithm);
            config.eps = eps.unwrap_or(config.eps);
            config.memory_gib = memory.unwrap_or(config.memory_gib);
            config.step = step.unwrap_or(config.step);

            let basis = molecule.basis(&basis_set)?;
            log::info!(
                "{} atoms, {} basis functions, {} grid points",
                molecule.atoms().len(),
                basis.functions().len(),
                points.len()
            );

            let start = Instant::now();
            let result = evaluate_over_grid(&basis, &points, &source, &config)?;
            log::info!(
                "{} DORI on {} points took {:0.2?}",
                config.algorithm,
                result.len(),
                start.elapsed()
            );

            let report = Report::from((config.algorithm, result));
            let writer: Box<dyn Write> = match output {
                Some(path) => Box::new(
                    File::create(&path)
                        .with_context(|| format!("could not create {}", path.display()))?,
                ),
                None => Box::new(std::io::stdout().lock()),
            };
            let mut writer = BufWriter::new(writer);
            serde_json::to_writer(&mut writer, &report)?;
            writer.flush()?;
        }
    }

    Ok(())
}
