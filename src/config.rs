use std::path::{Path, PathBuf};

use clap::{Parser, ValueHint};
use serde::Deserialize;

use crate::data::model::IrradianceKind;
use crate::error::{Error, Result};
use crate::regression::{FitConfig, DEFAULT_SEED, DEFAULT_TEST_FRACTION};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Command line and environment. Every option may also come from `--config`.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Solar irradiance viewer for NREL CSR tables", long_about = None)]
pub struct Args {
    /// JSON file with any of: data_dir, dni, glo, tilt, dif, seed, test_fraction
    #[arg(long, env = "IRRADIANCE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Directory holding csr_africa_{dni,glo,tilt,dif}.csv [default: .]
    #[arg(long, env = "IRRADIANCE_DATA_DIR", value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    /// Direct normal irradiance table
    #[arg(long, env = "IRRADIANCE_DNI", value_hint = ValueHint::FilePath)]
    pub dni: Option<PathBuf>,

    /// Global irradiance table
    #[arg(long, env = "IRRADIANCE_GLO", value_hint = ValueHint::FilePath)]
    pub glo: Option<PathBuf>,

    /// Tilted-surface irradiance table
    #[arg(long, env = "IRRADIANCE_TILT", value_hint = ValueHint::FilePath)]
    pub tilt: Option<PathBuf>,

    /// Diffuse irradiance table
    #[arg(long, env = "IRRADIANCE_DIF", value_hint = ValueHint::FilePath)]
    pub dif: Option<PathBuf>,

    /// Seed for the train/holdout shuffle [default: 42]
    #[arg(long, env = "IRRADIANCE_SEED")]
    pub seed: Option<u64>,

    /// Share of joined rows held out for scoring [default: 0.2]
    #[arg(long, env = "IRRADIANCE_TEST_FRACTION")]
    pub test_fraction: Option<f64>,
}

impl Args {
    fn table(&self, kind: IrradianceKind) -> Option<&PathBuf> {
        match kind {
            IrradianceKind::Direct => self.dni.as_ref(),
            IrradianceKind::Global => self.glo.as_ref(),
            IrradianceKind::Tilted => self.tilt.as_ref(),
            IrradianceKind::Diffuse => self.dif.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config file
// ---------------------------------------------------------------------------

/// Optional JSON config. Relative table paths resolve against `data_dir`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub dni: Option<PathBuf>,
    pub glo: Option<PathBuf>,
    pub tilt: Option<PathBuf>,
    pub dif: Option<PathBuf>,
    pub seed: Option<u64>,
    pub test_fraction: Option<f64>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    fn table(&self, kind: IrradianceKind) -> Option<&PathBuf> {
        match kind {
            IrradianceKind::Direct => self.dni.as_ref(),
            IrradianceKind::Global => self.glo.as_ref(),
            IrradianceKind::Tilted => self.tilt.as_ref(),
            IrradianceKind::Diffuse => self.dif.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// File name looked up in the data directory when no path is given.
pub fn default_file_name(kind: IrradianceKind) -> String {
    format!("csr_africa_{}.csv", kind.short_name().to_ascii_lowercase())
}

/// Locations of the four source tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    paths: [PathBuf; 4],
}

impl DataPaths {
    /// The default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        DataPaths {
            paths: IrradianceKind::ALL.map(|kind| dir.join(default_file_name(kind))),
        }
    }

    pub fn get(&self, kind: IrradianceKind) -> &Path {
        &self.paths[kind.index()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub paths: DataPaths,
    pub fit: FitConfig,
}

impl Config {
    /// Resolve command line, environment, config file and defaults, in that order.
    pub fn resolve(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => {
                log::debug!("Reading config file {}", path.display());
                FileConfig::from_path(path)?
            }
            None => FileConfig::default(),
        };
        Self::merge(args, &file)
    }

    fn merge(args: &Args, file: &FileConfig) -> Result<Self> {
        let data_dir = args
            .data_dir
            .clone()
            .or_else(|| file.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        let defaults = DataPaths::in_dir(&data_dir);
        let paths = IrradianceKind::ALL.map(|kind| match (args.table(kind), file.table(kind)) {
            (Some(cli), _) => cli.clone(),
            (None, Some(from_file)) => data_dir.join(from_file),
            (None, None) => defaults.get(kind).to_path_buf(),
        });

        let test_fraction = args
            .test_fraction
            .or(file.test_fraction)
            .unwrap_or(DEFAULT_TEST_FRACTION);
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(Error::Config(format!(
                "test_fraction must be between 0 and 1, got {test_fraction}"
            )));
        }

        Ok(Config {
            paths: DataPaths { paths },
            fit: FitConfig {
                test_fraction,
                seed: args.seed.or(file.seed).unwrap_or(DEFAULT_SEED),
            },
        })
    }
}
