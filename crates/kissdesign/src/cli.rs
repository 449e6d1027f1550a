use std::fs;
use std::path::PathBuf;
use clap::ArgAction;
use clap::ArgGroup;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use log::LevelFilter;

use kd_design::ConflictPolicy;
use kd_design::DesignConfig;
use kd_design::normalize_sequence;
use kd_design::DesignError;
use kd_design::FoldingOracle;
use kd_design::NussinovOracle;
use kd_design::OracleFailurePolicy;
use kd_design::ScaffoldCatalog;
use kd_design::ViennaOracle;

#[derive(Parser)]
#[command(name = "kissdesign", version, about, disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify multiple times to increase verbosity level (e.g., -vv).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Design candidate sequences for a scaffold.
    Design(DesignArgs),
    /// Show hairpin loops, motifs and constraints of a scaffold or structure.
    Loops(LoopsArgs),
    /// List the scaffold catalog.
    Scaffolds(CatalogArgs),
    /// Predict the MFE structure of a sequence.
    Fold(FoldArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OracleKind {
    /// Built-in base-pair maximization.
    Nussinov,
    /// ViennaRNA's RNAinverse and RNAfold.
    Vienna,
}

#[derive(Debug, Args)]
pub struct OracleArgs {
    /// Folding oracle.
    #[arg(long = "oracle", value_enum, default_value = "nussinov")]
    pub kind: OracleKind,

    /// Folding temperature for the Vienna oracle (Celsius).
    #[arg(short = 'T', long, default_value = "37.0")]
    pub temperature: f64,
}

impl OracleArgs {
    pub fn build(&self) -> Box<dyn FoldingOracle> {
        match self.kind {
            OracleKind::Nussinov => Box::new(NussinovOracle::default()),
            OracleKind::Vienna => Box::new(ViennaOracle {
                temperature: self.temperature,
                ..ViennaOracle::default()
            }),
        }
    }
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// JSON scaffold catalog (defaults to the built-in scaffolds).
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,
}

impl CatalogArgs {
    pub fn load(&self) -> Result<ScaffoldCatalog, DesignError> {
        match &self.catalog {
            Some(path) => ScaffoldCatalog::from_json_file(path),
            None => Ok(ScaffoldCatalog::builtin()),
        }
    }
}

#[derive(Debug, Args)]
pub struct DesignArgs {
    /// Scaffold name.
    pub scaffold: String,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// JSON design configuration; flags below override it.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of candidates to report.
    #[arg(short = 'n', long = "candidates")]
    pub n_candidates: Option<usize>,

    /// Random seed.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Inverse-folding attempts per trial.
    #[arg(long)]
    pub tries: Option<usize>,

    /// Trials per requested candidate.
    #[arg(long)]
    pub oversample: Option<usize>,

    /// Reject overlapping motif constraints instead of overwriting.
    #[arg(long)]
    pub strict: bool,

    /// Abort the run on the first oracle failure.
    #[arg(long)]
    pub abort_on_oracle_error: bool,

    /// Keep only candidates with MFE at or below this value.
    #[arg(long, value_name = "KCAL")]
    pub mfe_threshold: Option<f64>,

    /// Keep only candidates at or below this MFE percentile.
    #[arg(long, value_name = "PERC")]
    pub mfe_percentile: Option<f64>,

    #[command(flatten)]
    pub oracle: OracleArgs,

    /// Directory for candidate records and RNAComposer input.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print candidates as JSON.
    #[arg(long)]
    pub json: bool,
}

impl DesignArgs {
    pub fn design_config(&self) -> Result<DesignConfig, DesignError> {
        let mut config = match &self.config {
            Some(path) => DesignConfig::from_json_file(path)?,
            None => DesignConfig::default(),
        };
        if let Some(n) = self.n_candidates {
            config.n_candidates = n;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(tries) = self.tries {
            config.tries_per_trial = tries;
        }
        if let Some(k) = self.oversample {
            config.oversample = k;
        }
        if self.strict {
            config.conflict_policy = ConflictPolicy::Reject;
        }
        if self.abort_on_oracle_error {
            config.failure_policy = OracleFailurePolicy::Abort;
        }
        if self.mfe_threshold.is_some() {
            config.mfe_threshold = self.mfe_threshold;
        }
        if self.mfe_percentile.is_some() {
            config.mfe_percentile = self.mfe_percentile;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Args)]
pub struct LoopsArgs {
    /// Scaffold name or a dot-bracket structure.
    pub target: String,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Random seed.
    #[arg(short, long, default_value = "42")]
    pub seed: u64,

    /// Reject overlapping motif constraints instead of overwriting.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Args)]
#[command(group = ArgGroup::new("input").required(true).args(["sequence", "file"]))]
pub struct FoldArgs {
    /// RNA sequence to fold.
    #[arg(short, long)]
    pub sequence: Option<String>,

    /// File containing the sequence (FASTA headers are ignored).
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub oracle: OracleArgs,
}

impl FoldArgs {
    /// The validated sequence, from the command line or the file.
    pub fn read_sequence(&self) -> Result<String, DesignError> {
        match (&self.sequence, &self.file) {
            (Some(seq), _) => normalize_sequence(seq),
            (None, Some(path)) => {
                let text = fs::read_to_string(path).map_err(|source| DesignError::Io {
                    path: path.clone(),
                    source,
                })?;
                normalize_sequence(&text)
            }
            (None, None) => normalize_sequence(""),
        }
    }
}

pub fn init_verbose(cli: &Cli) {
    let filter_level = match cli.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .filter_level(filter_level)
        .init();
}
