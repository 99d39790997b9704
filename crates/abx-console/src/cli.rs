use std::path::PathBuf;

use clap::{Parser, Subcommand};

use abx_console::NdjsonKind;

#[derive(Parser, Debug)]
#[command(name = "abx", version, about = "Manage A/B experiments and their traffic allocation")]
pub struct Cli {
    /// Config file (defaults to <config_dir>/abx/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding config and environment.
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List experiments.
    List {
        /// Search terms matched against experiment keys.
        #[arg(short, long)]
        search: Vec<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Show one experiment.
    Show { id: String },
    /// Create an experiment with two evenly split variants.
    Create {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Activate an experiment.
    Enable { id: String },
    /// Deactivate an experiment.
    Disable { id: String },
    /// Delete an experiment.
    Delete { id: String },
    /// Show the results report of an experiment.
    Results {
        id: String,
        /// Also print the conversion-over-time series.
        #[arg(long)]
        chart: bool,
    },
    /// Edit an experiment's variants.
    Variants {
        id: String,
        #[command(subcommand)]
        action: VariantAction,
    },
    /// Interactive traffic editor.
    Edit { id: String },
    /// Download experiments or events as ndjson.
    Export {
        kind: NdjsonKind,
        /// Output file; prints to stdout when omitted.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Upload experiments or events from an ndjson file.
    Import { kind: NdjsonKind, file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum VariantAction {
    /// Add a variant labelled with the next letter.
    Add,
    /// Remove a variant and redistribute its traffic.
    Remove { variant_id: String },
    /// Set traffic from cumulative slider positions, e.g. `0 30 100`.
    Set {
        #[arg(required = true, num_args = 2..)]
        positions: Vec<f64>,
    },
}
