use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "pod",
    about = "Pod resource store: folders, files and metadata behind an LDP-style protocol",
    version,
)]
pub struct Cli {
    /// Pod configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URL of the pod; overrides the configuration file
    #[arg(long, value_name = "URL")]
    pub base: Option<String>,

    /// JSON snapshot to load on start and save after every change
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Shorthand for `--format json`
    #[arg(long)]
    pub json: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    #[arg(short, long)]
    pub verbose: bool,

    /// Command to run once; without one, commands are read from stdin
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    pub fn wants_json(&self) -> bool {
        self.json || self.format == OutputFormat::Json
    }
}
