use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use spectra_model::{ConfigPatch, FilterMode, FilterType};

#[derive(Parser, Debug)]
#[command(
    name = "spectra",
    version,
    about = "Frequency-domain image filtering through a remote service"
)]
pub struct Cli {
    /// Processing service base URL (overrides config and SPECTRA_SERVER_URL)
    #[arg(long, global = true)]
    pub server: Option<String>,
    /// Processing timeout, e.g. `90s` or `2m`
    #[arg(long, global = true, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Probe the processing service
    Health,
    /// List the built-in filter presets
    Presets,
    /// Upload an image to the service's upload area
    Upload { file: PathBuf },
    /// Filter an image and report quality metrics
    Process(ProcessArgs),
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    pub file: PathBuf,
    /// Start from this preset before applying the explicit flags
    #[arg(long)]
    pub preset: Option<String>,
    #[arg(long)]
    pub filter_type: Option<FilterType>,
    #[arg(long)]
    pub mode: Option<FilterMode>,
    #[arg(long)]
    pub cutoff: Option<u16>,
    /// Butterworth order
    #[arg(long)]
    pub order: Option<u8>,
    #[arg(long)]
    pub center_freq: Option<u16>,
    #[arg(long)]
    pub bandwidth: Option<u16>,
    /// Write the returned images into this directory
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl ProcessArgs {
    /// Explicit parameter flags as an edit on top of the preset.
    pub fn patch(&self) -> ConfigPatch {
        ConfigPatch {
            filter_type: self.filter_type,
            filter_mode: self.mode,
            cutoff: self.cutoff,
            order: self.order,
            center_freq: self.center_freq,
            bandwidth: self.bandwidth,
        }
    }
}
