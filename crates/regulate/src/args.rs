use crate::load_json;
use clap::Parser;
use cooperative::{EnforceConfig, ZeroGrantPolicy};
use std::path::PathBuf;

/// Cuts back the purchases of products ordered beyond their quantity limit
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Delivery snapshot (JSON)
    pub delivery: PathBuf,

    /// Where to write the adjusted snapshot, stdout if omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enforcement settings (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Keep purchases which are granted nothing instead of deleting them
    #[arg(long)]
    pub keep_zero_grants: bool,

    /// Only report adjustments
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Settings from the config file, overridden by command line flags
    pub fn enforce_config(&self) -> eyre::Result<EnforceConfig> {
        let mut config = match &self.config {
            Some(path) => load_json(path)?,
            None => EnforceConfig::default(),
        };
        if self.keep_zero_grants {
            config.zero_grant = ZeroGrantPolicy::Keep;
        }
        Ok(config)
    }
}
