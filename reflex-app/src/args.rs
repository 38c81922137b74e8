use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::logging::LogFormat;

/// Reaction-time trainer with six levels of increasing difficulty.
#[derive(Parser, Debug)]
#[command(name = "reflex", author, version, about)]
pub struct Cli {
    /// Start this level right away instead of showing the level picker.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=6))]
    pub level: Option<u8>,

    /// Name shown on the ranking. Saved for later runs.
    #[arg(long, env = "REFLEX_NICKNAME")]
    pub nickname: Option<String>,

    /// Where scores, the device id and the last session are kept.
    #[arg(long, env = "REFLEX_DATA_DIR", default_value = ".reflex")]
    pub data_dir: PathBuf,

    /// Seed for stimulus and delay draws, to replay a run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Play without a device id; scores are not saved.
    #[arg(long)]
    pub anonymous: bool,

    /// Open a window instead of going fullscreen.
    #[arg(long)]
    pub windowed: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(long, value_enum, default_value = "human", env = "REFLEX_LOG_FORMAT")]
    pub log_format: LogFormat,
}
