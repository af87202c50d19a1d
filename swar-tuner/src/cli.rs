use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::audio::DEFAULT_FRAME_SIZE;

#[derive(Parser, Debug)]
#[command(name = "swar-tuner", about = "Shows the swar of a sustained note against a movable Sa")]
pub struct Cli {
    /// TOML config file (default: ./swar.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sa as a note name, e.g. C, C#, Bb
    #[arg(short, long)]
    pub root: Option<String>,

    /// Degree mapping
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Where samples come from
    #[arg(short, long, value_enum, default_value_t = SourceArg::Stdin)]
    pub source: SourceArg,

    /// Sample rate of raw PCM on stdin
    #[arg(long, default_value_t = 44100)]
    pub sample_rate: u32,

    /// Samples per analysis frame
    #[arg(long, default_value_t = DEFAULT_FRAME_SIZE)]
    pub frame_size: usize,

    /// Print one JSON object per frame instead of a text line
    #[arg(long)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Twelve degrees, komal and tivra included
    Chromatic,
    /// Nearest of the seven natural degrees
    Natural,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    /// Raw little-endian f32 mono PCM on stdin
    Stdin,
    /// Default input device (needs the `live` feature)
    Live,
}
