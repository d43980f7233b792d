use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mimicry", about = "Score vocal imitations of short audio clips")]
pub struct Cli {
    /// Config file (defaults to ./mimicry.toml or the user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Samples per RMS window in the amplitude envelope
    #[arg(long, global = true, default_value_t = 1024)]
    pub window_size: usize,

    /// FFT size of the spectral snapshot
    #[arg(long, global = true, default_value_t = 2048)]
    pub fft_size: usize,

    /// Mean attempt amplitude below which the attempt counts as silence
    #[arg(long, global = true, default_value_t = 0.01)]
    pub silence_threshold: f32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score one attempt recording against one reference clip
    Score {
        /// Reference clip (WAV, MP3, FLAC, OGG, AAC)
        reference: PathBuf,
        /// Recorded attempt
        attempt: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load the configured clip catalog and list it
    Clips,

    /// Play a game session from pre-recorded attempts
    Session {
        /// One round as CLIP_ID=ATTEMPT_PATH; repeat for each round
        #[arg(short, long = "round", value_parser = parse_round, required = true)]
        rounds: Vec<RoundArg>,
        /// Print the session summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoundArg {
    pub clip_id: String,
    pub attempt: PathBuf,
}

fn parse_round(s: &str) -> Result<RoundArg, String> {
    let (clip_id, attempt) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CLIP_ID=ATTEMPT_PATH, got '{}'", s))?;
    if clip_id.is_empty() || attempt.is_empty() {
        return Err(format!("expected CLIP_ID=ATTEMPT_PATH, got '{}'", s));
    }
    Ok(RoundArg {
        clip_id: clip_id.to_string(),
        attempt: PathBuf::from(attempt),
    })
}
