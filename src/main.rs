mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use cli::{Cli, Command, RoundArg};
use mimicry::config::{self, AnalysisConfig, Config};
use mimicry::{compare_with, decode_file, extract_with, ClipLibrary, ComparisonResult, FeatureSet, Session};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let mut config = match config::find_config(cli.config.clone()) {
        Some(path) => match config::load_config(&path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            // An explicitly requested config must load
            Err(err) if cli.config.is_some() => return Err(err),
            Err(err) => {
                log::warn!("{:#}; using defaults", err);
                Config::default()
            }
        },
        None => Config::default(),
    };

    // Merge: CLI values apply only when they differ from their defaults
    if cli.window_size != config::default_window_size() {
        config.analysis.window_size = cli.window_size;
    }
    if cli.fft_size != config::default_fft_size() {
        config.analysis.fft_size = cli.fft_size;
    }
    if cli.silence_threshold != config::default_silence_threshold() {
        config.scoring.silence_threshold = cli.silence_threshold;
    }
    config.analysis.validate()?;

    match cli.command {
        Command::Score {
            reference,
            attempt,
            json,
        } => run_score(&config, &reference, &attempt, json),
        Command::Clips => run_clips(&config),
        Command::Session { rounds, json } => run_session(&config, &rounds, json),
    }
}

fn analyze_file(path: &Path, analysis: &AnalysisConfig) -> Result<FeatureSet> {
    let signal = decode_file(path).with_context(|| format!("Failed to decode {}", path.display()))?;
    let features = extract_with(&signal, analysis)
        .with_context(|| format!("Failed to analyze {}", path.display()))?;
    Ok(features)
}

fn run_score(config: &Config, reference: &Path, attempt: &Path, json: bool) -> Result<()> {
    log::info!("Reference: {}", reference.display());
    log::info!("Attempt: {}", attempt.display());

    let (reference_features, attempt_features) = rayon::join(
        || analyze_file(reference, &config.analysis),
        || analyze_file(attempt, &config.analysis),
    );
    let result = compare_with(&reference_features?, &attempt_features?, &config.scoring);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn print_result(result: &ComparisonResult) {
    println!("Score: {}%", result.score);
    println!("  amplitude match: {:.1}", result.amplitude_match);
    println!("  duration match:  {:.1}", result.duration_match);
    println!("  pitch match:     {:.1} (not scored)", result.pitch_match);
    println!("  composite:       {}", result.composite);
}

fn load_library(config: &Config) -> Result<ClipLibrary> {
    if config.clips.is_empty() {
        anyhow::bail!("No clips configured; add [[clips]] entries to mimicry.toml");
    }

    let pb = ProgressBar::new(config.clips.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} clips")?
            .progress_chars("=>-"),
    );

    let library = ClipLibrary::load_with_progress(
        &config.clips,
        &config.analysis,
        config.game.fallback_window(),
        |_| pb.inc(1),
    );
    pb.finish_and_clear();

    if library.is_empty() {
        anyhow::bail!("None of the configured clips could be loaded");
    }
    Ok(library)
}

fn run_clips(config: &Config) -> Result<()> {
    let library = load_library(config)?;

    println!("Available clips:");
    for id in library.ids() {
        if let Some(clip) = library.get(id) {
            println!("  {:<10} {:<40} {:.2}s", id, clip.entry.name, clip.signal.duration());
        }
    }
    Ok(())
}

fn run_session(config: &Config, rounds: &[RoundArg], json: bool) -> Result<()> {
    let library = load_library(config)?;
    let mut session = Session::new(config.game.rounds);

    for round in rounds {
        if session.is_complete() {
            log::warn!(
                "Session already has {} rounds, ignoring the remaining attempts",
                session.total_rounds()
            );
            break;
        }

        let Some(clip) = library.get(&round.clip_id) else {
            log::error!("Unknown clip '{}', skipping round", round.clip_id);
            continue;
        };

        log::info!(
            "Round {}/{}: {} (record window {:.1}s)",
            session.round_number(),
            session.total_rounds(),
            clip.entry.name,
            library.recording_window(&round.clip_id).as_secs_f32()
        );

        // A failed decode leaves the round unscored; the player records again
        let attempt = match analyze_file(&round.attempt, &config.analysis) {
            Ok(features) => features,
            Err(err) => {
                log::error!("Round unscored, record again: {:#}", err);
                continue;
            }
        };

        let number = session.round_number();
        let result = compare_with(&clip.features, &attempt, &config.scoring);
        match session.record(&round.clip_id, &result) {
            Ok(score) => {
                if !json {
                    println!("Round {} - {}: {}%", number, clip.entry.name, score.score);
                }
            }
            Err(err) => log::warn!("{}", err),
        }
    }

    if json {
        let summary = serde_json::json!({
            "rounds": session.scores(),
            "complete": session.is_complete(),
            "final_score": session.final_score(),
            "verdict": session.verdict(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    match (session.is_complete(), session.final_score()) {
        (true, Some(score)) => {
            println!("Final score: {:.0}%", score);
            println!("{}", session.verdict().unwrap_or_default());
        }
        (false, Some(score)) => {
            println!(
                "Session incomplete: {}/{} rounds played, average so far {:.0}%",
                session.scores().len(),
                session.total_rounds(),
                score
            );
            let unused = session.unused_clips(library.ids());
            if !unused.is_empty() {
                println!("Clips not played yet: {}", unused.join(", "));
            }
        }
        (_, None) => anyhow::bail!("No rounds were scored"),
    }
    Ok(())
}
