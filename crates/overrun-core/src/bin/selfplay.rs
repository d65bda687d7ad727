//! Self-play batch runner.
//!
//! Usage: overrun-selfplay [games] [players] [size] [density] [seed]
//! Prints batch metrics as JSON.

use std::process::ExitCode;

use overrun_core::{run_batch_selfplay, SelfPlayConfig};
use overrun_protocol::Density;

fn parse_density(raw: &str) -> Option<Density> {
    match raw.to_ascii_lowercase().as_str() {
        "sparse" => Some(Density::Sparse),
        "medium" => Some(Density::Medium),
        "dense" => Some(Density::Dense),
        _ => None,
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = SelfPlayConfig::default();

    if let Some(games) = args.first() {
        match games.parse() {
            Ok(n) => config.games = n,
            Err(_) => return usage(),
        }
    }
    if let Some(players) = args.get(1) {
        match players.parse() {
            Ok(n) => config.num_players = n,
            Err(_) => return usage(),
        }
    }
    if let Some(size) = args.get(2) {
        match size.parse() {
            Ok(n) => config.size = n,
            Err(_) => return usage(),
        }
    }
    if let Some(density) = args.get(3) {
        match parse_density(density) {
            Some(d) => config.density = d,
            None => return usage(),
        }
    }
    if let Some(seed) = args.get(4) {
        match seed.parse() {
            Ok(n) => config.seed = n,
            Err(_) => return usage(),
        }
    }

    match run_batch_selfplay(&config) {
        Ok(batch) => {
            match serde_json::to_string_pretty(&batch) {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    eprintln!("failed to encode metrics: {err}");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("self-play failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn usage() -> ExitCode {
    eprintln!("usage: overrun-selfplay [games] [players] [size] [sparse|medium|dense] [seed]");
    ExitCode::FAILURE
}
