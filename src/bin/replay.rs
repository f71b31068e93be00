//! Headless Scenario Replayer
//!
//! Replays a scripted (or seeded random) scenario through a coordinator
//! and prints the per-tick trace.

use action_coordinator::core::error::{CoordinatorError, Result};
use action_coordinator::script::{CommandOutcome, Scenario, Trace};
use clap::Parser;
use std::path::PathBuf;

/// Scenario Replayer - run scripted input through the coordinator
#[derive(Parser, Debug)]
#[command(name = "replay")]
#[command(about = "Replay a scenario and print the resolved state trace")]
struct Args {
    /// Scenario file (TOML) or a name under data/scenarios/
    #[arg(long, conflicts_with = "seed")]
    scenario: Option<String>,

    /// Generate a random scenario from this seed instead of loading one
    #[arg(long)]
    seed: Option<u64>,

    /// Length of a generated scenario in ticks
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,

    /// Replay twice and fail if the traces differ
    #[arg(long)]
    verify: bool,

    /// Print only ticks where the state changed
    #[arg(long, short = 'c')]
    changes_only: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let scenario = match (&args.scenario, args.seed) {
        (Some(source), _) => load_scenario(source)?,
        (None, Some(seed)) => {
            tracing::info!("Generating {} ticks from seed {}", args.ticks, seed);
            Scenario::generate(seed, args.ticks)
        }
        (None, None) => {
            let seed = rand::random();
            tracing::info!("No scenario given, generating from seed {}", seed);
            Scenario::generate(seed, args.ticks)
        }
    };

    let trace = scenario.run()?;

    if args.verify {
        let again = scenario.run()?;
        if again != trace {
            return Err(CoordinatorError::InvalidCommand(
                "replay diverged between runs".into(),
            ));
        }
        tracing::info!("Verified: {} frames identical across runs", trace.frames.len());
    }

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&trace)?),
        _ => print_text(&trace, args.changes_only),
    }
    Ok(())
}

fn load_scenario(source: &str) -> Result<Scenario> {
    let path = PathBuf::from(source);
    if path.exists() {
        Scenario::load(path)
    } else {
        Scenario::load_named(source)
    }
}

fn print_text(trace: &Trace, changes_only: bool) {
    let mut requests = trace.requests.iter().peekable();
    let mut previous = None;

    for frame in &trace.frames {
        // Requests stamped before this frame's tick were issued ahead of it
        while let Some(request) = requests.next_if(|r| r.tick < frame.tick) {
            let mark = match request.outcome {
                CommandOutcome::Accepted => "ok",
                CommandOutcome::Denied => "DENIED",
                CommandOutcome::Applied => "",
            };
            println!("        > {} {}", request.command, mark);
        }

        if changes_only && previous == Some(frame.state) {
            continue;
        }
        previous = Some(frame.state);

        let direction = frame
            .sprint_direction
            .map(|d| format!(" [{}]", d))
            .unwrap_or_default();
        println!(
            "{:>6}  {:<8}{:<16} L:{}{} R:{}{}{}{}",
            frame.tick,
            frame.state.to_string(),
            direction,
            if frame.left.flags.is_firing { "F" } else { "-" },
            if frame.left.flags.is_channeling { "C" } else { "-" },
            if frame.right.flags.is_firing { "F" } else { "-" },
            if frame.right.flags.is_channeling { "C" } else { "-" },
            if frame.critical_action_active { " critical" } else { "" },
            if frame.gesturing { " gesture" } else { "" },
        );
    }

    println!(
        "\n{} ticks, {} requests ({} denied)",
        trace.frames.len(),
        trace.requests.len(),
        trace
            .requests
            .iter()
            .filter(|r| r.outcome == CommandOutcome::Denied)
            .count()
    );
}
