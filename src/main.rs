//! Action Coordinator - Console Driver
//!
//! Drives a single coordinator by hand: toggle locomotion sensors, issue
//! requests, and step the tick loop while watching the resolved state.

use action_coordinator::coordinator::{Coordinator, TracingConsumer};
use action_coordinator::core::config::CoordinatorConfig;
use action_coordinator::core::error::Result;
use action_coordinator::resolver::LocomotionSensors;
use action_coordinator::script::{Command, CommandOutcome};

use glam::Vec2;
use std::io::{self, Write};

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "action_coordinator=info".into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => CoordinatorConfig::load(&path)?,
        None => CoordinatorConfig::default(),
    };

    let mut coordinator = Coordinator::with_consumers(config, vec![Box::new(TracingConsumer::new())])?;
    let mut sensors = LocomotionSensors::grounded();

    print_help();

    loop {
        print!("[{} {}] > ", coordinator.now(), coordinator.state());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let mut words = input.split_whitespace();
        match words.next().unwrap_or_default() {
            "quit" | "q" => break,
            "help" | "h" => print_help(),
            "tick" | "t" => {
                let snapshot = coordinator.tick(sensors);
                println!("{}", snapshot);
            }
            "run" => match words.next().and_then(|n| n.parse::<u32>().ok()) {
                Some(n) => {
                    for _ in 0..n {
                        coordinator.tick(sensors);
                    }
                    println!("{}", coordinator.snapshot());
                }
                None => println!("Usage: run <ticks>"),
            },
            "status" | "s" => println!("{}", coordinator.debug_dump()),
            "json" => println!("{}", coordinator.current_snapshot().to_json_pretty()?),
            "history" => {
                for t in coordinator.history().iter() {
                    println!("  [{}] {} -> {} ({})", t.tick, t.from, t.to, t.source);
                }
            }
            "ground" => sensors.grounded = true,
            "air" => {
                sensors.grounded = false;
                sensors.falling = false;
            }
            "fall" => {
                sensors.grounded = false;
                sensors.falling = true;
            }
            "slide" => sensors.sliding = !sensors.sliding,
            "dive" => sensors.diving = !sensors.diving,
            "move" => sensors.movement_input = !sensors.movement_input,
            "sprint" => {
                let x = words.next().and_then(|v| v.parse::<f32>().ok());
                let y = words.next().and_then(|v| v.parse::<f32>().ok());
                match (x, y) {
                    (Some(x), Some(y)) => {
                        sensors.sprint_input = true;
                        sensors.movement_input = true;
                        sensors.sprint_vector = Vec2::new(x, y);
                    }
                    _ => sensors.sprint_input = false,
                }
            }
            "neutral" => {
                sensors = LocomotionSensors {
                    grounded: sensors.grounded,
                    ..Default::default()
                }
            }
            _ => match input.parse::<Command>() {
                Ok(command) => match command.apply(&mut coordinator) {
                    CommandOutcome::Accepted => println!("{}: accepted", command),
                    CommandOutcome::Denied => println!("{}: denied, try again later", command),
                    CommandOutcome::Applied => println!("{}: applied", command),
                },
                Err(e) => println!("{}", e),
            },
        }
    }

    println!(
        "\nFinal state after {} ticks: {}",
        coordinator.now(),
        coordinator.state()
    );
    Ok(())
}

fn print_help() {
    println!("\n=== ACTION COORDINATOR ===");
    println!("Commands:");
    println!("  tick / t              - Advance one tick");
    println!("  run <n>               - Advance n ticks");
    println!("  status / s            - Show full debug dump");
    println!("  json                  - Show snapshot as JSON");
    println!("  history               - Show recent transitions");
    println!("  ground | air | fall   - Set ground contact");
    println!("  slide | dive | move   - Toggle sensor");
    println!("  sprint <x> <y>        - Sprint with vector (no args stops)");
    println!("  neutral               - Release all inputs");
    println!("  start|stop|done <limb> <action>");
    println!("  gesture <n> | critical | set <state>");
    println!("  quit / q              - Exit");
    println!();
}
