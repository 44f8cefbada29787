//! statechart - terminal digital watch
//!
//! A digital watch driven by the hierarchical state machine engine.
//! Arrow keys steer the watch; the engine decides which mode handles them.

mod clock;
mod display;
mod input;
mod states;

use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use states::{WatchEvent, WatchStateId};

#[derive(Parser)]
#[command(name = "statechart")]
#[command(about = "Terminal digital watch driven by a hierarchical state machine")]
#[command(version)]
struct Cli {
    /// Milliseconds between display ticks
    #[arg(long, default_value_t = 50)]
    tick_ms: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; keep it quiet by default so the single-line
    // display stays intact.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    println!("{}", "   Digital Watch   ".bold());
    println!("Use arrow keys to control.");
    println!(" {}: display current time", "ti".cyan());
    println!(" {}: set time", "st".cyan());
    println!();
    println!("Left arrow at the line start (or 'q') quits.");
    println!();

    let mut watch = states::build_watch()?;
    watch.set_start_state(WatchStateId::ShowTime)?;

    let raw = input::RawMode::enable()?;
    while watch.is_running() {
        if let Some(event) = input::poll_key(Duration::from_millis(cli.tick_ms))? {
            watch.post_event(event)?;
        }
        if watch.is_running() {
            watch.post_event(WatchEvent::Tick)?;
        }
    }
    drop(raw);
    println!("\r");

    Ok(())
}
