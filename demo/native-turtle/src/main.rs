// tortuga/demo/native-turtle/src/main.rs
//
// Copyright © 2026 The Tortuga Project Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Plays a turtle script and reports what it drew.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tortuga::config::SizeSetting;
use tortuga::{script, Screen, TurtleConfig};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "turtle-demo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Plays a turtle script on a recording surface", long_about = None)]
struct Cli {
    /// Script to play
    script: PathBuf,

    /// TOML file with screen and turtle defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Turtle speed, 0 (no animation) to 10
    #[arg(short, long)]
    speed: Option<f64>,

    /// Surface width in pixels
    #[arg(long)]
    width: Option<f64>,

    /// Surface height in pixels
    #[arg(long)]
    height: Option<f64>,

    /// Write the display list as JSON
    #[arg(long)]
    dump_json: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> Result<TurtleConfig> {
    let mut config = match &cli.config {
        Some(path) => TurtleConfig::load(path)?,
        None => TurtleConfig::default(),
    };
    if let Some(speed) = cli.speed {
        config.speed = speed;
    }
    if let Some(width) = cli.width {
        config.width = SizeSetting::Pixels(width);
    }
    if let Some(height) = cli.height {
        config.height = SizeSetting::Pixels(height);
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = load_config(&cli)?;
    let source = fs::read_to_string(&cli.script)
        .with_context(|| format!("reading {}", cli.script.display()))?;
    let program = uturtle::parse(&source).map_err(|err| anyhow!("{}: {}", cli.script.display(), err))?;

    let (screen, surface) = Screen::recording(config)?;
    let turtle = screen.turtle()?;
    let run = script::run(&turtle, &program).await;

    for failure in &run.failures {
        warn!("command {} ({}) failed: {}", failure.index, failure.command, failure.error);
    }
    if !run.flags.is_empty() {
        warn!("script finished with errors: {}", run.flags);
    }

    let mut kinds = BTreeMap::new();
    for item in surface.items() {
        *kinds.entry(item.kind()).or_insert(0usize) += 1;
    }
    let position = turtle.position().await?;
    let heading = turtle.heading().await?;
    info!(
        commands = run.commands,
        failures = run.failures.len(),
        "played {}",
        cli.script.display()
    );
    for (kind, count) in &kinds {
        info!("{:>8} {}", count, kind);
    }
    info!("turtle at ({:.2}, {:.2}) heading {:.2}", position.x, position.y, heading);

    if let Some(path) = &cli.dump_json {
        let json = serde_json::to_string_pretty(&surface.snapshot())?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!("display list written to {}", path.display());
    }

    screen.bye();
    Ok(())
}
