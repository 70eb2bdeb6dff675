// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Routersim CLI

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use routersim::geometry::analyze;
use routersim::motion::Command;
use routersim::{io, Simulator, SimulatorConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "routersim")]
#[command(about = "CNC router toolpath simulator with exact material removal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a toolpath against the stock and export the result
    Simulate {
        /// Toolpath file
        input: PathBuf,

        /// Stock mesh output (.stl, .glb, .gltf; other extensions give ASCII STL)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the configured feed rate
        #[arg(long)]
        feed_rate: Option<f64>,

        /// Configuration file (defaults to ./routersim.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Give up after this many ticks
        #[arg(long, default_value = "10000000")]
        max_ticks: u64,
    },

    /// Parse a toolpath and print its waypoints as JSON
    Parse {
        /// Toolpath file
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize a toolpath without simulating it
    Stats {
        /// Toolpath file
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    routersim::init_logging(level)?;

    match cli.command {
        Commands::Simulate {
            input,
            output,
            feed_rate,
            config,
            max_ticks,
        } => simulate_command(&input, output.as_deref(), feed_rate, config.as_deref(), max_ticks),
        Commands::Parse { input, output } => parse_command(&input, output.as_deref()),
        Commands::Stats { input } => stats_command(&input),
        Commands::Version => {
            println!("Routersim v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn simulate_command(
    input: &Path,
    output: Option<&Path>,
    feed_rate: Option<f64>,
    config: Option<&Path>,
    max_ticks: u64,
) -> Result<()> {
    let mut config = match config {
        Some(path) => SimulatorConfig::from_file(path)?,
        None => SimulatorConfig::load()?,
    };
    if let Some(feed_rate) = feed_rate {
        config.feed_rate = feed_rate;
    }

    let path = io::import_toolpath_file(input)?;
    let segments = path.segment_count() as u64;

    let mut simulator = Simulator::new(config)?;
    simulator.submit(Command::LoadPath(path))?;

    let progress = ProgressBar::new(segments);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let summary = simulator.run_with(max_ticks, |report| {
        if report.fraction >= 1.0 {
            progress.inc(1);
        }
    });
    progress.finish_and_clear();
    let elapsed = start.elapsed();

    println!("{}", "Simulation Summary".bold());
    println!("  {} {}", "Ticks:".bright_black(), summary.ticks.to_string().cyan());
    println!(
        "  {} {} ({} cutting)",
        "Segments:".bright_black(),
        summary.segments.to_string().cyan(),
        summary.cutting_segments
    );
    println!(
        "  {} {:.3}",
        "Removed volume:".bright_black(),
        summary.removed_volume
    );
    println!("  {} {}", "Stock polygons:".bright_black(), summary.polygon_count);
    println!("  {} {:.2?}", "Wall time:".bright_black(), elapsed);

    if !summary.finished {
        println!(
            "  {} stopped after {} ticks before the path finished",
            "Warning:".yellow(),
            max_ticks
        );
    }

    if let Some(output) = output {
        export_stock(simulator.stock().mesh(), output)?;
        println!("  {} {}", "Output:".bright_black(), output.display().to_string().green());
    }

    Ok(())
}

fn export_stock(mesh: &routersim::Mesh, output: &Path) -> Result<()> {
    let extension = output
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("glb") | Some("gltf") => io::export_gltf(mesh, output),
        _ => io::export_stl(mesh, output),
    }
}

fn parse_command(input: &Path, output: Option<&Path>) -> Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let path = io::import_toolpath_file(input)?;
    let json = serde_json::to_string_pretty(&path)?;

    match output {
        Some(output) => {
            std::fs::write(output, json)?;
            tracing::info!(output = %output.display(), "waypoints written");
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn stats_command(input: &Path) -> Result<()> {
    let path = io::import_toolpath_file(input)?;
    let bounds = path.bounds();
    let cutting = path.segments().filter(|s| s.is_cutting()).count();
    let total_length: f64 = path.segments().map(|s| s.length()).sum();

    println!("{}", input.display().to_string().bold());
    println!("  {} {}", "Waypoints:".bright_black(), path.len().to_string().cyan());
    println!(
        "  {} {} ({} cutting)",
        "Segments:".bright_black(),
        path.segment_count().to_string().cyan(),
        cutting
    );
    println!("  {} {:.3}", "Travel length:".bright_black(), total_length);
    println!("  {} {:.3}", "Cutting length:".bright_black(), path.cutting_length());
    println!(
        "  {} [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
        "Bounds:".bright_black(),
        bounds.min.x,
        bounds.min.y,
        bounds.min.z,
        bounds.max.x,
        bounds.max.y,
        bounds.max.z
    );

    let config = SimulatorConfig::load()?;
    let stock = routersim::StockModel::new(&config);
    let stock_stats = analyze(stock.mesh());
    println!(
        "  {} {:.1} x {:.1} x {:.1}",
        "Stock:".bright_black(),
        stock_stats.bbox.size().x,
        stock_stats.bbox.size().y,
        stock_stats.bbox.size().z
    );
    let sheet = stock.bounds();
    let overlaps_sheet = bounds.min.x < sheet.max.x
        && sheet.min.x < bounds.max.x
        && bounds.min.y < sheet.max.y
        && sheet.min.y < bounds.max.y;
    if !overlaps_sheet {
        println!("  {} toolpath never reaches the stock", "Warning:".yellow());
    }

    Ok(())
}
