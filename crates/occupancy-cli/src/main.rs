//! `occupancy` CLI: evaluate resource chart documents from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Per-day schedule of every resource (stdin → stdout)
//! cat chart.json | occupancy schedule
//!
//! # Schedule of the second resource, written to a file
//! occupancy schedule -i chart.json --resource 1 -o schedule.json
//!
//! # Conflicts over the full data range, one per line
//! occupancy conflicts -i chart.json --format text
//!
//! # Pixel layout of a two-week window
//! occupancy layout -i chart.json --from 2026-03-02 --to 2026-03-15 --width 1400
//!
//! # Summary counts
//! occupancy stats -i chart.json
//! ```

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use occupancy_engine::day::{date_of_day, day_index, parse_instant_str, DayIndex};
use occupancy_engine::{ChartDocument, Conflict, DayCapacity, Resource, ResourceChart};
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "occupancy",
    version,
    about = "Resource occupancy and over-allocation CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the per-day schedule of each resource as JSON
    Schedule {
        /// Input chart document (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Only this resource row
        #[arg(long)]
        resource: Option<usize>,
    },
    /// List over-allocated periods
    Conflicts {
        /// Input chart document (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// First day of the window (defaults to the start of the data)
        #[arg(long)]
        from: Option<String>,
        /// Last day of the window (defaults to the end of the data)
        #[arg(long)]
        to: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Lay out a window into pixel rectangles
    Layout {
        /// Input chart document (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// First day of the window
        #[arg(long)]
        from: String,
        /// Last day of the window
        #[arg(long)]
        to: String,
        /// Width of the plot in pixels
        #[arg(long, default_value_t = 1000.0)]
        width: f64,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show resource, activity and conflict counts
    Stats {
        /// Input chart document (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Schedule {
            input,
            output,
            resource,
        } => {
            let mut chart = load_chart(input.as_deref())?;
            chart.calculate();

            let rows: Vec<Value> = match resource {
                Some(index) => {
                    let row = chart.resource(index).with_context(|| {
                        format!(
                            "Resource {} does not exist (chart has {})",
                            index,
                            chart.len()
                        )
                    })?;
                    vec![schedule_json(&chart, row)]
                }
                None => chart
                    .resources()
                    .iter()
                    .map(|row| schedule_json(&chart, row))
                    .collect(),
            };

            let pretty = serde_json::to_string_pretty(&rows)?;
            write_output(output.as_deref(), &pretty)?;
        }
        Commands::Conflicts {
            input,
            from,
            to,
            format,
        } => {
            let from = from.as_deref().map(parse_date_arg).transpose()?;
            let to = to.as_deref().map(parse_date_arg).transpose()?;
            let mut chart = load_chart(input.as_deref())?;
            let window = match (from, to) {
                (Some(from), Some(to)) => Some((from, to)),
                (from, to) => chart
                    .data_range()
                    .map(|(start, end)| (from.unwrap_or(start), to.unwrap_or(end))),
            };

            let conflicts = match window {
                Some((from, to)) => chart.conflicts(from, to),
                None => Vec::new(),
            };
            info!(count = conflicts.len(), "conflicts found");

            match format {
                Format::Json => {
                    let pretty = serde_json::to_string_pretty(&conflicts)?;
                    println!("{}", pretty);
                }
                Format::Text => {
                    for conflict in &conflicts {
                        println!("{}", conflict_line(&chart, conflict));
                    }
                }
            }
        }
        Commands::Layout {
            input,
            from,
            to,
            width,
            output,
        } => {
            if !width.is_finite() || width <= 0.0 {
                anyhow::bail!("Width must be a positive number, got {}", width);
            }
            let from = parse_date_arg(&from)?;
            let to = parse_date_arg(&to)?;
            if to < from {
                anyhow::bail!("--to must not be before --from");
            }

            let mut chart = load_chart(input.as_deref())?;
            let frame = chart.render(from, to, width);
            let pretty = serde_json::to_string_pretty(&frame)?;
            write_output(output.as_deref(), &pretty)?;
        }
        Commands::Stats { input } => {
            let mut chart = load_chart(input.as_deref())?;
            let max_occupation = chart.max_occupation();
            let activities: usize = chart
                .resources()
                .iter()
                .map(Resource::activities_count)
                .sum();
            let conflicting = chart.resources().iter().filter(|r| r.has_conflicts()).count();

            println!("Resources:      {}", chart.len());
            println!("Activities:     {}", activities);
            println!("Max occupation: {} min", max_occupation);
            println!("Conflicting:    {}", conflicting);
        }
    }

    Ok(())
}

fn load_chart(path: Option<&str>) -> Result<ResourceChart> {
    let json = read_input(path)?;
    let document = ChartDocument::from_json(&json).context("Failed to parse chart document")?;
    debug!(resources = document.resources.len(), "chart document loaded");
    document
        .into_chart()
        .context("Failed to build chart from document")
}

/// Parse a `--from`/`--to` argument: a date, a datetime or epoch milliseconds.
fn parse_date_arg(raw: &str) -> Result<i64> {
    parse_instant_str(raw).with_context(|| {
        format!(
            "Invalid date '{}': expected YYYY-MM-DD, RFC 3339 or epoch milliseconds",
            raw
        )
    })
}

fn format_day(day: DayIndex) -> String {
    date_of_day(day)
        .map(|date| date.to_string())
        .unwrap_or_else(|| day.to_string())
}

fn schedule_json(chart: &ResourceChart, resource: &Resource) -> Value {
    let days: Vec<Value> = resource
        .schedule()
        .iter()
        .map(|(day, allocation)| {
            let (state, vacant) = match &allocation.capacity {
                DayCapacity::Unavailable => ("unavailable", 0.0),
                DayCapacity::Available { vacant, .. } => ("available", *vacant),
            };
            let activities: Vec<Value> = allocation
                .activities()
                .unwrap_or(&[])
                .iter()
                .map(|&index| match resource.activity(index).and_then(|a| a.name()) {
                    Some(name) => json!(name),
                    None => json!(index),
                })
                .collect();
            json!({
                "date": format_day(day),
                "state": state,
                "vacant": vacant,
                "allocated": allocation.allocated,
                "bottom": allocation.bottom,
                "activities": activities,
            })
        })
        .collect();

    json!({
        "resource": resource.index(),
        "name": chart.resource_name(resource.index()),
        "maxOccupation": resource.outcome().max_occupation,
        "hasConflicts": resource.has_conflicts(),
        "days": days,
    })
}

/// `Alice  2026-03-02..2026-03-03  2h (25%)`, last day inclusive.
fn conflict_line(chart: &ResourceChart, conflict: &Conflict) -> String {
    let name = chart
        .resource_name(conflict.resource)
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", conflict.resource));
    let first = day_index(conflict.start);
    let last = day_index(conflict.end) - 1;
    format!(
        "{}  {}..{}  {}",
        name,
        format_day(first),
        format_day(last),
        conflict.text
    )
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
