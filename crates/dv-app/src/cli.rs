//! Command line definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "designview",
    version,
    about = "Explore multi-parameter design data through parallel coordinates filters"
)]
pub struct Cli {
    /// Preferences file (JSON); defaults are used when absent
    #[arg(long, global = true)]
    pub preferences: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the parameters of a data file
    Inspect {
        file: PathBuf,
    },

    /// Import a data file, filter it and print the designs that remain
    Filter {
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Save the resulting session to this file
        #[arg(long)]
        save_session: Option<PathBuf>,
    },

    /// Re-read the data behind a saved session and bring its charts up to date
    Update {
        session: PathBuf,
        file: PathBuf,

        /// Where to write the updated session; defaults to overwriting it
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the designs shown by the charts of a saved session
    Show {
        session: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Axis adjustments applied before printing
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Numeric filter window, e.g. `speed=2:8`
    #[arg(long = "range", value_parser = parse_range)]
    pub ranges: Vec<RangeSpec>,

    /// Keep the designs outside the window of this parameter instead
    #[arg(long = "invert")]
    pub inverted: Vec<String>,

    /// Ignore this parameter's filter
    #[arg(long = "inactive")]
    pub inactive: Vec<String>,

    /// Categories to keep on a discrete parameter, e.g. `mode=low,high`
    #[arg(long = "select", value_parser = parse_selection)]
    pub selections: Vec<SelectionSpec>,

    /// Move a parameter's axis to a position, e.g. `mode=0`
    #[arg(long = "move", value_parser = parse_move)]
    pub moves: Vec<MoveSpec>,

    /// Print designs as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec {
    pub parameter: String,
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSpec {
    pub parameter: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveSpec {
    pub parameter: String,
    pub position: usize,
}

fn split_assignment(text: &str) -> Result<(&str, &str), String> {
    match text.rsplit_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", text)),
    }
}

fn parse_range(text: &str) -> Result<RangeSpec, String> {
    let (name, window) = split_assignment(text)?;
    let (low, high) = window
        .split_once(':')
        .ok_or_else(|| format!("expected LOW:HIGH, got '{}'", window))?;
    let bound = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid bound '{}': {}", s, e))
    };
    Ok(RangeSpec {
        parameter: name.to_string(),
        low: bound(low)?,
        high: bound(high)?,
    })
}

fn parse_selection(text: &str) -> Result<SelectionSpec, String> {
    let (name, list) = split_assignment(text)?;
    Ok(SelectionSpec {
        parameter: name.to_string(),
        categories: list
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

fn parse_move(text: &str) -> Result<MoveSpec, String> {
    let (name, position) = split_assignment(text)?;
    Ok(MoveSpec {
        parameter: name.to_string(),
        position: position
            .parse()
            .map_err(|e| format!("invalid position '{}': {}", position, e))?,
    })
}
