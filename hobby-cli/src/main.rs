//! `hobby` — print the Bezier control points of Hobby's curve through a
//! list of points.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use hobby_curve::{Curve, CurveOptions, Point};

#[derive(Parser)]
#[command(version, about = "Smooth Hobby curves through a list of points")]
struct Cli {
    /// Points file: a JSON array of {"x", "y"} objects or [x, y] pairs, or
    /// whitespace separated "x,y" pairs. Reads stdin when neither a file nor
    /// --points is given
    file: Option<PathBuf>,

    /// Points given inline, e.g. "0,0 10,10 20,0"
    #[arg(short, long, conflicts_with = "file")]
    points: Option<String>,

    /// Tension applied to every knot; must be greater than 1/3
    #[arg(short, long, default_value_t = 1.0)]
    tension: f64,

    /// Close the curve back onto its first point
    #[arg(short, long)]
    cyclic: bool,

    /// Output format: "path" (default) or "json"
    #[arg(short, long, default_value = "path", value_parser = parse_format)]
    format: OutputFormat,

    /// Decimal places in path output
    #[arg(long, default_value_t = 4)]
    precision: usize,

    /// Log solver decisions to stderr (-v for a summary, -vv per knot)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Path,
    Json,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "path" => Ok(OutputFormat::Path),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!(
            "unknown output format \"{s}\": expected \"path\" or \"json\""
        )),
    }
}

/// A point as written in JSON input.
#[derive(Deserialize)]
#[serde(untagged)]
enum PointInput {
    Object { x: f64, y: f64 },
    Pair([f64; 2]),
}

impl From<PointInput> for Point {
    fn from(p: PointInput) -> Self {
        match p {
            PointInput::Object { x, y } | PointInput::Pair([x, y]) => Self::new(x, y),
        }
    }
}

/// Parse a JSON array of points, or whitespace separated "x,y" pairs.
fn parse_points(text: &str) -> Result<Vec<Point>> {
    if text.trim_start().starts_with('[') {
        let points: Vec<PointInput> =
            serde_json::from_str(text).context("invalid JSON point list")?;
        return Ok(points.into_iter().map(Point::from).collect());
    }

    text.split_whitespace()
        .enumerate()
        .map(|(i, token)| {
            parse_pair(token).with_context(|| format!("point {}: cannot read \"{token}\"", i + 1))
        })
        .collect()
}

fn parse_pair(token: &str) -> Result<Point> {
    let Some((x, y)) = token.split_once(',') else {
        bail!("expected \"x,y\"");
    };
    let x: f64 = x.parse().context("bad x coordinate")?;
    let y: f64 = y.parse().context("bad y coordinate")?;
    Ok(Point::new(x, y))
}

fn read_input(cli: &Cli) -> Result<String> {
    if let Some(points) = &cli.points {
        return Ok(points.clone());
    }
    if let Some(file) = &cli.file {
        return fs::read_to_string(file)
            .with_context(|| format!("cannot read {}", file.display()));
    }
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("cannot read points from stdin")?;
    Ok(text)
}

fn run(cli: &Cli) -> Result<String> {
    let points = parse_points(&read_input(cli)?)?;
    debug!(count = points.len(), "read points");

    let options = CurveOptions::new(cli.tension, cli.cyclic);
    let curve = Curve::through(&points, &options).context("cannot build curve")?;
    info!(
        segments = curve.len(),
        cyclic = curve.cyclic,
        "curve built"
    );

    match cli.format {
        OutputFormat::Path => Ok(curve.to_path_data(Some(cli.precision))),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&curve).context("cannot serialize curve")
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hobby={level},hobby_curve={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}
