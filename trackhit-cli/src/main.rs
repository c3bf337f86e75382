//! trackhit CLI
//!
//! Inspects, converts and resamples simulated hit point files.
#![allow(clippy::uninlined_format_args, clippy::too_many_lines)]

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use trackhit_core::{
    count_usable, resample_planes, DetectorHitPar, DetectorHitPoint, ParamList,
    ParameterContainer, TrackCrossing, TrackSample,
};
use trackhit_io::{read_points_json, AnalysisConfig, PointFileReader, PointFileWriter};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    TrackhitIo(#[from] trackhit_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] trackhit_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Schema-versioned binary point file
    Binary,
    /// JSON array of points
    Json,
    /// CSV table, one column per field
    Csv,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Binary,
        }
    }
}

/// Simulated detector hit point tools.
#[derive(Parser)]
#[command(name = "trackhit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a point file
    Info {
        /// Input point file (binary or .json)
        input: PathBuf,
    },

    /// Resample tracks at z planes
    Resample {
        /// Input point file (binary or .json)
        input: PathBuf,

        /// Plane to sample at (cm); may be repeated
        #[arg(long = "z")]
        z: Vec<f64>,

        /// Analysis configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output JSON file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert between binary, JSON and CSV
    Convert {
        /// Input point file (binary or .json)
        input: PathBuf,

        /// Output file path
        output: PathBuf,

        /// Output format (guessed from the extension if omitted)
        #[arg(short, long, value_enum)]
        format: Option<Format>,
    },

    /// Load hit parameters from a JSON parameter list and print them
    Params {
        /// Parameter list (JSON object of name to value)
        input: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct PlaneSamples {
    z: f64,
    samples: Vec<TrackSample>,
}

/// Points of a file, with the schema version for binary files.
fn load_points(path: &Path) -> Result<(Vec<DetectorHitPoint>, Option<u16>)> {
    if Format::from_path(path) == Format::Json {
        return Ok((read_points_json(path)?, None));
    }
    let reader = PointFileReader::open(path)?;
    log::debug!(
        "{}: schema v{}, {} records",
        path.display(),
        reader.schema_version(),
        reader.len()
    );
    Ok((reader.read_points()?, Some(reader.schema_version())))
}

fn read_points(path: &Path) -> Result<Vec<DetectorHitPoint>> {
    Ok(load_points(path)?.0)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Info { input } => {
            let (points, version) = load_points(&input)?;
            let config = AnalysisConfig::default();
            let usable = count_usable(&points, &config.usability);

            println!("File: {}", input.display());
            if let Some(version) = version {
                println!("Schema version: {}", version);
            }
            println!("Points: {}", points.len());
            println!("Usable: {}", usable);

            if !points.is_empty() {
                let (z_min, z_max) = points.iter().fold(
                    (f64::INFINITY, f64::NEG_INFINITY),
                    |(lo, hi), p| {
                        (lo.min(p.z_in()).min(p.z_out()), hi.max(p.z_in()).max(p.z_out()))
                    },
                );
                let light_yield: f64 = points.iter().map(DetectorHitPoint::light_yield).sum();
                println!("Z range: {:.4} - {:.4} cm", z_min, z_max);
                println!("Total light yield: {:.4}", light_yield);
            }
        }

        Commands::Resample {
            input,
            z,
            config,
            output,
        } => {
            let mut analysis = match config {
                Some(path) => AnalysisConfig::from_file(path)?,
                None => AnalysisConfig::default(),
            };
            if !z.is_empty() {
                analysis.z_planes = z;
                analysis.validate()?;
            }

            let start = Instant::now();
            let points = read_points(&input)?;
            let samples = resample_planes(&points, &analysis.z_planes, &analysis.usability);
            log::info!(
                "resampled {} points at {} planes in {:.2?}",
                points.len(),
                analysis.z_planes.len(),
                start.elapsed()
            );

            let planes: Vec<PlaneSamples> = analysis
                .z_planes
                .iter()
                .zip(samples)
                .map(|(&z, samples)| PlaneSamples { z, samples })
                .collect();

            match output {
                Some(path) => {
                    let mut writer = BufWriter::new(File::create(&path)?);
                    serde_json::to_writer_pretty(&mut writer, &planes)?;
                    writer.flush()?;
                    log::info!("wrote {}", path.display());
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut handle = stdout.lock();
                    serde_json::to_writer_pretty(&mut handle, &planes)?;
                    writeln!(handle)?;
                }
            }
        }

        Commands::Convert {
            input,
            output,
            format,
        } => {
            let points = read_points(&input)?;
            let format = format.unwrap_or_else(|| Format::from_path(&output));
            let mut writer = PointFileWriter::create(&output)?;
            match format {
                Format::Binary => writer.write_points(&points)?,
                Format::Json => writer.write_points_json(&points)?,
                Format::Csv => writer.write_points_csv(&points)?,
            }
            println!(
                "Converted {} points to {} ({:?})",
                points.len(),
                output.display(),
                format
            );
        }

        Commands::Params { input } => {
            let list: Option<ParamList> = match input {
                Some(path) => {
                    let reader = BufReader::new(File::open(path)?);
                    Some(serde_json::from_reader(reader)?)
                }
                None => None,
            };

            let mut par = DetectorHitPar::default();
            par.load(list.as_ref())?;
            par.print();
            println!(
                "{}: status={} entries={}",
                par.info().name,
                par.info().status,
                list.as_ref().map_or(0, ParamList::len)
            );
            if let Some(list) = &list {
                for (name, value) in list.iter() {
                    println!("  {} = {:?}", name, value);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::Builder;
    use trackhit_core::Vec3;

    fn sample_points() -> Vec<DetectorHitPoint> {
        vec![DetectorHitPoint::new(
            1,
            2,
            3,
            6.0,
            12.0,
            Vec3::zero(),
            Vec3::new(2.0, 4.0, 10.0),
            Vec3::zero(),
            Vec3::zero(),
            0.0,
            0.0,
            0.0,
            50.0,
        )]
    }

    #[test]
    fn test_load_points_binary_reports_version() {
        let file = Builder::new().suffix(".thp").tempfile().unwrap();
        PointFileWriter::create(file.path())
            .unwrap()
            .write_points(&sample_points())
            .unwrap();

        let (points, version) = load_points(file.path()).unwrap();
        assert_eq!(version, Some(2));
        assert_eq!(points, sample_points());
    }

    #[test]
    fn test_load_points_json_has_no_version() {
        let file = Builder::new().suffix(".json").tempfile().unwrap();
        PointFileWriter::create(file.path())
            .unwrap()
            .write_points_json(&sample_points())
            .unwrap();

        let (points, version) = load_points(file.path()).unwrap();
        assert_eq!(version, None);
        assert_eq!(points.len(), 1);
        assert_eq!(read_points(file.path()).unwrap(), points);
    }
}
