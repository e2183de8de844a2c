use clap::Parser;
use imgdesc::io::load_pixel_buffer;
use imgdesc::{ColorInfo, ExtractConfig, Extractor, GaussianParams, Histogram, ImageData, Metric};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "imgdesc CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
enum MetricConfig {
    CityBlock,
    Euclidean,
    Bhattacharyya,
    Mdpa,
}

impl From<MetricConfig> for Metric {
    fn from(value: MetricConfig) -> Self {
        match value {
            MetricConfig::CityBlock => Metric::CityBlock,
            MetricConfig::Euclidean => Metric::Euclidean,
            MetricConfig::Bhattacharyya => Metric::Bhattacharyya,
            MetricConfig::Mdpa => Metric::Mdpa,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
struct SmoothingJson {
    size: usize,
    sigma: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ExtractConfigJson {
    sobel_threshold: f32,
    top_k: usize,
    parallel: bool,
    min_batch_rows: usize,
    edge_smoothing: Option<SmoothingJson>,
}

impl Default for ExtractConfigJson {
    fn default() -> Self {
        let cfg = ExtractConfig::default();
        Self {
            sobel_threshold: cfg.sobel_threshold,
            top_k: cfg.top_k,
            parallel: cfg.parallel,
            min_batch_rows: cfg.min_batch_rows,
            edge_smoothing: cfg.edge_smoothing.map(|p| SmoothingJson {
                size: p.size,
                sigma: p.sigma,
            }),
        }
    }
}

impl From<&ExtractConfigJson> for ExtractConfig {
    fn from(value: &ExtractConfigJson) -> Self {
        ExtractConfig {
            sobel_threshold: value.sobel_threshold,
            top_k: value.top_k,
            parallel: value.parallel,
            min_batch_rows: value.min_batch_rows,
            edge_smoothing: value.edge_smoothing.map(|s| GaussianParams {
                size: s.size,
                sigma: s.sigma,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    compare_path: Option<String>,
    output_path: Option<String>,
    metrics: Vec<MetricConfig>,
    extract: ExtractConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_path: String::new(),
            compare_path: None,
            output_path: None,
            metrics: vec![MetricConfig::CityBlock],
            extract: ExtractConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ColorRecord {
    color: String,
    ratio: f64,
}

impl From<&ColorInfo> for ColorRecord {
    fn from(value: &ColorInfo) -> Self {
        Self {
            color: format!("#{:08x}", value.color),
            ratio: value.ratio,
        }
    }
}

#[derive(Debug, Serialize)]
struct DescriptorRecord {
    id: String,
    best_colors: Vec<ColorRecord>,
    best_shades: Vec<ColorRecord>,
    histogram: Vec<Vec<f32>>,
    edge_histogram: Vec<Vec<f32>>,
    edge_densities: [f64; 3],
    geometric_moments: [f64; 3],
    second_moment_invariants: [f64; 3],
}

fn channels(hist: &Histogram) -> Vec<Vec<f32>> {
    hist.iter_channels().map(<[f32]>::to_vec).collect()
}

impl From<&ImageData> for DescriptorRecord {
    fn from(value: &ImageData) -> Self {
        Self {
            id: value.id.to_string(),
            best_colors: value.best_colors.iter().map(ColorRecord::from).collect(),
            best_shades: value.best_shades.iter().map(ColorRecord::from).collect(),
            histogram: channels(&value.histogram),
            edge_histogram: channels(&value.edge_histogram),
            edge_densities: value.edge_densities,
            geometric_moments: value.geometric_moments,
            second_moment_invariants: value.moments.second_invariants(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DistanceRecord {
    metric: String,
    color: f64,
    edge: f64,
    shades: f64,
}

#[derive(Debug, Serialize)]
struct Output {
    image: DescriptorRecord,
    compare: Option<DescriptorRecord>,
    distances: Vec<DistanceRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("imgdesc=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }

    let extractor = Extractor::new(ExtractConfig::from(&config.extract))?;
    let image = extractor.extract(&load_pixel_buffer(&config.image_path)?)?;
    let compare = match &config.compare_path {
        Some(path) => Some(extractor.extract(&load_pixel_buffer(path)?)?),
        None => None,
    };

    let mut distances = Vec::new();
    if let Some(other) = &compare {
        for metric in &config.metrics {
            let metric = Metric::from(*metric);
            let d = image.compare(other, metric)?;
            tracing::info!(metric = %metric, color = d.color, edge = d.edge, "compared");
            distances.push(DistanceRecord {
                metric: metric.to_string(),
                color: d.color,
                edge: d.edge,
                shades: d.shades,
            });
        }
    }

    let output = Output {
        image: DescriptorRecord::from(&image),
        compare: compare.as_ref().map(DescriptorRecord::from),
        distances,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
