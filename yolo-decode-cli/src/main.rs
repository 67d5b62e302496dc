use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use yolo_decode::{
    best_detection, Decoder, DecoderConfig, Detection, LabelTable, OwnedTensor, TensorLayout,
};

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode raw YOLO detection output (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for the decode stages.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TensorFormat {
    /// Nested JSON array of rows.
    Json,
    /// Raw little-endian `f32` values.
    F32Le,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum LayoutConfig {
    AttributeMajor,
    AnchorMajor,
}

impl From<LayoutConfig> for TensorLayout {
    fn from(value: LayoutConfig) -> Self {
        match value {
            LayoutConfig::AttributeMajor => TensorLayout::AttributeMajor,
            LayoutConfig::AnchorMajor => TensorLayout::AnchorMajor,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DecoderConfigJson {
    confidence_threshold: f32,
    iou_threshold: f32,
    input_size: u32,
    max_detections: usize,
    num_classes: Option<usize>,
    reject_degenerate: bool,
    parallel: bool,
}

impl Default for DecoderConfigJson {
    fn default() -> Self {
        let cfg = DecoderConfig::default();
        Self {
            confidence_threshold: cfg.confidence_threshold,
            iou_threshold: cfg.iou_threshold,
            input_size: cfg.input_size,
            max_detections: cfg.max_detections,
            num_classes: cfg.num_classes,
            reject_degenerate: cfg.reject_degenerate,
            parallel: cfg.parallel,
        }
    }
}

impl From<DecoderConfigJson> for DecoderConfig {
    fn from(value: DecoderConfigJson) -> Self {
        Self {
            confidence_threshold: value.confidence_threshold,
            iou_threshold: value.iou_threshold,
            input_size: value.input_size,
            max_detections: value.max_detections,
            num_classes: value.num_classes,
            reject_degenerate: value.reject_degenerate,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    tensor_path: String,
    tensor_format: TensorFormat,
    layout: LayoutConfig,
    num_attributes: Option<usize>,
    num_anchors: Option<usize>,
    labels_path: String,
    output_path: Option<String>,
    decoder: DecoderConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tensor_path: String::new(),
            tensor_format: TensorFormat::F32Le,
            layout: LayoutConfig::AttributeMajor,
            num_attributes: None,
            num_anchors: None,
            labels_path: String::new(),
            output_path: None,
            decoder: DecoderConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    label: String,
    class_index: usize,
    confidence: f32,
    timestamp: Option<f32>,
}

impl From<&Detection> for DetectionRecord {
    fn from(value: &Detection) -> Self {
        Self {
            x1: value.x1,
            y1: value.y1,
            x2: value.x2,
            y2: value.y2,
            label: value.label.clone(),
            class_index: value.class_index,
            confidence: value.confidence,
            timestamp: value.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    best: Option<DetectionRecord>,
    detections: Vec<DetectionRecord>,
}

fn read_f32_le(path: &str) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let bytes = fs::read(path)?;
    if bytes.len() % 4 != 0 {
        return Err(format!("{path}: length {} is not a multiple of 4", bytes.len()).into());
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

fn decode_config(
    config: Config,
    decoder: &Decoder,
) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
    match (config.tensor_format, config.layout) {
        (TensorFormat::Json, LayoutConfig::AttributeMajor) => {
            let rows: Vec<Vec<f32>> = serde_json::from_str(&fs::read_to_string(&config.tensor_path)?)?;
            let tensor = OwnedTensor::from_rows(&rows[..])?;
            Ok(decoder.decode(tensor.view())?)
        }
        (TensorFormat::Json, LayoutConfig::AnchorMajor) => {
            let rows: Vec<Vec<f32>> = serde_json::from_str(&fs::read_to_string(&config.tensor_path)?)?;
            Ok(decoder.decode_anchor_rows(&rows[..])?)
        }
        (TensorFormat::F32Le, layout) => {
            let (Some(num_attributes), Some(num_anchors)) =
                (config.num_attributes, config.num_anchors)
            else {
                return Err("num_attributes and num_anchors are required for f32_le tensors".into());
            };
            let data = read_f32_le(&config.tensor_path)?;
            let tensor = OwnedTensor::new(data, num_attributes, num_anchors, layout.into())?;
            Ok(decoder.decode(tensor.view())?)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("yolo_decode=debug".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let mut config: Config = serde_json::from_str(&config_text)?;
    if config.tensor_path.is_empty() || config.labels_path.is_empty() {
        return Err("tensor_path and labels_path must be set in the config".into());
    }

    let labels = LabelTable::load(&config.labels_path)?;
    tracing::info!(labels = labels.len(), path = %config.labels_path, "loaded labels");

    let decoder_cfg = DecoderConfig::from(std::mem::take(&mut config.decoder));
    decoder_cfg.validate()?;
    let decoder = Decoder::new(labels).with_config(decoder_cfg);

    let output_path = config.output_path.take();
    let detections = decode_config(config, &decoder)?;
    tracing::info!(count = detections.len(), "decoded detections");

    let best = best_detection(&detections).map(DetectionRecord::from);
    let detections = detections.iter().map(DetectionRecord::from).collect();
    let output = Output { best, detections };
    let json = serde_json::to_string_pretty(&output)?;

    match output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
