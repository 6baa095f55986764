// SPDX-License-Identifier: MIT
//! MERFISH bounding-box CLI
//!
//! Thin wrapper around the library: loads configuration, runs the pipeline
//! and prints the report. Logs go to stderr so stdout carries only results.

use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use merfish_bbox::descriptor::read_descriptor;
use merfish_bbox::layout::{self, RECORD_FIELDS};
use merfish_bbox::{check_layout, decode_header, pipeline, report, Config, NanPolicy, OutputFormat};

#[derive(Parser)]
#[command(name = "merfish-bbox")]
#[command(about = "Bounding box of MERFISH barcode positions", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. "info", "merfish_bbox=debug")
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the bounding box of all record positions
    Bbox {
        /// Input file (default: config `input`, then "a.bin")
        file: Option<PathBuf>,
        /// Worker threads: 1 = sequential, 0 = one per core
        #[arg(short, long)]
        threads: Option<usize>,
        /// How to treat NaN positions
        #[arg(long, value_enum)]
        nan_policy: Option<NanPolicy>,
        /// Fail unless the file length matches the header exactly
        #[arg(long)]
        check_file_size: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the header and the reserved-region layout descriptor
    Inspect {
        /// Input file (default: config `input`, then "a.bin")
        file: Option<PathBuf>,
    },
    /// Print the static record layout
    Layout,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    init_tracing(&config.log_level);

    check_layout().context("Record layout self-check failed")?;

    match cli.command {
        Commands::Bbox {
            file,
            threads,
            nan_policy,
            check_file_size,
            json,
        } => {
            if let Some(file) = file {
                config.input = file;
            }
            if let Some(threads) = threads {
                config.threads = threads;
            }
            if let Some(policy) = nan_policy {
                config.nan_policy = policy;
            }
            config.check_file_size |= check_file_size;
            if json {
                config.output = OutputFormat::Json;
            }
            run_bbox(&config)?
        }
        Commands::Inspect { file } => {
            let path = file.unwrap_or_else(|| config.input.clone());
            inspect(&path)?
        }
        Commands::Layout => print_layout(),
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run_bbox(config: &Config) -> Result<()> {
    let summary = pipeline::run(config)
        .with_context(|| format!("Failed to compute bounding box of {:?}", config.input))?;
    let rendered = report::render(&summary, config.output).context("Failed to render report")?;
    print!("{}", rendered);
    if config.output == OutputFormat::Json {
        println!();
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let file = pipeline::open(path)?;
    let file_len = file
        .metadata()
        .with_context(|| format!("Failed to stat {:?}", path))?
        .len();
    let mut reader = BufReader::new(file);
    let header =
        decode_header(&mut reader).with_context(|| format!("Invalid header in {:?}", path))?;

    println!("version = {}", header.version);
    println!("num_entries = {}", header.num_entries);
    println!("header_reserved_length = {}", header.header_reserved_length);
    println!("data_offset = {}", header.data_offset);
    println!(
        "file_size = {} (header implies {})",
        file_len,
        header.expected_file_len()
    );

    match read_descriptor(&mut reader, &header) {
        Ok(descriptor) if descriptor.fields.is_empty() => println!("descriptor = <empty>"),
        Ok(descriptor) => {
            println!(
                "descriptor = {} fields, {} bytes per record, matches layout: {}",
                descriptor.fields.len(),
                descriptor.record_size(),
                descriptor.matches_layout(RECORD_FIELDS)
            );
            for field in &descriptor.fields {
                println!("  {:<24} {:>3} x {}", field.name, field.count, field.ty.name());
            }
        }
        Err(e) => println!("descriptor = <unreadable: {}>", e),
    }

    Ok(())
}

fn print_layout() {
    println!("{:>6}  {:>5}  field", "offset", "width");
    for (offset, field) in layout::field_offsets() {
        let label = if field.count > 1 {
            format!("{}[{}]", field.name, field.count)
        } else {
            field.name.to_string()
        };
        println!("{:>6}  {:>5}  {} {}", offset, field.width(), field.ty.name(), label);
    }
    println!("total = {} bytes", layout::RECORD_SIZE);
}
