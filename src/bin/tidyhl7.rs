//! tidyhl7 CLI - extract and tidy location-addressed values from HL7v2 batch files
//!
//! Reads a batch file (one or more messages, each starting with an MSH line)
//! and writes extracted values, message IDs or joined long tables as JSON.

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use tidyhl7::{
    extract_all, read_messages, resolve_message_ids, write_table, NdjsonWriter, OutputFormat,
    Pipeline, PipelineConfig, TidyError,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tidyhl7")]
#[command(version, about = "Tidy tables from HL7v2-style message batches", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one location from every message (one NDJSON line per message)
    Extract {
        /// Location such as AL1.3.2
        #[arg(short, long)]
        location: String,

        /// Batch file of messages
        input: PathBuf,
    },

    /// Resolve the message ID of every message
    Ids {
        /// Identity location, repeat for composite IDs
        #[arg(short = 'l', long = "id-location", required = true)]
        id_locations: Vec<String>,

        /// Batch file of messages
        input: PathBuf,
    },

    /// Run the full pipeline from a YAML config and write the joined table
    Tidy {
        /// Path to pipeline config (id_locations, data_locations)
        #[arg(short, long, default_value = "pipeline.yaml")]
        config: PathBuf,

        /// Output format (ndjson, json)
        #[arg(short, long, default_value = "ndjson")]
        format: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Batch file of messages
        input: PathBuf,
    },

    /// Validate a pipeline config without reading messages
    Validate {
        /// Path to pipeline config
        #[arg(short, long, default_value = "pipeline.yaml")]
        config: PathBuf,
    },
}

fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract { location, input } => extract(&location, input),
        Commands::Ids { id_locations, input } => ids(&id_locations, input),
        Commands::Tidy { config, format, output, input } => tidy(config, &format, output, input),
        Commands::Validate { config } => validate(config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn extract(location: &str, input: PathBuf) -> Result<(), TidyError> {
    let messages = read_messages(&input)?;
    let values = extract_all(location, &messages)?;

    let mut out = NdjsonWriter::new(io::stdout().lock());
    for (index, values) in values.iter().enumerate() {
        out.write(&serde_json::json!({
            "message": index,
            "location": location,
            "values": values,
        }))?;
    }
    out.flush()
}

fn ids(id_locations: &[String], input: PathBuf) -> Result<(), TidyError> {
    let messages = read_messages(&input)?;
    let ids = resolve_message_ids(id_locations, &messages)?;

    let mut out = io::stdout().lock();
    for id in ids {
        writeln!(out, "{}", id)?;
    }
    out.flush()?;
    Ok(())
}

fn tidy(
    config: PathBuf,
    format: &str,
    output: Option<PathBuf>,
    input: PathBuf,
) -> Result<(), TidyError> {
    let format: OutputFormat = format.parse()?;
    let pipeline = Pipeline::new(PipelineConfig::load_from_file(&config)?)?;

    let messages = read_messages(&input)?;
    let table = pipeline.run(&messages)?;

    match output {
        Some(path) => {
            let file = File::create(&path)
                .map_err(|e| TidyError::Io(format!("Failed to create {}: {}", path.display(), e)))?;
            write_table(&table, format, BufWriter::new(file))?;
            tracing::info!("Wrote {} rows to {} as {}", table.len(), path.display(), format);
        }
        None => write_table(&table, format, io::stdout().lock())?,
    }

    Ok(())
}

fn validate(config: PathBuf) -> Result<(), TidyError> {
    let config = PipelineConfig::load_from_file(&config)?;

    println!("✓ {} identity locations", config.id_locations.len());
    println!("✓ {} data locations", config.data_locations.len());
    let segments: Vec<String> = config.data_segments()?.into_iter().collect();
    println!("  Data segments: {}", segments.join(", "));

    Ok(())
}
