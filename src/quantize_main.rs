//! Batch quantization of a collection's embeddings.
//!
//! ```bash
//! quantize_embeddings --input standards_embedded.json --output standards_q8.json
//! quantize_embeddings -i exams.json -o exams_q8.json --scheme fixed --field vector
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;

use audit_rag::rag::{quantize_collection, VectorCodec};

/// Replace float embeddings in a JSON array of records with int8 codes.
#[derive(Parser)]
#[command(name = "quantize_embeddings", version, about)]
struct Cli {
    /// JSON file holding an array of records
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the quantized records
    #[arg(short, long)]
    output: PathBuf,

    /// Quantization scheme: `adaptive` (per-vector min/max) or `fixed` (symmetric [-1, 1])
    #[arg(long, default_value_t = VectorCodec::AdaptiveMinMax)]
    scheme: VectorCodec,

    /// Record field holding the float embedding
    #[arg(long, default_value = "embedding")]
    field: String,

    /// Fail when any record's round-trip cosine similarity falls below this
    #[arg(long, default_value_t = 0.95)]
    min_similarity: f64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    audit_rag::core::logging::init_stderr(cli.verbose);

    let text = tokio::fs::read_to_string(&cli.input)
        .await
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let records: Vec<Value> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array", cli.input.display()))?;

    let (quantized, report) = quantize_collection(records, cli.scheme, &cli.field)?;

    tracing::info!(
        "Quantized {}/{} records with {} ({} skipped, dim {:?}), similarity min {:?} mean {:?}",
        report.quantized,
        report.records,
        report.codec,
        report.skipped,
        report.dimensions,
        report.min_similarity,
        report.mean_similarity
    );

    if let Some(min) = report.min_similarity {
        if min < cli.min_similarity {
            bail!(
                "round-trip similarity {:.4} is below the {:.4} threshold; output not written",
                min,
                cli.min_similarity
            );
        }
    }

    let output = serde_json::to_string_pretty(&quantized)?;
    tokio::fs::write(&cli.output, output)
        .await
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    tracing::info!("Wrote {}", cli.output.display());
    Ok(())
}
