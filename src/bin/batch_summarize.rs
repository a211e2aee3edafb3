//! Batch summarization CLI.
//!
//! Summarizes files, directories, and URLs from the command line without starting a server.
//! Directories are walked recursively and only `.txt` and `.json` entries are picked up. Each
//! input is processed independently; a failure is reported on stderr and the remaining inputs
//! still run.
use std::{num::NonZeroUsize, path::Path, process::ExitCode, sync::Arc};

use clap::Parser;
use rustysumm::{
    acquisition,
    config,
    keywords::TermScore,
    logging,
    processing::{SummarizeOptions, SummarizerService},
};
use walkdir::WalkDir;

#[derive(Debug, Parser)]
#[command(
    name = "batch-summarize",
    about = "Summarize files, directories, and URLs in one pass"
)]
struct Cli {
    /// Files, directories, or http(s) URLs to summarize.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Fraction of sentences kept per chunk, in (0, 1].
    #[arg(long)]
    compression_ratio: Option<f64>,

    /// Lower bound (words) for each compressed chunk.
    #[arg(long)]
    min_length: Option<usize>,

    /// Upper bound (words) for each compressed chunk.
    #[arg(long)]
    max_length: Option<usize>,

    /// Chunk budget in characters.
    #[arg(long)]
    max_chunk_size: Option<usize>,

    /// Seed for the clustering stage.
    #[arg(long)]
    clustering_seed: Option<u64>,

    /// Also extract the top N keywords per document.
    #[arg(long, value_name = "N")]
    keywords: Option<NonZeroUsize>,

    /// Restrict JSON extraction to these field names (repeatable).
    #[arg(long = "text-field", value_name = "FIELD")]
    text_fields: Vec<String>,

    /// Emit one JSON object per input instead of human-readable text.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, serde::Serialize)]
struct SummaryReport {
    input: String,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    summary: String,
    original_length: usize,
    summary_length: usize,
    compression_ratio_achieved: f64,
    num_chunks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    keywords: Option<Vec<TermScore>>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    config::init_config();
    logging::init_tracing();

    let service = match SummarizerService::from_config() {
        Ok(service) => Arc::new(service),
        Err(error) => {
            eprintln!("Failed to construct summarizer service: {error:#}");
            return ExitCode::FAILURE;
        }
    };

    let failures = run(&cli, &service).await;
    if failures > 0 {
        eprintln!("{failures} input(s) failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: &Cli, service: &Arc<SummarizerService>) -> usize {
    let options = build_options(cli);
    let text_fields = (!cli.text_fields.is_empty()).then_some(cli.text_fields.as_slice());

    let mut failures = 0usize;
    for input in &cli.inputs {
        let targets = expand_input(input);
        if targets.is_empty() {
            eprintln!("No summarizable files found in {input}");
            continue;
        }

        for target in targets {
            match summarize_target(service, &target, options.clone(), text_fields, cli.keywords)
                .await
            {
                Ok(report) => print_report(&report, cli.json),
                Err(error) => {
                    eprintln!("Failed to summarize {target}: {error:#}");
                    failures += 1;
                }
            }
        }
    }
    failures
}

/// Expand a directory into its summarizable files; pass through everything else.
fn expand_input(input: &str) -> Vec<String> {
    let path = Path::new(input);
    if !path.is_dir() {
        return vec![input.to_string()];
    }

    WalkDir::new(path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_string_lossy().into_owned())
        .filter(|candidate| has_summarizable_extension(candidate))
        .collect()
}

fn has_summarizable_extension(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("json"))
}

async fn summarize_target(
    service: &Arc<SummarizerService>,
    target: &str,
    options: SummarizeOptions,
    text_fields: Option<&[String]>,
    keyword_count: Option<NonZeroUsize>,
) -> anyhow::Result<SummaryReport> {
    let document = acquisition::acquire_filtered(target, text_fields).await?;
    let keywords = keyword_count.map(|count| service.extract_keywords(&document.text, count.get()));
    let outcome = service
        .summarize_with_options(&document.text, options)
        .await?;

    Ok(SummaryReport {
        input: target.to_string(),
        source: document.source.to_string(),
        title: document.title,
        summary: outcome.summary,
        original_length: outcome.metadata.original_length,
        summary_length: outcome.metadata.summary_length,
        compression_ratio_achieved: outcome.metadata.compression_ratio_achieved,
        num_chunks: outcome.metadata.num_chunks,
        keywords,
    })
}

fn build_options(cli: &Cli) -> SummarizeOptions {
    let mut options = SummarizeOptions::from_config(config::get_config());
    if let Some(ratio) = cli.compression_ratio {
        options.compression_ratio = ratio;
    }
    if let Some(min_length) = cli.min_length {
        options.min_length = min_length;
    }
    if let Some(max_length) = cli.max_length {
        options.max_length = max_length;
    }
    if let Some(size) = cli.max_chunk_size {
        options.max_chunk_size = size;
    }
    if let Some(seed) = cli.clustering_seed {
        options.clustering_seed = seed;
    }
    options
}

fn print_report(report: &SummaryReport, as_json: bool) {
    if as_json {
        match serde_json::to_string(report) {
            Ok(line) => println!("{line}"),
            Err(error) => eprintln!("Failed to serialize report for {}: {error}", report.input),
        }
        return;
    }

    println!("=== {} ===", report.input);
    if let Some(title) = &report.title {
        println!("Title: {title}");
    }
    println!("{}", report.summary);
    println!(
        "[{} -> {} chars, {} chunk(s), ratio {:.2}]",
        report.original_length,
        report.summary_length,
        report.num_chunks,
        report.compression_ratio_achieved
    );
    if let Some(keywords) = &report.keywords {
        let terms: Vec<&str> = keywords.iter().map(|score| score.term.as_str()).collect();
        println!("Keywords: {}", terms.join(", "));
    }
    println!();
}
