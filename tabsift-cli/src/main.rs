use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use tabsift_classify::{
    AssistProvider, IngestOutcome, IngestReport, ReviewedMapping, classify, ingest_table,
    resume_with_mappings,
};
use tabsift_core::{CANDIDATE_KINDS, ClassificationResult, DatasetKind, catalog_for};
use tabsift_ingest::read_table;

mod config;
mod storage;

use storage::JsonDirSink;

#[derive(Parser, Debug)]
#[command(name = "tabsift", version, about = "Spreadsheet ingestion and classification")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a file and print the result without storing anything
    Classify {
        file: PathBuf,

        /// Business context forwarded to the assist collaborator
        #[arg(long)]
        context: Option<String>,

        /// Print the raw classification as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the full pipeline and store canonical datasets as JSON
    Ingest {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Owner identifier datasets are keyed by (default from config)
        #[arg(long)]
        owner: Option<String>,

        /// Output directory for dataset JSON (default from config)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Business context forwarded to the assist collaborator
        #[arg(long)]
        context: Option<String>,

        /// Resume from a reviewed mapping file instead of classifying
        #[arg(long)]
        mapping: Option<PathBuf>,

        /// Normalize and store even when the result needs manual review
        #[arg(long)]
        force: bool,
    },

    /// List canonical fields and synonyms per dataset kind
    Fields {
        /// Restrict to one kind (deals, transactions, budget)
        #[arg(long)]
        kind: Option<String>,
    },

    /// Write a default config file to ~/.tabsift/config.toml
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Classify { file, context, json } => run_classify(&file, context.as_deref(), json),
        Command::Ingest {
            files,
            owner,
            out,
            context,
            mapping,
            force,
        } => run_ingest(&files, owner, out, context.as_deref(), mapping, force),
        Command::Fields { kind } => run_fields(kind.as_deref()),
        Command::Init => config::init_config(),
    }
}

fn run_classify(file: &Path, context: Option<&str>, json: bool) -> Result<()> {
    let cfg = config::load_config()?;
    let assist = cfg.assist.build();
    let assist_ref = assist.as_ref().map(|a| a as &dyn AssistProvider);

    let table = read_table(file)?;
    let result = classify(&table, &file_name(file), assist_ref, context);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_classification(&result);
    }
    Ok(())
}

fn run_ingest(
    files: &[PathBuf],
    owner: Option<String>,
    out: Option<PathBuf>,
    context: Option<&str>,
    mapping: Option<PathBuf>,
    force: bool,
) -> Result<()> {
    let cfg = config::load_config()?;
    let owner = owner.unwrap_or_else(|| cfg.storage.owner.clone());
    let out = out.unwrap_or_else(|| PathBuf::from(&cfg.storage.out_dir));
    let assist = cfg.assist.build();
    let assist_ref = assist.as_ref().map(|a| a as &dyn AssistProvider);

    let reviewed: Option<ReviewedMapping> = match &mapping {
        Some(path) => {
            let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            Some(serde_json::from_str(&s).context("parse mapping file")?)
        }
        None => None,
    };

    let mut sink = JsonDirSink::new(&out);
    let mut failed = 0usize;

    // Files are independent; one failure must not abort its siblings.
    for file in files {
        match ingest_one(file, assist_ref, context, reviewed.as_ref(), force, &mut sink, &owner) {
            Ok(report) => print_report(&report),
            Err(err) => {
                eprintln!("{}: {err:#}", file.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} files failed", files.len());
    }
    Ok(())
}

fn ingest_one(
    file: &Path,
    assist: Option<&dyn AssistProvider>,
    context: Option<&str>,
    reviewed: Option<&ReviewedMapping>,
    force: bool,
    sink: &mut JsonDirSink,
    owner: &str,
) -> Result<IngestReport> {
    let table = read_table(file)?;
    let name = file_name(file);

    if let Some(reviewed) = reviewed {
        return resume_with_mappings(&table, &name, reviewed, sink, owner);
    }

    let report = ingest_table(&table, &name, assist, context, sink, owner)?;
    if report.outcome != IngestOutcome::AwaitingReview {
        return Ok(report);
    }

    if force {
        let reviewed = ReviewedMapping {
            dataset_kind: report.classification.dataset_kind,
            mappings: report.classification.mappings.clone(),
        };
        return resume_with_mappings(&table, &name, &reviewed, sink, owner);
    }

    // Leave an editable mapping file next to the upload for review.
    let review_path = file.with_extension("mapping.json");
    let reviewed = ReviewedMapping {
        dataset_kind: report.classification.dataset_kind,
        mappings: report.classification.mappings.clone(),
    };
    fs::write(&review_path, serde_json::to_string_pretty(&reviewed)?)
        .with_context(|| format!("write {}", review_path.display()))?;
    println!(
        "review needed: edit {} and rerun with --mapping",
        review_path.display()
    );
    Ok(report)
}

fn run_fields(kind: Option<&str>) -> Result<()> {
    let kinds: Vec<DatasetKind> = match kind {
        Some(raw) => match DatasetKind::parse(raw) {
            Some(k) if k != DatasetKind::Generic => vec![k],
            Some(_) => bail!("generic datasets have no catalog"),
            None => bail!("unknown kind: {raw}"),
        },
        None => CANDIDATE_KINDS.to_vec(),
    };

    for kind in kinds {
        println!("{kind}:");
        for field in catalog_for(kind) {
            let marker = if field.required { " (required)" } else { "" };
            println!("  {}{marker}", field.name);
            println!("    synonyms: {}", field.synonyms.join(", "));
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string()
}

fn print_classification(result: &ClassificationResult) {
    println!("kind:       {}", result.dataset_kind);
    println!("confidence: {:.2}", result.confidence);
    println!("auto:       {}", result.auto_mapped);
    println!("review:     {}", result.needs_manual_review);
    println!("mappings:");
    for m in &result.mappings {
        println!(
            "  {:<28} -> {:<18} ({:.2})",
            m.original_column, m.standard_field, m.confidence
        );
    }
    if !result.issues.is_empty() {
        println!("issues:");
        for issue in &result.issues {
            println!("  - {issue}");
        }
    }
}

fn print_report(report: &IngestReport) {
    match &report.outcome {
        IngestOutcome::Stored {
            receipt,
            dropped_rows,
        } => {
            println!(
                "{}: stored {} {} records -> {} ({} rows dropped)",
                report.file_name,
                receipt.records_written,
                receipt.dataset_kind,
                receipt.destination,
                dropped_rows
            );
        }
        IngestOutcome::AwaitingReview => {
            println!(
                "{}: awaiting review ({}, confidence {:.2})",
                report.file_name,
                report.classification.dataset_kind,
                report.classification.confidence
            );
        }
        IngestOutcome::NotInsertable { reason } => {
            println!("{}: not insertable: {reason}", report.file_name);
        }
    }
}
