// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Certguard — certificate authenticity checks from the command line.
//
// Entry point. Initialises logging, loads configuration, builds the backend
// services, and dispatches the requested subcommand.

mod services;
mod state;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use certguard_core::error::{CertguardError, Result};
use certguard_core::types::{LedgerEntry, Verdict};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

use services::app_services::{
    AppServices, VerificationReport, load_config, persist_config, resolve_logo_path,
};
use services::data_dir::{self, CONFIG_FILE};
use state::DashboardStats;

#[derive(Parser)]
#[command(name = "certguard")]
#[command(version, about = "Check certificates for a QR code, a signature, and the issuer's logo")]
struct Cli {
    /// Path to the JSON configuration file [default: <data-dir>/config.json]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the configuration and the verification ledger
    #[arg(short, long, global = true, env = "CERTGUARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Reference logo template (overrides the configuration file)
    #[arg(long, global = true, env = "CERTGUARD_LOGO")]
    logo: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify one or more certificate images and record each verdict
    Verify {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print one JSON object per document
        #[arg(long)]
        json: bool,
    },
    /// List the most recent ledger entries
    Recent {
        /// Number of entries [default: recent_limit from the configuration]
        #[arg(short, long)]
        limit: Option<u32>,

        #[arg(long)]
        json: bool,
    },
    /// List every ledger entry recorded for a content hash
    History {
        hash: String,

        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config {
        /// Also write it to the configuration file
        #[arg(long)]
        write: bool,
    },
}

/// One line of `verify --json` output.
#[derive(Serialize)]
struct VerdictLine<'a> {
    file: &'a str,
    #[serde(flatten)]
    verdict: &'a Verdict,
    ledger_id: Option<i64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, fatal = e.is_fatal(), "certguard failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let dir = data_dir::data_dir(cli.data_dir.as_deref())?;
    let config_path = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(CertguardError::Configuration(format!(
                "configuration file {} not found",
                path.display()
            )));
        }
        Some(path) => path.clone(),
        None => dir.join(CONFIG_FILE),
    };
    let mut config = load_config(&config_path)?;

    if let Command::Config { write } = cli.command {
        if write {
            persist_config(&config_path, &config)?;
            info!(path = %config_path.display(), "configuration written");
        }
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(ExitCode::SUCCESS);
    }

    // Relative template paths in a configuration file are relative to it.
    let base = config_path.parent().unwrap_or(Path::new("."));
    config.logo_template_path = match cli.logo {
        Some(logo) => logo,
        None => resolve_logo_path(base, &config.logo_template_path),
    };

    let svc = AppServices::init(&dir, config)?;

    match cli.command {
        Command::Verify { files, json } => verify(&svc, files, json).await,
        Command::Recent { limit, json } => {
            let entries = svc.recent(limit)?;
            print_entries(&entries, json)?;
            if !json {
                println!("({} of {} entries)", entries.len(), svc.ledger_count()?);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::History { hash, json } => {
            print_entries(&svc.history(&hash.to_ascii_lowercase())?, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}

async fn verify(svc: &AppServices, files: Vec<PathBuf>, json: bool) -> Result<ExitCode> {
    let mut stats = DashboardStats::new();
    let mut unreadable = 0usize;

    for path in files {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, path = %path.display(), "cannot read document");
                eprintln!("{}: cannot read: {e}", path.display());
                unreadable += 1;
                continue;
            }
        };

        let report = svc.verify_document(data, filename).await;
        stats.record(report.verdict.status, report.elapsed);
        print_report(&report, json)?;

        if let Err(e) = &report.ledger {
            eprintln!("{}: verdict not recorded: {e}", report.filename);
        }
    }

    if json {
        println!("{}", serde_json::json!({ "dashboard": stats }));
    } else {
        println!("{stats}");
    }

    Ok(if unreadable == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn print_report(report: &VerificationReport, json: bool) -> Result<()> {
    let verdict = &report.verdict;
    if json {
        let line = VerdictLine {
            file: &report.filename,
            verdict,
            ledger_id: report.ledger.as_ref().ok().and_then(|e| e.as_ref().map(|e| e.id)),
        };
        println!("{}", serde_json::to_string(&line)?);
        return Ok(());
    }

    println!("{}: {}", report.filename, verdict.status);
    for reason in &verdict.reasons {
        println!("  - {reason}");
    }
    if let Some(hash) = &verdict.hash {
        println!("  sha256 {hash}");
    }
    Ok(())
}

fn print_entries(entries: &[LedgerEntry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }
    for entry in entries {
        let hash = if entry.doc_hash.is_empty() {
            "-"
        } else {
            short_hash(&entry.doc_hash)
        };
        println!(
            "#{:<5} {}  {:<8}  {}  {}",
            entry.id,
            entry.processed_at.format("%Y-%m-%d %H:%M:%S"),
            entry.status,
            hash,
            entry.filename
        );
        if !entry.reasons.is_empty() {
            println!("       {}", entry.reasons.join(" | "));
        }
    }
    Ok(())
}

/// First 12 characters of a stored hash, or the whole value if shorter.
fn short_hash(hash: &str) -> &str {
    match hash.char_indices().nth(12) {
        Some((end, _)) => &hash[..end],
        None => hash,
    }
}
