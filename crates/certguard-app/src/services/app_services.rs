// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — owns the pipeline and the verification ledger and
// provides async-friendly methods for the CLI to call.
//
// `Pipeline::verify` is CPU-bound, so it runs on tokio's blocking pool with a
// deadline. The ledger serialises writers behind its own mutex, so the
// services struct is cheap to clone into concurrent tasks.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use certguard_core::error::{CertguardError, Result};
use certguard_core::types::{LedgerEntry, Verdict};
use certguard_core::AppConfig;
use certguard_document::Pipeline;
use certguard_security::ledger::VerificationLedger;
use tracing::{error, info, instrument, warn};

use super::data_dir::LEDGER_FILE;

/// Everything the caller learns about one verification request.
#[derive(Debug)]
pub struct VerificationReport {
    pub filename: String,
    pub verdict: Verdict,
    /// Wall-clock time spent producing the verdict.
    pub elapsed: Duration,
    /// The stored ledger row, `None` when the ledger is disabled. A storage
    /// failure is reported here and never replaces the verdict.
    pub ledger: Result<Option<LedgerEntry>>,
}

/// Shared application services.
///
/// All fields are Arc-wrapped so the struct can be passed into spawned tasks
/// without lifetime issues.
#[derive(Clone)]
pub struct AppServices {
    pipeline: Arc<Pipeline>,
    ledger: Option<Arc<VerificationLedger>>,
    config: Arc<AppConfig>,
}

impl AppServices {
    /// Initialise all services. Call once at startup.
    ///
    /// Fails when the logo template cannot be loaded, and with
    /// `CertguardError::Storage` when the enabled ledger cannot be opened.
    /// Verdicts are never reported as recorded unless they were persisted.
    pub fn init(data_dir: &Path, config: AppConfig) -> Result<Self> {
        info!(path = %data_dir.display(), "initialising app services");

        config.validate()?;
        let pipeline = Pipeline::new(&config)?;

        let ledger = if config.ledger_enabled {
            let path = data_dir.join(LEDGER_FILE);
            let ledger = VerificationLedger::open(&path).inspect_err(|e| {
                error!(error = %e, path = %path.display(), "verification ledger unavailable");
            })?;
            Some(Arc::new(ledger))
        } else {
            info!("verification ledger disabled");
            None
        };

        info!("app services initialised");
        Ok(Self::from_parts(pipeline, ledger, config))
    }

    /// Assemble services from already-built parts.
    pub fn from_parts(
        pipeline: Pipeline,
        ledger: Option<Arc<VerificationLedger>>,
        config: AppConfig,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            ledger,
            config: Arc::new(config),
        }
    }

    // -- Verification --------------------------------------------------------

    /// Verify one upload and record the verdict.
    ///
    /// Past the configured deadline the request answers with an `Error`
    /// verdict; the abandoned computation finishes in the background and its
    /// result is discarded.
    #[instrument(skip_all, fields(%filename, data_len = data.len()))]
    pub async fn verify_document(&self, data: Vec<u8>, filename: String) -> VerificationReport {
        let started = Instant::now();

        let pipeline = Arc::clone(&self.pipeline);
        let name = filename.clone();
        let task = tokio::task::spawn_blocking(move || pipeline.verify(&data, &name));

        let joined = match self.config.verify_timeout_ms {
            0 => task.await,
            millis => match tokio::time::timeout(Duration::from_millis(millis), task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(millis, "verification deadline exceeded");
                    Ok(Verdict::error(CertguardError::Timeout { millis }.to_string()))
                }
            },
        };
        let verdict = joined.unwrap_or_else(|e| {
            error!(error = %e, "verification task failed");
            Verdict::error(format!("verification task failed: {e}"))
        });
        let elapsed = started.elapsed();

        let ledger = self.record(&filename, &verdict).await;
        if let Err(e) = &ledger {
            error!(error = %e, "failed to record verdict in ledger");
        }

        VerificationReport {
            filename,
            verdict,
            elapsed,
            ledger,
        }
    }

    async fn record(&self, filename: &str, verdict: &Verdict) -> Result<Option<LedgerEntry>> {
        let Some(ledger) = &self.ledger else {
            return Ok(None);
        };
        let ledger = Arc::clone(ledger);
        let filename = filename.to_owned();
        let verdict = verdict.clone();

        tokio::task::spawn_blocking(move || {
            ledger.append(&filename, verdict.hash.as_deref(), verdict.status, &verdict.reasons)
        })
        .await
        .map_err(|e| CertguardError::Storage(format!("ledger task failed: {e}")))?
        .map(Some)
    }

    // -- Ledger queries ------------------------------------------------------

    /// Most recent ledger entries, newest first. `limit` defaults to the
    /// configured `recent_limit`.
    pub fn recent(&self, limit: Option<u32>) -> Result<Vec<LedgerEntry>> {
        let limit = limit.unwrap_or(self.config.recent_limit);
        self.ledger()?.recent(limit)
    }

    /// Every ledger entry recorded for `doc_hash`, oldest first.
    pub fn history(&self, doc_hash: &str) -> Result<Vec<LedgerEntry>> {
        self.ledger()?.entries_for_hash(doc_hash)
    }

    /// Total number of ledger entries.
    pub fn ledger_count(&self) -> Result<u64> {
        self.ledger()?.count()
    }

    fn ledger(&self) -> Result<&VerificationLedger> {
        self.ledger
            .as_deref()
            .ok_or_else(|| CertguardError::Configuration("verification ledger is disabled".into()))
    }
}

// -- Config persistence -------------------------------------------------------

/// Load configuration from `path`, or defaults when the file does not exist.
///
/// A file that exists but does not parse is an error, as is a configuration
/// that fails validation.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let config = if path.exists() {
        let data = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&data)?;
        info!(path = %path.display(), "configuration loaded");
        config
    } else {
        info!(path = %path.display(), "no configuration file, using defaults");
        AppConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Write `config` to `path` as pretty-printed JSON.
pub fn persist_config(path: &Path, config: &AppConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Resolve a relative logo path against `base`.
pub fn resolve_logo_path(base: &Path, logo: &Path) -> PathBuf {
    if logo.is_absolute() {
        logo.to_path_buf()
    } else {
        base.join(logo)
    }
}
