//! Proof Runner Binary
//!
//! Scores one run directory and writes `results.json`:
//! - Structured JSON logging
//! - Configuration from environment variables
//! - JSON-file or in-memory registry
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DLP_ID`: marketplace identifier (required)
//! - `SALT`: identity-hash salt (required)
//! - `INPUT_DIR`: run directory (default: /input)
//! - `OUTPUT_DIR`: results directory (default: /output)
//! - `MAX_CONCURRENCY`: extraction workers (default: 4)
//! - `EXTRACTION_TIMEOUT_SECS`: per-conversation extraction timeout (default: 30)
//! - `REGISTRY_PATH`: JSON registry snapshot (default: empty in-memory registry)
//! - `FEATURE_CACHE_SIZE`: text feature cache entries, 0 disables (default: 1024)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! DLP_ID=1 SALT=... INPUT_DIR=./run OUTPUT_DIR=./out cargo run --bin proof_runner
//! ```

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use chat_proof_kernel::{
    CachedTextFeatures, FrequencyTextFeatures, InMemoryRegistry, JsonFileRegistry,
    ProofConfig, ProofOrchestrator, RegistryClient,
};

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "proof_runner=info,chat_proof_kernel=info,chat_proof=info".into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true)
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let version = env!("CARGO_PKG_VERSION");
    let build_sha = option_env!("BUILD_SHA").unwrap_or("dev");

    info!(version = version, build_sha = build_sha, "Starting proof runner");

    let config = match ProofConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        max_concurrency = config.max_concurrency,
        "Configuration loaded"
    );

    let registry: Arc<dyn RegistryClient> = match &config.registry_path {
        Some(path) => {
            info!(path = %path.display(), "Using JSON file registry");
            Arc::new(JsonFileRegistry::new(path))
        }
        None => {
            info!("REGISTRY_PATH not set; using empty in-memory registry");
            Arc::new(InMemoryRegistry::new())
        }
    };
    let features = Arc::new(CachedTextFeatures::with_config(
        FrequencyTextFeatures::new(),
        config.cache_config(),
    ));

    let orchestrator = ProofOrchestrator::from_config(&config, registry, features.clone());

    let start = Instant::now();
    let result = match orchestrator
        .generate_from_dir(&config.input_dir, &config.salt, Utc::now())
        .await
    {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Proof generation failed");
            return Err(e.into());
        }
    };

    if let Some(stats) = features.cache_stats() {
        info!(
            entries = stats.len,
            hits = stats.hits,
            misses = stats.misses,
            "Feature cache statistics"
        );
    }

    tokio::fs::create_dir_all(&config.output_dir).await?;
    let results_path = config.results_path();
    tokio::fs::write(&results_path, serde_json::to_vec_pretty(&result)?).await?;

    info!(
        path = %results_path.display(),
        valid = result.is_valid(),
        score = result.score(),
        fingerprint = %result.fingerprint(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Results written"
    );

    Ok(())
}
