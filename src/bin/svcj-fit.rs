use std::path::Path;

use anyhow::{bail, Context, Result};

use svcj_factor_engine::config::Config;
use svcj_factor_engine::{ReturnsPanel, RollingFitEngine};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.len() > 2 {
        bail!("usage: svcj-fit <returns.json> [config.toml]");
    }

    let config = match args.get(1) {
        Some(path) => Config::load_from(Path::new(path)),
        None => Config::load(),
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    // stderr only; stdout carries the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                config
                    .logging
                    .level
                    .parse()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .json()
        .init();

    let input = &args[0];
    tracing::info!(
        input = %input,
        window_size = config.fit.window_size,
        step_size = config.fit.step_size,
        parallel = config.fit.parallel,
        "Starting svcj-fit"
    );

    let raw =
        std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input))?;
    let panel =
        ReturnsPanel::from_json(&raw).with_context(|| format!("invalid panel {}", input))?;

    let engine = RollingFitEngine::new(config.fit.rolling());
    let matrix = match panel.fit(&engine, config.fit.parallel) {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Rolling fit failed");
            eprintln!("Rolling fit failed: {:#}", e);
            std::process::exit(1);
        }
    };

    let non_finite = matrix.non_finite_columns();
    if !non_finite.is_empty() {
        tracing::warn!(
            columns = ?non_finite,
            variance_policy = ?config.fit.variance_policy,
            "Factor matrix holds non-finite estimates"
        );
    }

    let (rows, cols) = matrix.shape();
    tracing::info!(rows, cols, "Factor matrix ready");
    println!("{}", serde_json::to_string(&matrix)?);
    Ok(())
}
