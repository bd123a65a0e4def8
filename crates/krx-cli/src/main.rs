//! KRX benchmark CLI
//!
//! Runs the constrained multiple-choice benchmark for one model against an
//! OpenAI-compatible completion server and writes
//! `<output-dir>/<model>/<category>.results.json` per category. With
//! `--longform` it also writes `gpt4o_bleu.results.json`, and with
//! `--judge-baseline` one `llm_judge_results_<placement>.json` per placement.
//!
//! Set `RUST_LOG=debug` (or pass `--verbose`) for per-batch logging.

mod args;
mod progress;

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use colored::*;
use krx_eval::judge::JUDGE_MAX_TOKENS;
use krx_eval::{
    BenchmarkRunner, EvalConfig, JudgeRunner, OpenAiCompatOracle, OracleJudge, RunSummary,
    SamplingParams, render_table,
};
use tracing_subscriber::EnvFilter;

use crate::args::Cli;
use crate::progress::RunProgressBar;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let base = match &cli.config {
        Some(path) => EvalConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EvalConfig::default(),
    };
    let config = cli.apply(base);

    tracing::info!(
        model = %config.model,
        endpoint = %config.oracle.endpoint,
        batch_size = config.batch_size,
        longform = config.longform.enabled,
        "Starting benchmark"
    );

    let mut summary = if cli.judge_only {
        RunSummary::new(&config.model, Utc::now())
    } else {
        generate(&cli, config.clone()).await?
    };

    if let Some(baseline) = cli.baseline() {
        let oracle = OpenAiCompatOracle::new(&cli.judge_model, cli.judge_oracle(&config))
            .context("Failed to create judge client")?;
        let judge = OracleJudge::new(oracle, SamplingParams::greedy(JUDGE_MAX_TOKENS));
        let runner = JudgeRunner::new(&config, judge).context("Invalid configuration")?;
        summary.judgements = runner
            .run(&baseline, &cli.placements())
            .await
            .context("Pairwise judging failed")?;
    }

    println!("{}", render_table(&summary));
    println!(
        "{} Results written to {}",
        "✓".green().bold(),
        config.output_dir.display()
    );
    Ok(())
}

/// Multiple-choice categories and the long-form pass, as configured
async fn generate(cli: &Cli, config: EvalConfig) -> anyhow::Result<RunSummary> {
    let oracle = OpenAiCompatOracle::new(&config.model, config.oracle.clone())
        .context("Failed to create completion client")?;
    let mut runner = BenchmarkRunner::new(config, oracle).context("Invalid configuration")?;

    let bar = Arc::new(RunProgressBar::new());
    let sink = Arc::clone(&bar);
    runner.set_progress_callback(Box::new(move |progress| sink.update(progress)));

    let summary = if cli.longform_only {
        let mut summary = RunSummary::new(&runner.config().model, Utc::now());
        runner
            .run_longform()
            .await
            .map(|longform| {
                summary.longform = Some(longform);
                summary
            })
    } else {
        runner.run().await
    };
    bar.finish();
    summary.context("Benchmark run failed")
}
