//! trace_replay — replay an external movement trace one step at a time.
//!
//! Opens a `time id x y` trace, pulls one batch per simulated step, and
//! applies each batch to a position table keyed by entity name, the way a
//! movement model would.  Prints the header, progress, and a summary of the
//! ingestion and read-ahead behaviour.
//!
//! ```text
//! cargo run -p trace_replay --release -- traces/campus.txt --low 100 --high 1000
//! RUST_LOG=dt_trace=debug cargo run -p trace_replay -- traces/campus.txt
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use dt_core::{Coord, EntityId};
use dt_trace::TraceReaderBuilder;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Print a progress line every N steps.
const PROGRESS_INTERVAL_STEPS: u64 = 10_000;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Replay an external movement trace step by step")]
struct Cli {
    /// Trace file (`minTime maxTime minX maxX minY maxY` header, then `time id x y` lines).
    path: PathBuf,

    /// Keep raw coordinates instead of shifting header minimums to zero.
    #[arg(long)]
    raw: bool,

    /// Stop after this (normalised) timestamp.
    #[arg(long)]
    end_time: Option<f64>,

    /// Read-ahead low mark, in batches.
    #[arg(long, default_value_t = 2_000)]
    low: usize,

    /// Read-ahead high mark, in batches.
    #[arg(long, default_value_t = 20_000)]
    high: usize,
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let cli = Cli::parse();

    let mut builder = TraceReaderBuilder::new(&cli.path)
        .normalize(!cli.raw)
        .read_ahead(cli.low, cli.high);
    if let Some(end) = cli.end_time {
        builder = builder.end_time(end);
    }
    let mut reader = builder
        .build()
        .with_context(|| format!("opening trace {}", cli.path.display()))?;

    let offsets = *reader.offsets();
    println!("=== trace_replay — {} ===", cli.path.display());
    println!(
        "header: t [{}, {}]  x [{}, {}]  y [{}, {}]  ({})",
        offsets.min_time,
        offsets.max_time,
        offsets.min_x,
        offsets.max_x,
        offsets.min_y,
        offsets.max_y,
        if reader.normalizes() { "normalised" } else { "raw" },
    );
    println!();

    // ── Replay ────────────────────────────────────────────────────────────
    let t_run = Instant::now();
    let mut positions: HashMap<EntityId, Coord> = HashMap::new();
    let mut steps: u64 = 0;
    let mut moves: u64 = 0;
    let mut bbox: Option<(Coord, Coord)> = None;

    while let Some(batch) = reader
        .pull_next_batch()
        .with_context(|| format!("reading trace {}", cli.path.display()))?
    {
        steps += 1;
        for rec in batch.records {
            bbox = Some(match bbox {
                None => (rec.position, rec.position),
                Some((lo, hi)) => (lo.min(rec.position), hi.max(rec.position)),
            });
            positions.insert(rec.entity, rec.position);
            moves += 1;
        }

        if steps % PROGRESS_INTERVAL_STEPS == 0 {
            let stats = reader.stats();
            println!(
                "step {:>9}  t = {:<12}  entities {:>7}  queued {:>6}",
                steps,
                batch.timestamp,
                positions.len(),
                stats.queued,
            );
        }
    }
    let elapsed = t_run.elapsed().as_secs_f64();

    // ── Summary ───────────────────────────────────────────────────────────
    let stats = reader.stats();
    println!();
    println!("Replay complete in {elapsed:.3}s");
    println!("steps (batches)           {steps}");
    println!("position updates          {moves}");
    println!("distinct entities         {}", positions.len());
    match reader.last_timestamp() {
        Some(t) => println!("last timestamp            {t}"),
        None => println!("last timestamp            (none)"),
    }
    if let Some((lo, hi)) = bbox {
        println!("observed bounding box      {lo} – {hi}");
    }
    println!(
        "read-ahead                peak {} of {}  stalls {}",
        stats.peak_queued,
        cli.high,
        stats.throttle_episodes,
    );
    if let Some(summary) = reader.summary() {
        println!(
            "lines read                {}  (skipped {}{})",
            summary.lines_read,
            summary.skipped_lines,
            if summary.stopped_at_end_time { ", stopped at end time" } else { "" },
        );
    }

    Ok(())
}
