use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use foldref::api::{calc_statistics, Config, Engine, Progress, StatsCfg};
use nalgebra::vector;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod batch;
mod output;
mod provenance;

#[derive(Parser)]
#[command(name = "foldref")]
#[command(about = "Find short folding sequences that locate a point or line on a sheet")]
struct Cmd {
    /// JSON configuration file; missing fields take their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured maximum rank
    #[arg(long, global = true)]
    max_rank: Option<u32>,

    /// Debug-level logs on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Best marks for a target point
    Mark {
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
        #[arg(long, default_value_t = 5)]
        count: usize,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Best lines for the target line through two points
    Line {
        #[arg(long)]
        x1: f64,
        #[arg(long)]
        y1: f64,
        #[arg(long)]
        x2: f64,
        #[arg(long)]
        y2: f64,
        #[arg(long, default_value_t = 5)]
        count: usize,
        #[arg(long)]
        json: bool,
    },
    /// Mark queries for every `x, y` row of a CSV table
    Batch {
        #[arg(long)]
        input: PathBuf,
        /// `.parquet` or `.csv`
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Error statistics over random target points
    Stats {
        #[arg(long, default_value_t = 1000)]
        trials: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Print the effective configuration and provenance JSON
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose { Level::DEBUG } else { Level::INFO };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    let cfg = load_config(cmd.config.as_deref(), cmd.max_rank)?;
    match cmd.action {
        Action::Mark { x, y, count, json } => mark(cfg, x, y, count, json),
        Action::Line {
            x1,
            y1,
            x2,
            y2,
            count,
            json,
        } => line(cfg, [x1, y1, x2, y2], count, json),
        Action::Batch { input, out, count } => run_batch(cfg, &input, &out, count),
        Action::Stats { trials, seed } => stats(cfg, trials, seed),
        Action::Report => report(cfg),
    }
}

fn load_config(path: Option<&Path>, max_rank: Option<u32>) -> Result<Config> {
    let mut cfg = match path {
        Some(p) => {
            let text =
                std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", p.display()))?
        }
        None => Config::default(),
    };
    if let Some(r) = max_rank {
        cfg.max_rank = r;
    }
    Ok(cfg)
}

fn generated(cfg: Config) -> Result<Engine> {
    let mut engine = Engine::new(cfg).context("invalid configuration")?;
    engine.generate_with(&mut |p: &Progress| {
        if let Progress::Working { rank, attempts, lines, marks } = *p {
            tracing::debug!(rank, attempts, lines, marks, "working");
        }
    });
    Ok(engine)
}

fn print_matches(engine: &Engine, found: &[foldref::api::Match], as_json: bool) -> Result<()> {
    let reports: Vec<_> = found.iter().filter_map(|m| output::report(engine, m)).collect();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print!("{}", output::render_text(&reports));
    }
    Ok(())
}

fn mark(cfg: Config, x: f64, y: f64, count: usize, as_json: bool) -> Result<()> {
    tracing::info!(x, y, count, "mark");
    let engine = generated(cfg)?;
    let found = engine.find_marks_near(x, y, count)?;
    print_matches(&engine, &found, as_json)
}

fn line(cfg: Config, pts: [f64; 4], count: usize, as_json: bool) -> Result<()> {
    let [x1, y1, x2, y2] = pts;
    tracing::info!(x1, y1, x2, y2, count, "line");
    let engine = generated(cfg)?;
    let found = engine.find_lines_near(vector![x1, y1], vector![x2, y2], count)?;
    print_matches(&engine, &found, as_json)
}

fn run_batch(cfg: Config, input: &Path, out: &Path, count: usize) -> Result<()> {
    tracing::info!(input = %input.display(), out = %out.display(), count, "batch");
    let targets = batch::read_targets(input)?;
    let engine = generated(cfg)?;
    let mut df = batch::query(&engine, &targets, count)?;
    tracing::info!(targets = targets.len(), rows = df.height(), "batch done");
    batch::write_table(&mut df, out)?;
    let payload = provenance::Payload::new(
        json!({
            "input": input.to_string_lossy(),
            "count": count,
            "targets": targets.len(),
            "report": engine.report(),
        }),
        serde_json::to_value(engine.config())?,
    );
    provenance::write_sidecar(out, payload)?;
    Ok(())
}

fn stats(cfg: Config, trials: usize, seed: u64) -> Result<()> {
    let engine = generated(cfg)?;
    let scfg = StatsCfg {
        trials,
        seed,
        ..StatsCfg::default()
    };
    let s = calc_statistics(&engine, &scfg);
    println!("{}", serde_json::to_string_pretty(&s)?);
    Ok(())
}

fn report(cfg: Config) -> Result<()> {
    cfg.validate().context("invalid configuration")?;
    let doc = provenance::document(
        provenance::Payload::new(json!({}), serde_json::to_value(&cfg)?),
        &[],
    );
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
