use anyhow::{Context, Result};
use dstatparse::{read_csv, ParserConfig};
use std::{
    env,
    io::{self, Write},
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "Usage: dstatparse <DSTAT_CSV> [CONFIG_YAML]";

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    // stdout carries the table, so logs go to stderr
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    // ─── 2) args + config ────────────────────────────────────────────
    let mut args = env::args().skip(1);
    let csv_path = args.next().context(USAGE)?;
    let config = match args.next() {
        Some(path) => ParserConfig::from_yaml_file(&path)
            .with_context(|| format!("loading parser config {}", path))?,
        None => ParserConfig::default(),
    };

    // ─── 3) parse ────────────────────────────────────────────────────
    let table = read_csv(&csv_path, &config).with_context(|| format!("parsing {}", csv_path))?;
    for category in &table {
        info!(
            category = %category.name,
            subcategories = category.series.len(),
            "category"
        );
    }

    // ─── 4) emit ─────────────────────────────────────────────────────
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &table).context("writing table as JSON")?;
    writeln!(out)?;
    Ok(())
}
