use anyhow::{Context, Result};
use dsvtable::{DsvFormat, DsvParser, Table};
use std::{env, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn usage(prog: &str) -> ! {
    eprintln!("Usage: {} <file> [csv|tsv] [--summary]", prog);
    std::process::exit(1);
}

fn print_summary(table: &Table) {
    println!("{}: {} rows", table.name, table.rows.len());
    for col in &table.columns {
        let raw = if col.metadata.is_raw { " (raw)" } else { "" };
        println!(
            "  {:<24} {:<8} {}{}",
            col.name, col.data_type, col.metadata.kind, raw
        );
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) args ─────────────────────────────────────────────────────
    let mut args = env::args();
    let prog = args.next().unwrap_or_else(|| "dsvtable".into());
    let mut args: Vec<String> = args.collect();
    let summary = match args.iter().position(|a| a == "--summary") {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    };
    let (path, format) = match args.as_slice() {
        [path] => (PathBuf::from(path), None),
        [path, format] => (PathBuf::from(path), Some(DsvFormat::from(format.as_str()))),
        _ => usage(&prog),
    };

    // ─── 3) parse & print ────────────────────────────────────────────
    let table = DsvParser::new().load(&path, format)?;
    match table {
        Some(table) if summary => print_summary(&table),
        Some(table) => {
            let json = serde_json::to_string_pretty(&table).context("serializing table")?;
            println!("{}", json);
        }
        None => {
            info!(path = %path.display(), "no data");
            println!("null");
        }
    }
    Ok(())
}
