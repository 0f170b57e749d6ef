// SPDX-License-Identifier: MIT OR Apache-2.0
//! druidjson CLI binary - inspect and dump Druid query result files as rows

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use druidjson_core::{ColumnValue, DEFAULT_CHUNK_SIZE, MetricSet, SourceOptions, TableSchema};
use druidjson_stream::{DruidTable, RowCursor};
use serde::Serialize;
use serde::ser::SerializeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "druidjson")]
#[command(version, about, long_about = None)]
struct Args {
    /// Column labels holding numeric metrics (comma separated)
    #[arg(short, long, value_name = "LIST", global = true)]
    metrics: Option<String>,

    /// Refill chunk size in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, global = true)]
    chunk_size: usize,

    /// Log filter (overrides `RUST_LOG`, default: warn)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for druidjson CLI
#[derive(Subcommand)]
enum Commands {
    /// Print the columns discovered from the first record
    Schema {
        /// Druid result file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the schema as JSON
        #[arg(long)]
        json: bool,
    },
    /// Dump rows
    Scan {
        /// Druid result file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Jsonl)]
        format: Format,

        /// Stop after this many rows
        #[arg(short = 'n', long)]
        limit: Option<u64>,
    },
    /// Count rows
    Count {
        /// Druid result file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One JSON object per row
    Jsonl,
    /// Comma separated values with a header line
    Csv,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = init_logging(args.log_level.as_deref()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    if let Err(e) = run(&args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn")),
    }
    .map_err(|e| anyhow::anyhow!("invalid log level: {e}"))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();

    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let file = match &args.command {
        Commands::Schema { file, .. } | Commands::Scan { file, .. } | Commands::Count { file } => {
            file
        }
    };
    let options = SourceOptions::new(file)
        .with_metrics(MetricSet::parse_list(args.metrics.as_deref().unwrap_or_default()))
        .with_chunk_size(args.chunk_size);
    let table = DruidTable::open(&options)
        .with_context(|| format!("failed to open '{}'", file.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match &args.command {
        Commands::Schema { json, .. } => write_schema(&mut out, table.schema(), *json)?,
        Commands::Scan { format, limit, .. } => {
            let mut cursor = table.cursor().context("failed to open row cursor")?;
            let rows = match format {
                Format::Jsonl => write_jsonl(&mut out, &mut cursor, *limit)?,
                Format::Csv => write_csv(&mut out, &mut cursor, *limit)?,
            };
            debug!(rows, "scan finished");
        }
        Commands::Count { .. } => {
            let rows = table
                .count_rows()
                .with_context(|| format!("failed to scan '{}'", file.display()))?;
            writeln!(out, "{rows}")?;
        }
    }
    out.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct ColumnInfo<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    column_type: druidjson_core::ColumnType,
}

fn write_schema(out: &mut impl Write, schema: &TableSchema, json: bool) -> Result<()> {
    if json {
        let columns: Vec<_> = schema
            .iter()
            .map(|c| ColumnInfo {
                name: &c.name,
                column_type: c.column_type(),
            })
            .collect();
        serde_json::to_writer_pretty(&mut *out, &columns)?;
        writeln!(out)?;
        return Ok(());
    }
    for (name, metric) in schema.describe() {
        writeln!(out, "{name}\t{}", if metric { "REAL" } else { "TEXT" })?;
    }
    Ok(())
}

/// One row serialized as a JSON object in schema column order
struct RowObject<'a> {
    schema: &'a TableSchema,
    values: &'a [ColumnValue<'a>],
}

impl Serialize for RowObject<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.schema.iter().zip(self.values) {
            map.serialize_entry(&column.name, &value.to_json())?;
        }
        map.end()
    }
}

fn next_row(cursor: &mut RowCursor<File>, emitted: u64, limit: Option<u64>) -> Result<bool> {
    if limit.is_some_and(|limit| emitted >= limit) {
        return Ok(false);
    }
    cursor
        .next_row()
        .with_context(|| format!("failed to read row {emitted}"))
}

fn write_jsonl(
    out: &mut impl Write,
    cursor: &mut RowCursor<File>,
    limit: Option<u64>,
) -> Result<u64> {
    let schema = cursor.schema().clone();
    let mut emitted = 0;
    while next_row(cursor, emitted, limit)? {
        let values = cursor.values()?;
        serde_json::to_writer(
            &mut *out,
            &RowObject {
                schema: &schema,
                values: &values,
            },
        )?;
        writeln!(out)?;
        emitted += 1;
    }
    Ok(emitted)
}

fn write_csv(out: &mut impl Write, cursor: &mut RowCursor<File>, limit: Option<u64>) -> Result<u64> {
    let schema = cursor.schema().clone();
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(schema.iter().map(|c| c.name.as_str()))?;
    let mut emitted = 0;
    while next_row(cursor, emitted, limit)? {
        let values = cursor.values()?;
        writer.write_record(values.iter().map(ToString::to_string))?;
        emitted += 1;
    }
    writer.flush()?;
    Ok(emitted)
}
