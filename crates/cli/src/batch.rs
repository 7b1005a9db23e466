//! Batch mark queries: a table of targets in, a table of matches out.

use anyhow::{bail, Context, Result};
use foldref::api::Engine;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Read `x, y` targets from a CSV file.
pub fn read_targets(input: &Path) -> Result<Vec<(f64, f64)>> {
    let df = LazyCsvReader::new(input)
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .finish()
        .with_context(|| format!("reading {}", input.display()))?
        .select([
            col("x").cast(DataType::Float64),
            col("y").cast(DataType::Float64),
        ])
        .collect()
        .with_context(|| format!("columns x, y in {}", input.display()))?;
    let xs = df.column("x")?.f64()?;
    let ys = df.column("y")?.f64()?;
    xs.into_iter()
        .zip(ys.into_iter())
        .enumerate()
        .map(|(row, (x, y))| match (x, y) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => bail!("row {row}: missing x or y"),
        })
        .collect()
}

/// One row per (target, match); targets off the sheet get no rows.
pub fn query(engine: &Engine, targets: &[(f64, f64)], count: usize) -> Result<DataFrame> {
    let mut target = Vec::new();
    let mut tx = Vec::new();
    let mut ty = Vec::new();
    let mut place = Vec::new();
    let mut rank = Vec::new();
    let mut error = Vec::new();
    let mut mx = Vec::new();
    let mut my = Vec::new();
    let mut folds = Vec::new();
    for (k, &(x, y)) in targets.iter().enumerate() {
        let found = match engine.find_marks_near(x, y, count) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(row = k, x, y, error = %e, "skipping target");
                continue;
            }
        };
        for (i, m) in found.iter().enumerate() {
            let Some(p) = engine.construct(m.id).and_then(|c| c.geometry.as_mark()) else {
                continue;
            };
            let n = engine
                .sequence(m.id)
                .map(|s| s.fold_count(engine.constructs()))
                .unwrap_or(0);
            target.push(k as u32);
            tx.push(x);
            ty.push(y);
            place.push(i as u32 + 1);
            rank.push(m.rank);
            error.push(m.error);
            mx.push(p.x);
            my.push(p.y);
            folds.push(n as u32);
        }
    }
    let df = df!(
        "target" => target,
        "target_x" => tx,
        "target_y" => ty,
        "place" => place,
        "rank" => rank,
        "error" => error,
        "x" => mx,
        "y" => my,
        "folds" => folds,
    )?;
    Ok(df)
}

/// Write as Parquet for `.parquet` paths, CSV otherwise.
pub fn write_table(df: &mut DataFrame, out: &Path) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    if out.extension().is_some_and(|e| e == "parquet") {
        ParquetWriter::new(file).finish(df)?;
    } else {
        let mut file = file;
        CsvWriter::new(&mut file).include_header(true).finish(df)?;
    }
    Ok(())
}
