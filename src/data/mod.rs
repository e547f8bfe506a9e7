// src/data/mod.rs
pub mod schema;
pub mod utils;

use anyhow::{bail, Context, Result};
use arrow::datatypes::{DataType, Schema, SchemaRef};
use csv::ReaderBuilder;
use serde_json::{Map, Value};
use std::{collections::HashSet, fs::File, io::Read, path::Path, sync::Arc};
use tracing::{debug, info};

use crate::data::{
    schema::{cell_to_json, float_to_json, infer_schema},
    utils::{cmp_nulls_last, coerce_float, coerce_int, normalize_column, null_if_missing},
};

pub const UNIT_COLUMN: &str = "unit of measurement";
pub const RATE_UNIT: &str = "rate per 100,000 population";
pub const COUNTS_UNIT: &str = "counts";

/// One CSV row. The identifying columns are pulled out and coerced once at
/// load; `cells` keeps every field (null where missing) in header order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub iso3_code: Option<String>,
    pub country: Option<String>,
    pub year: Option<i64>,
    pub value: Option<f64>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub unit: Option<String>,
    pub cells: Vec<Option<String>>,
}

impl Record {
    /// Upper-cased ISO3 code as matched by lookups (no trimming).
    pub fn iso3_upper(&self) -> Option<String> {
        self.iso3_code.as_deref().map(str::to_uppercase)
    }
}

/// An immutable, typed in-memory table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub schema: SchemaRef,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn has_column(&self, name: &str) -> bool {
        self.schema.index_of(name).is_ok()
    }

    pub fn max_year(&self) -> Option<i64> {
        self.rows.iter().filter_map(|r| r.year).max()
    }

    /// Serialize a row with every column under its own name, except those
    /// listed in `renames` as `(from, to)`.
    pub fn record_to_json(&self, rec: &Record, renames: &[(&str, &str)]) -> Map<String, Value> {
        let mut out = Map::with_capacity(self.schema.fields().len());
        for (i, field) in self.schema.fields().iter().enumerate() {
            let name = field.name().as_str();
            let value = match name {
                "year" => rec.year.map(Value::from).unwrap_or(Value::Null),
                "value" => float_to_json(rec.value),
                _ => cell_to_json(
                    rec.cells.get(i).and_then(|c| c.as_deref()),
                    field.data_type(),
                ),
            };
            let key = renames
                .iter()
                .find(|(from, _)| *from == name)
                .map(|(_, to)| *to)
                .unwrap_or(name);
            out.insert(key.to_string(), value);
        }
        out
    }
}

/// Both base tables, loaded once and shared read-only for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Rate-per-100k series, filtered to the rate unit and deduplicated.
    pub rates: Table,
    /// Combined dataset: counts plus region metadata.
    pub clean: Table,
}

impl Dataset {
    /// Load both files from disk. Any I/O or parse failure is fatal to the caller.
    #[tracing::instrument(level = "info", skip_all, fields(rate = %rate_path.as_ref().display(), clean = %clean_path.as_ref().display()))]
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(rate_path: P, clean_path: Q) -> Result<Self> {
        let rate_path = rate_path.as_ref();
        let clean_path = clean_path.as_ref();

        let rate_file = File::open(rate_path)
            .with_context(|| format!("Failed to open rate dataset: {:?}", rate_path))?;
        let clean_file = File::open(clean_path)
            .with_context(|| format!("Failed to open clean dataset: {:?}", clean_path))?;

        let ds = Self::from_readers(rate_file, clean_file)
            .with_context(|| format!("Failed to load datasets {:?} / {:?}", rate_path, clean_path))?;
        info!(
            rate_rows = ds.rates.rows.len(),
            clean_rows = ds.clean.rows.len(),
            "datasets loaded"
        );
        Ok(ds)
    }

    /// Same as [`Dataset::load`] over arbitrary readers.
    pub fn from_readers<R: Read, S: Read>(rate: R, clean: S) -> Result<Self> {
        Ok(Self {
            rates: load_rate_table(rate).context("rate dataset")?,
            clean: load_clean_table(clean).context("clean dataset")?,
        })
    }
}

/// Parse a headered CSV into normalized headers and null-aware cells.
/// Short rows are padded with nulls; extra trailing fields are dropped.
fn read_csv<R: Read>(reader: R) -> Result<(Vec<String>, Vec<Vec<Option<String>>>)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("CSV header row")?
        .iter()
        .map(normalize_column)
        .collect();
    if headers.iter().all(String::is_empty) {
        bail!("CSV has no header row");
    }

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        let mut cells: Vec<Option<String>> = record
            .iter()
            .take(headers.len())
            .map(null_if_missing)
            .collect();
        cells.resize(headers.len(), None);
        rows.push(cells);
    }
    Ok((headers, rows))
}

fn build_records(headers: &[String], rows: Vec<Vec<Option<String>>>) -> Vec<Record> {
    let idx = |name: &str| headers.iter().position(|h| h == name);
    let (iso, country, year, value) = (idx("iso3_code"), idx("country"), idx("year"), idx("value"));
    let (region, subregion, unit) = (idx("region"), idx("subregion"), idx(UNIT_COLUMN));

    rows.into_iter()
        .map(|cells| {
            let get = |i: Option<usize>| i.and_then(|i| cells[i].clone());
            Record {
                iso3_code: get(iso),
                country: get(country),
                year: get(year).and_then(|s| coerce_int(&s)),
                value: get(value).and_then(|s| coerce_float(&s)),
                region: get(region),
                subregion: get(subregion),
                unit: get(unit),
                cells,
            }
        })
        .collect()
}

/// Load the rate table: keep only rate-per-100k rows, then keep the highest
/// value per `(iso3_code, country, year)`.
pub fn load_rate_table<R: Read>(reader: R) -> Result<Table> {
    let (headers, rows) = read_csv(reader)?;
    for required in ["iso3_code", "country", "year", "value"] {
        if !headers.iter().any(|h| h == required) {
            bail!("missing required column `{}`", required);
        }
    }

    let schema = infer_schema(
        &headers,
        &rows,
        &[("year", DataType::Int64), ("value", DataType::Float64)],
    );
    let mut records = build_records(&headers, rows);
    let raw_len = records.len();

    if headers.iter().any(|h| h == UNIT_COLUMN) {
        records.retain(|r| {
            r.unit
                .as_deref()
                .is_some_and(|u| u.to_lowercase() == RATE_UNIT)
        });
    }
    let unit_len = records.len();

    // stable: equal keys keep file order, which fixes the dedup winner
    records.sort_by(|a, b| {
        cmp_nulls_last(a.year, b.year, true).then(cmp_nulls_last(a.value, b.value, true))
    });
    let mut seen = HashSet::new();
    records.retain(|r| seen.insert((r.iso3_code.clone(), r.country.clone(), r.year)));

    debug!(
        raw = raw_len,
        rate_unit = unit_len,
        deduped = records.len(),
        "rate table filtered"
    );
    Ok(Table {
        schema: Arc::new(schema),
        rows: records,
    })
}

/// Load the combined dataset as-is; filtering happens per request.
pub fn load_clean_table<R: Read>(reader: R) -> Result<Table> {
    let (headers, rows) = read_csv(reader)?;
    let schema: Schema = infer_schema(&headers, &rows, &[]);
    Ok(Table {
        schema: Arc::new(schema),
        rows: build_records(&headers, rows),
    })
}
