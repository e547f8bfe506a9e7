use serde::Serialize;
use serde_json::{Map, Value};

use crate::data::{utils::cmp_nulls_last, Dataset, Record};
use crate::query::params::{first, parse_or, parse_or_default, slice_range, QueryPairs};

pub const DEFAULT_LIMIT: i64 = 200;
pub const DEFAULT_OFFSET: i64 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatesParams {
    /// `None` only when the table carries no year at all.
    pub year: Option<i64>,
    /// Lower-cased, trimmed; empty means no filter.
    pub q: String,
    pub limit: i64,
    pub offset: i64,
}

impl RatesParams {
    pub fn from_query(pairs: &QueryPairs, ds: &Dataset) -> Self {
        Self {
            year: parse_or(first(pairs, "year"), ds.rates.max_year()),
            q: first(pairs, "q").unwrap_or_default().trim().to_lowercase(),
            limit: parse_or_default(first(pairs, "limit"), DEFAULT_LIMIT),
            offset: parse_or_default(first(pairs, "offset"), DEFAULT_OFFSET),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatesPage {
    pub year: Option<i64>,
    pub total: usize,
    pub count: usize,
    pub offset: i64,
    pub limit: i64,
    pub results: Vec<Map<String, Value>>,
}

/// One year's rates, optionally filtered by country name, highest first,
/// sliced to `[offset, offset + limit)`.
pub fn list_rates(ds: &Dataset, params: &RatesParams) -> RatesPage {
    let mut rows: Vec<&Record> = ds
        .rates
        .rows
        .iter()
        .filter(|r| params.year.is_some() && r.year == params.year)
        .filter(|r| {
            params.q.is_empty()
                || r.country
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&params.q))
        })
        .collect();

    let total = rows.len();
    rows.sort_by(|a, b| cmp_nulls_last(a.value, b.value, true));

    let range = slice_range(
        rows.len(),
        params.offset,
        params.offset.saturating_add(params.limit),
    );
    let results: Vec<_> = rows[range]
        .iter()
        .map(|r| ds.rates.record_to_json(r, &[]))
        .collect();

    RatesPage {
        year: params.year,
        total,
        count: results.len(),
        offset: params.offset,
        limit: params.limit,
        results,
    }
}
