use serde::Serialize;
use serde_json::{Map, Value};

use crate::data::{utils::cmp_nulls_last, Dataset, Record};
use crate::query::params::{first, parse_or, parse_or_default, slice_range, QueryPairs};

pub const DEFAULT_N: i64 = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopRates {
    pub year: Option<i64>,
    pub results: Vec<Map<String, Value>>,
}

/// Highest `n` rates for one year, `value` reported as `rate_per_100k`.
/// A negative `n` drops that many rows from the bottom instead.
pub fn top_rates(ds: &Dataset, pairs: &QueryPairs) -> TopRates {
    let n = parse_or_default(first(pairs, "n"), DEFAULT_N);
    let year = parse_or(first(pairs, "year"), ds.rates.max_year());

    let mut rows: Vec<&Record> = ds
        .rates
        .rows
        .iter()
        .filter(|r| year.is_some() && r.year == year)
        .collect();
    rows.sort_by(|a, b| cmp_nulls_last(a.value, b.value, true));

    let range = slice_range(rows.len(), 0, n);
    let results = rows[range]
        .iter()
        .map(|r| ds.rates.record_to_json(r, &[("value", "rate_per_100k")]))
        .collect();

    TopRates { year, results }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::fixture;
    use serde_json::json;

    fn query(v: &[(&str, &str)]) -> Vec<(String, String)> {
        v.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_top_n_for_year() {
        let ds = fixture();
        let top = top_rates(&ds, &query(&[("year", "2019"), ("n", "2")]));
        assert_eq!(top.year, Some(2019));
        assert_eq!(top.results.len(), 2);
        assert_eq!(top.results[0]["iso3_code"], "BRA");
        assert_eq!(top.results[0]["rate_per_100k"], json!(80.0));
        assert_eq!(top.results[1]["rate_per_100k"], json!(75.5));
        assert!(top.results.iter().all(|r| r["year"] == 2019));
        assert!(top.results.iter().all(|r| !r.contains_key("value")));
    }

    #[test]
    fn test_defaults() {
        let ds = fixture();
        let top = top_rates(&ds, &query(&[("n", "many")]));
        assert_eq!(top.year, Some(2021));
        assert_eq!(top.results.len(), 1);
    }

    #[test]
    fn test_negative_n_drops_from_bottom() {
        let ds = fixture();
        let top = top_rates(&ds, &query(&[("year", "2020"), ("n", "-1")]));
        let codes: Vec<_> = top
            .results
            .iter()
            .map(|r| r["iso3_code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["BRA", "FRA"]);
    }
}
