// src/region/mod.rs
use std::collections::{BTreeMap, HashMap};

use crate::data::{utils::trimmed, Dataset, Record, Table};

/// Region and subregion resolved for a single country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pub region: Option<String>,
    pub subregion: Option<String>,
}

/// Resolve a country's placement from its own rate rows first, then from its
/// rows in the combined dataset. Each field falls back independently.
pub fn resolve_placement(own_rows: &[&Record], clean: &Table, iso3: &str) -> Placement {
    let mut region = first_trimmed(own_rows.iter().copied(), |r| r.region.as_deref());
    let mut subregion = first_trimmed(own_rows.iter().copied(), |r| r.subregion.as_deref());

    let in_clean = |r: &&Record| r.iso3_upper().as_deref() == Some(iso3);
    if region.is_none() && clean.has_column("region") {
        region = first_trimmed(clean.rows.iter().filter(in_clean), |r| r.region.as_deref());
    }
    if subregion.is_none() && clean.has_column("subregion") {
        subregion = first_trimmed(clean.rows.iter().filter(in_clean), |r| {
            r.subregion.as_deref()
        });
    }

    Placement { region, subregion }
}

fn first_trimmed<'a>(
    rows: impl Iterator<Item = &'a Record>,
    pick: impl Fn(&'a Record) -> Option<&'a str>,
) -> Option<String> {
    rows.map(pick).find_map(trimmed)
}

/// Country → region for every country either table can place.
/// The combined dataset wins; the rate table only fills countries it lacks.
/// Keys are upper-cased and trimmed, regions trimmed, first row per country wins.
pub fn region_map(ds: &Dataset) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for table in [&ds.clean, &ds.rates] {
        for rec in &table.rows {
            let (Some(iso), Some(region)) = (
                rec.iso3_code.as_deref().map(|s| s.trim().to_uppercase()),
                trimmed(rec.region.as_deref()),
            ) else {
                continue;
            };
            map.entry(iso).or_insert(region);
        }
    }
    map
}

/// Mean rate per `(region, year)`, years ascending within each region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionMeans {
    by_region: HashMap<String, BTreeMap<i64, f64>>,
}

impl RegionMeans {
    /// Average `value` over every rate row whose country is placed by `map`
    /// and which has both a year and a value.
    pub fn compute(rates: &Table, map: &HashMap<String, String>) -> Self {
        let mut acc: HashMap<&str, BTreeMap<i64, (f64, usize)>> = HashMap::new();
        for rec in &rates.rows {
            let (Some(year), Some(value)) = (rec.year, rec.value) else {
                continue;
            };
            let Some(region) = rec
                .iso3_code
                .as_deref()
                .and_then(|iso| map.get(&iso.trim().to_uppercase()))
            else {
                continue;
            };
            let slot = acc
                .entry(region.as_str())
                .or_default()
                .entry(year)
                .or_insert((0.0, 0));
            slot.0 += value;
            slot.1 += 1;
        }

        let by_region = acc
            .into_iter()
            .map(|(region, years)| {
                let means = years
                    .into_iter()
                    .map(|(year, (sum, n))| (year, sum / n as f64))
                    .collect();
                (region.to_string(), means)
            })
            .collect();
        Self { by_region }
    }

    /// `(year, mean)` for one region, ascending by year.
    pub fn series(&self, region: &str) -> Vec<(i64, f64)> {
        self.by_region
            .get(region)
            .map(|years| years.iter().map(|(y, v)| (*y, *v)).collect())
            .unwrap_or_default()
    }

    /// The region's mean at the latest year not after `year`.
    pub fn latest_at_or_before(&self, region: &str, year: i64) -> Option<f64> {
        self.by_region
            .get(region)?
            .range(..=year)
            .next_back()
            .map(|(_, v)| *v)
    }
}
