use serde::Serialize;
use std::{collections::BTreeMap, fmt};
use tracing::debug;

use crate::data::{utils::cmp_nulls_last, Dataset, Record, COUNTS_UNIT};
use crate::region::{region_map, resolve_placement, RegionMeans};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: i64,
    pub rate_per_100k: Option<f64>,
    pub count: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPoint {
    pub year: i64,
    pub rate_per_100k: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryDetail {
    pub iso3: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub series: Vec<SeriesPoint>,
    pub region_avg_latest: Option<f64>,
    pub region_avg_series: Vec<RegionPoint>,
}

/// The requested code has no rate rows with a usable year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryNotFound {
    pub iso3: String,
}

impl fmt::Display for CountryNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No data available for {}", self.iso3)
    }
}

impl std::error::Error for CountryNotFound {}

/// Full time series for one country with counts joined in and its region's
/// average trend alongside.
pub fn country_detail(ds: &Dataset, iso3: &str) -> Result<CountryDetail, CountryNotFound> {
    let iso3 = iso3.trim().to_uppercase();
    let not_found = || CountryNotFound { iso3: iso3.clone() };

    // 1) one rate point per year: year asc, highest value first, first wins
    let mut own: Vec<&Record> = ds
        .rates
        .rows
        .iter()
        .filter(|r| r.iso3_upper().as_deref() == Some(iso3.as_str()))
        .filter(|r| r.year.is_some())
        .collect();
    own.sort_by(|a, b| {
        cmp_nulls_last(a.year, b.year, false).then(cmp_nulls_last(a.value, b.value, true))
    });
    own.dedup_by_key(|r| r.year);
    if own.is_empty() {
        debug!(iso3 = %iso3, "no rate rows for country");
        return Err(not_found());
    }

    // 2) counts summed per year from the combined dataset
    let mut counts: BTreeMap<i64, f64> = BTreeMap::new();
    for rec in &ds.clean.rows {
        let is_counts = rec
            .unit
            .as_deref()
            .is_some_and(|u| u.to_lowercase() == COUNTS_UNIT);
        if !is_counts || rec.iso3_upper().as_deref() != Some(iso3.as_str()) {
            continue;
        }
        if let Some(year) = rec.year {
            *counts.entry(year).or_insert(0.0) += rec.value.unwrap_or(0.0);
        }
    }

    // 3) left join on year
    let series: Vec<SeriesPoint> = own
        .iter()
        .filter_map(|r| {
            let year = r.year?;
            Some(SeriesPoint {
                year,
                rate_per_100k: r.value,
                count: counts.get(&year).copied(),
            })
        })
        .collect();

    let placement = resolve_placement(&own, &ds.clean, &iso3);

    // 4) regional context, looking back from the country's latest year
    let mut region_avg_latest = None;
    let mut region_avg_series = Vec::new();
    if let (Some(region), Some(latest)) = (placement.region.as_deref(), series.last()) {
        let means = RegionMeans::compute(&ds.rates, &region_map(ds));
        region_avg_series = means
            .series(region)
            .into_iter()
            .map(|(year, rate_per_100k)| RegionPoint {
                year,
                rate_per_100k,
            })
            .collect();
        region_avg_latest = means.latest_at_or_before(region, latest.year);
    }

    Ok(CountryDetail {
        country: own[0].country.clone(),
        iso3,
        region: placement.region,
        subregion: placement.subregion,
        series,
        region_avg_latest,
        region_avg_series,
    })
}
