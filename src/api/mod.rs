// src/api/mod.rs
pub mod handlers;

use std::{convert::Infallible, path::PathBuf, sync::Arc};
use warp::{Filter, Rejection, Reply};

use crate::data::Dataset;
use crate::pages::Page;

fn with_dataset(
    ds: Arc<Dataset>,
) -> impl Filter<Extract = (Arc<Dataset>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&ds))
}

fn query_pairs() -> impl Filter<Extract = (Vec<(String, String)>,), Error = Rejection> + Copy {
    warp::query::<Vec<(String, String)>>()
}

/// JSON endpoints: `/health`, `/rates`, `/country/{iso3}`, `/top`.
pub fn api(
    ds: Arc<Dataset>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let health = warp::path!("health")
        .and(warp::get())
        .and_then(handlers::health_check);

    let rates = warp::path!("rates")
        .and(warp::get())
        .and(query_pairs())
        .and(with_dataset(ds.clone()))
        .and_then(handlers::list_rates);

    let country = warp::path!("country" / String)
        .and(warp::get())
        .and(with_dataset(ds.clone()))
        .and_then(handlers::country_detail);

    let top = warp::path!("top")
        .and(warp::get())
        .and(query_pairs())
        .and(with_dataset(ds))
        .and_then(handlers::top_rates);

    health.or(rates).or(country).or(top)
}

fn with_api_base(
    api_base: Arc<str>,
) -> impl Filter<Extract = (Arc<str>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&api_base))
}

fn named_page(
    page: Page,
    api_base: Arc<str>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path(page.segment())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_api_base(api_base))
        .and_then(move |base| handlers::render_page(page, base))
}

/// The five fixed HTML pages plus `/static/...` assets.
pub fn site(
    api_base: Arc<str>,
    static_dir: PathBuf,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .and(with_api_base(api_base.clone()))
        .and_then(|base| handlers::render_page(Page::Index, base));

    let pages = index
        .or(named_page(Page::GlobalReach, api_base.clone()))
        .or(named_page(Page::RaisingAwareness, api_base.clone()))
        .or(named_page(Page::UnderstandingTheIssue, api_base.clone()))
        .or(named_page(Page::WhatYouCanDo, api_base));

    let assets = warp::path("static").and(warp::fs::dir(static_dir));

    pages.or(assets)
}

/// Every route, with request tracing and JSON error recovery.
pub fn routes(
    ds: Arc<Dataset>,
    api_base: Arc<str>,
    static_dir: PathBuf,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    api(ds)
        .or(site(api_base, static_dir))
        .recover(handlers::handle_rejection)
        .with(warp::trace::request())
}
