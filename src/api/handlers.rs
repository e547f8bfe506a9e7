use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::{convert::Infallible, sync::Arc};
use tracing::{debug, warn};
use warp::{
    http::StatusCode,
    reject::{MethodNotAllowed, Rejection},
    reply::{self, Reply, Response},
};

use crate::data::Dataset;
use crate::pages::Page;
use crate::query::{self, RatesParams};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_reply(status: StatusCode, error: impl Into<String>) -> Response {
    reply::with_status(
        reply::json(&ErrorResponse {
            error: error.into(),
        }),
        status,
    )
    .into_response()
}

pub async fn health_check() -> Result<impl Reply, Rejection> {
    Ok(reply::json(&serde_json::json!({ "ok": true })))
}

pub async fn list_rates(
    pairs: Vec<(String, String)>,
    ds: Arc<Dataset>,
) -> Result<impl Reply, Rejection> {
    let params = RatesParams::from_query(&pairs, &ds);
    let page = query::list_rates(&ds, &params);
    debug!(year = ?page.year, total = page.total, count = page.count, "rates page");
    Ok(reply::json(&page))
}

pub async fn country_detail(iso3: String, ds: Arc<Dataset>) -> Result<Response, Rejection> {
    // warp hands over the raw segment
    let iso3 = percent_decode_str(&iso3).decode_utf8_lossy();
    match query::country_detail(&ds, &iso3) {
        Ok(detail) => Ok(reply::json(&detail).into_response()),
        Err(not_found) => Ok(error_reply(StatusCode::NOT_FOUND, not_found.to_string())),
    }
}

pub async fn top_rates(
    pairs: Vec<(String, String)>,
    ds: Arc<Dataset>,
) -> Result<impl Reply, Rejection> {
    Ok(reply::json(&query::top_rates(&ds, &pairs)))
}

pub async fn render_page(page: Page, api_base: Arc<str>) -> Result<impl Reply, Rejection> {
    Ok(reply::html(page.render(&api_base)))
}

/// Turn leftover rejections into JSON errors.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if err.is_not_found() {
        return Ok(error_reply(StatusCode::NOT_FOUND, "Not Found"));
    }
    if err.find::<MethodNotAllowed>().is_some() {
        return Ok(error_reply(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"));
    }
    warn!("unhandled rejection: {:?}", err);
    Ok(error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
    ))
}
