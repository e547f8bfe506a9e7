use anyhow::{Context, Result};
use std::{env, sync::Arc};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};
use unodc_rates::{api, config::Config, data::Dataset};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .init();

    // ─── 2) configuration ────────────────────────────────────────────
    let config = Config::from_env()?;
    info!(?config, "startup");

    // ─── 3) load both datasets before accepting connections ──────────
    let rate_path = config.rate_path.clone();
    let clean_path = config.clean_path.clone();
    let dataset = tokio::task::spawn_blocking(move || Dataset::load(&rate_path, &clean_path))
        .await
        .context("dataset loader task panicked")??;
    info!(
        rates = dataset.rates.rows.len(),
        clean = dataset.clean.rows.len(),
        latest_year = ?dataset.rates.max_year(),
        "datasets ready"
    );

    // ─── 4) serve ────────────────────────────────────────────────────
    let routes = api::routes(
        Arc::new(dataset),
        Arc::from(config.api_base.as_str()),
        config.static_dir.clone(),
    );

    let addr = config.addr();
    info!("Server starting on {}", addr);
    info!("Health check: http://{}/health", addr);

    let (bound, server) = warp::serve(routes).try_bind_with_graceful_shutdown(addr, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown requested");
    })
    .with_context(|| format!("binding {}", addr))?;
    info!("listening on {}", bound);
    server.await;

    info!("all done");
    Ok(())
}
