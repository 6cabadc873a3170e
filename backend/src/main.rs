//! Spending API entry-point: loads settings, connects adapters and serves
//! the REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServerSettings, create_server};
use spending_api::inbound::http::health::HealthState;
use spending_api::outbound::cache::{CacheTtl, RedisResponseCache};
use spending_api::outbound::elasticsearch::ElasticsearchTransactionSearch;
use spending_api::outbound::persistence::{DbPool, PoolConfig};

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

async fn build_config(settings: &ServerSettings) -> std::io::Result<ServerConfig> {
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| io_error("settings", err))?;
    let files_base_url = settings
        .files_base_url()
        .map_err(|err| io_error("settings", err))?;
    let mut config = ServerConfig::new(bind_addr, files_base_url)
        .with_download_limit(settings.download_limit());

    if let Some(url) = &settings.database_url {
        let pool = DbPool::new(PoolConfig::new(url.as_str()).with_max_size(settings.db_pool_size))
            .await
            .map_err(|err| io_error("database pool", err))?;
        config = config.with_db_pool(pool);
    } else {
        warn!("no database url configured; serving fixture data");
    }

    match settings
        .elasticsearch_url()
        .map_err(|err| io_error("settings", err))?
    {
        Some(url) => {
            let search = ElasticsearchTransactionSearch::new(
                &url,
                settings.elasticsearch_index(),
                settings.elasticsearch_timeout(),
            )
            .map_err(|err| io_error("elasticsearch", err))?;
            config = config.with_search(Arc::new(search));
        }
        None => warn!("no elasticsearch url configured; search returns no hits"),
    }

    if let Some(url) = &settings.redis_url {
        let ttl = CacheTtl::new(settings.cache_ttl(), settings.cache_jitter());
        let cache = RedisResponseCache::connect(url, settings.redis_pool_size, ttl)
            .await
            .map_err(|err| io_error("redis", err))?;
        config = config.with_cache(Arc::new(cache));
    }

    #[cfg(feature = "metrics")]
    {
        let prometheus = PrometheusMetricsBuilder::new("spending_api")
            .endpoint("/metrics")
            .build()
            .map_err(|err| io_error("prometheus", err))?;
        config = config.with_metrics(Some(prometheus));
    }

    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|err| io_error("settings", err))?;
    let config = build_config(&settings).await?;
    info!(bind_addr = %config.bind_addr(), "starting spending api");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
