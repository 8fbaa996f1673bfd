//! contentplan monitor
//!
//! Serves health and monitoring dashboards for the content-planning core.

#![allow(missing_docs)]

use actix_web::dev::Service;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, HttpServer, web};
use anyhow::Context;
use clap::Parser;
use contentplan_core::storage::DatabaseProbe;
use contentplan_core::{
    ConnectionManager, CoreConfig, CoreError, MetricsStore, MonitoringService, SeaOrmDriver,
};
use futures::FutureExt;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

const DEFAULT_WINDOW_MS: u64 = 3_600_000;
const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Parser)]
#[command(name = "monitor", version, about = "Health and monitoring endpoints for contentplan")]
struct Args {
    /// YAML configuration file; environment variables are used when omitted
    #[arg(short, long, env = "CONTENTPLAN_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "BIND_HOST", default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    json_logs: bool,
}

struct AppState {
    monitoring: Arc<MonitoringService>,
    database: ConnectionManager<SeaOrmDriver>,
}

#[derive(Debug, Deserialize)]
struct WindowQuery {
    window_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

impl LimitQuery {
    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn error_response(error: &CoreError) -> HttpResponse {
    let status = StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(json!({
        "error": error.to_string(),
        "classification": error.classification(),
    }))
}

async fn health(state: web::Data<AppState>) -> HttpResponse {
    let report = state.monitoring.health_report().await;
    let status = StatusCode::from_u16(report.http_status()).unwrap_or(StatusCode::OK);
    HttpResponse::build(status).json(report)
}

async fn dashboard(state: web::Data<AppState>, query: web::Query<WindowQuery>) -> HttpResponse {
    let window = Duration::from_millis(query.window_ms.unwrap_or(DEFAULT_WINDOW_MS));
    HttpResponse::Ok().json(state.monitoring.get_dashboard_data(window))
}

async fn stats(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.monitoring.get_monitoring_stats())
}

async fn alerts(state: web::Data<AppState>, query: web::Query<LimitQuery>) -> HttpResponse {
    HttpResponse::Ok().json(state.monitoring.get_recent_alerts(query.limit()))
}

async fn resolve_alert(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    let id = id.into_inner();
    if state.monitoring.resolve_alert(&id) {
        HttpResponse::Ok().json(json!({ "id": id, "resolved": true }))
    } else {
        error_response(&CoreError::not_found(format!("No unresolved alert with id {}", id)))
    }
}

async fn errors(state: web::Data<AppState>, query: web::Query<LimitQuery>) -> HttpResponse {
    HttpResponse::Ok().json(state.monitoring.get_recent_errors(query.limit()))
}

async fn database_status(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.database.get_status())
}

async fn database_queries(state: web::Data<AppState>, query: web::Query<LimitQuery>) -> HttpResponse {
    HttpResponse::Ok().json(state.database.get_query_history(query.limit()))
}

async fn database_refresh(state: web::Data<AppState>) -> HttpResponse {
    match state.database.refresh_pool().await {
        Ok(()) => HttpResponse::Ok().json(state.database.get_status()),
        Err(e) => {
            warn!("Manual pool refresh failed: {}", e);
            error_response(&e)
        }
    }
}

fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health)).service(
        web::scope("/monitoring")
            .route("/dashboard", web::get().to(dashboard))
            .route("/stats", web::get().to(stats))
            .route("/alerts", web::get().to(alerts))
            .route("/alerts/{id}/resolve", web::post().to(resolve_alert))
            .route("/errors", web::get().to(errors))
            .route("/database", web::get().to(database_status))
            .route("/database/queries", web::get().to(database_queries))
            .route("/database/refresh", web::post().to(database_refresh)),
    );
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = CoreConfig::load(args.config.as_deref())
        .await
        .with_context(|| match &args.config {
            Some(path) => format!("loading {} with environment overrides", path.display()),
            None => "loading configuration from environment".to_string(),
        })?;
    info!(
        service = %config.service_name,
        environment = %config.environment,
        "Starting contentplan monitor"
    );

    let metrics = Arc::new(MetricsStore::new(&config.monitoring));
    let metrics_cleanup = metrics.start_cleanup(config.monitoring.cleanup_interval());

    let database = ConnectionManager::new(
        SeaOrmDriver::new(),
        config.database.clone(),
        config.resilience.clone(),
        Arc::clone(&metrics),
    );
    if let Err(e) = database.initialize().await {
        // Health monitoring keeps probing and reconnects once the store is back
        warn!("Starting without a database connection: {}", e);
    }
    database.start_health_monitoring();

    let probe: Arc<dyn DatabaseProbe> = Arc::new(database.clone());
    let monitoring = Arc::new(MonitoringService::new(&config, Arc::clone(&metrics), Some(probe)));
    monitoring.start();

    let state = web::Data::new(AppState {
        monitoring: Arc::clone(&monitoring),
        database: database.clone(),
    });

    let bind_addr = format!("{}:{}", args.host, args.port);
    info!("Listening on {}", bind_addr);

    let request_metrics = Arc::clone(&metrics);
    HttpServer::new(move || {
        let metrics = Arc::clone(&request_metrics);
        App::new()
            .app_data(state.clone())
            .wrap_fn(move |req, srv| {
                let metrics = Arc::clone(&metrics);
                let endpoint = req.match_pattern().unwrap_or_else(|| req.path().to_string());
                let method = req.method().to_string();
                let start = Instant::now();
                srv.call(req).map(move |res| {
                    if let Ok(response) = &res {
                        metrics.record_api_response_time(
                            &endpoint,
                            &method,
                            start.elapsed().as_secs_f64() * 1000.0,
                            response.status().as_u16(),
                        );
                    }
                    res
                })
            })
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .bind(&bind_addr)
    .with_context(|| format!("binding {}", bind_addr))?
    .run()
    .await
    .context("server error")?;

    info!("Shutting down");
    monitoring.stop();
    metrics_cleanup.abort();
    database.shutdown().await?;
    Ok(())
}

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.json_logs);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
