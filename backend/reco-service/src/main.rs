use actix_web::{dev::Service, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reco_engine::{CfConfig, EngineConfig, RecoEngine};
use reco_service::config::Config;
use reco_service::db::{CatalogRepo, InteractionRepo};
use reco_service::handlers::{
    get_explanations, get_health, get_homefeed, post_feedback, RecoHandlerState,
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting reco-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let db_pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    let engine_config = EngineConfig {
        embedding_dim: config.engine.embedding_dim,
        cf: CfConfig::default(),
    };

    // Prefer pre-trained artifacts; otherwise fit from the database.
    // A failed fit is fatal: serving an engine that silently ranks
    // nothing is worse than not starting.
    let engine = match load_or_fit(&db_pool, &config, engine_config).await {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            tracing::error!("Engine startup failed: {:#}", e);
            eprintln!("ERROR: Failed to initialize engine: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        items = engine.item_count().unwrap_or(0),
        interactions = engine.interaction_count().unwrap_or(0),
        "Engine ready"
    );

    if config.refresh.enabled {
        let job_db = db_pool.clone();
        let job_engine = Arc::clone(&engine);
        let job_config = config.refresh.clone();
        tokio::spawn(async move {
            reco_service::jobs::refresh::start_refresh_job(job_db, job_engine, job_config).await;
        });
        tracing::info!("Model refresh background job started");
    } else {
        tracing::info!("Model refresh disabled by configuration");
    }

    let state = web::Data::new(RecoHandlerState {
        engine,
        catalog: CatalogRepo::new(db_pool.clone()),
        interactions: InteractionRepo::new(db_pool.clone()),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .route("/metrics", web::get().to(reco_service::metrics::serve_metrics))
            .wrap_fn(|req, srv| {
                let method = req.method().to_string();
                let path = req
                    .match_pattern()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| req.path().to_string());
                let start = Instant::now();

                let fut = srv.call(req);
                async move {
                    match fut.await {
                        Ok(res) => {
                            reco_service::metrics::observe_http_request(
                                &method,
                                &path,
                                res.status().as_u16(),
                                start.elapsed(),
                            );
                            Ok(res)
                        }
                        Err(err) => {
                            reco_service::metrics::observe_http_request(
                                &method,
                                &path,
                                500,
                                start.elapsed(),
                            );
                            Err(err)
                        }
                    }
                }
            })
            .service(get_health)
            .service(get_homefeed)
            .service(post_feedback)
            .service(get_explanations)
    })
    .bind(format!("0.0.0.0:{}", config.app.port))?
    .run()
    .await
}

async fn load_or_fit(
    db_pool: &sqlx::PgPool,
    config: &Config,
    engine_config: EngineConfig,
) -> anyhow::Result<RecoEngine> {
    if let Some(dir) = &config.engine.model_dir {
        let path = Path::new(dir);
        if path.join("manifest.json").exists() {
            tracing::info!(model_dir = %dir, "Loading engine from artifacts");
            return Ok(RecoEngine::load_from_dir(path, engine_config)?);
        }
        tracing::warn!(
            model_dir = %dir,
            "No artifacts found, falling back to fitting from the database"
        );
    }

    tracing::info!("Fitting engine from database");
    let snapshot = CatalogRepo::new(db_pool.clone()).load_snapshot().await?;
    let engine = RecoEngine::new(engine_config);
    let engine = tokio::task::spawn_blocking(move || {
        engine.fit(&snapshot, chrono::Utc::now())?;
        Ok::<_, reco_engine::EngineError>(engine)
    })
    .await??;

    Ok(engine)
}
