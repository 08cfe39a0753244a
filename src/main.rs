use std::net::SocketAddr;
use std::sync::Arc;

use ats_backend::repository::postgres::{PgCandidateRepository, PgJobRepository};
use ats_backend::services::scheduler_service::DispatchScheduler;
use ats_backend::services::scoring_service::{ScorerClient, ScoringDispatcher};
use ats_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::rate_limit::{throttle_middleware, Throttle},
    routes, AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool.clone())?;

    // The dispatcher gets its own repository handles; it runs off the cron
    // schedule, not the request path.
    let scorer = ScorerClient::new(config.scorer_webhook_url.clone());
    let dispatcher = Arc::new(ScoringDispatcher::new(
        Arc::new(PgCandidateRepository::new(pool.clone())),
        Arc::new(PgJobRepository::new(pool)),
        scorer,
        config.dispatch_batch_size,
    ));
    let mut scheduler = DispatchScheduler::start(dispatcher, &config.dispatch_cron).await?;

    let api_throttle = Throttle::new("api", config.api_rps);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let form_api = Router::new()
        .route("/api/form/submit", post(routes::form::submit_application))
        .route(
            "/api/form/update-status/:id",
            post(routes::form::update_status),
        )
        .route(
            "/api/form/update-interview-status/:id",
            post(routes::form::update_interview_status),
        )
        .layer(axum::middleware::from_fn_with_state(
            Throttle::new("form", config.form_rps),
            throttle_middleware,
        ));

    let candidates_api = Router::new()
        .route(
            "/api/candidates/held",
            get(routes::candidates::get_held_candidates),
        )
        .route(
            "/api/candidates/available-jobs/:team",
            get(routes::candidates::get_available_jobs),
        )
        .route(
            "/api/candidates/move-to-job",
            post(routes::candidates::move_to_job),
        )
        .route(
            "/api/candidates/by-team/:team",
            get(routes::candidates::get_candidates_by_team),
        )
        .layer(axum::middleware::from_fn_with_state(
            api_throttle.clone(),
            throttle_middleware,
        ));

    let n8n_api = Router::new()
        .route("/api/n8n/generate-jd", post(routes::scoring::generate_jd))
        .route("/api/n8n/jd-complete", post(routes::scoring::jd_complete))
        .route(
            "/api/n8n/resume-score-complete",
            post(routes::scoring::resume_score_complete),
        )
        .layer(axum::middleware::from_fn_with_state(
            api_throttle,
            throttle_middleware,
        ));

    info!("Serving uploads from: {}", config.uploads_dir);

    let app = base_routes
        .merge(form_api)
        .merge(candidates_api)
        .merge(n8n_api)
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(&config.uploads_dir),
        )
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop().await?;
    Ok(())
}
