//! Application wiring: database, Redis, storage, worker, routes.
//!
//! Every handle is constructed here and injected into the components that
//! need it; lifecycle is tied to startup/shutdown rather than module import.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

use lenta_core::{Config, ExecutionMode};
use lenta_db::{PostRepository, UserRepository};
use lenta_storage::{create_storage, Storage as _};
use lenta_worker::{JobQueue, PostIngestWorker, PostSubmissionService, TaskStatusStore, WorkerLoop};

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;

pub async fn initialize_app(
    config: &Config,
) -> anyhow::Result<(Arc<AppState>, Router, Option<mpsc::Sender<()>>)> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    lenta_db::MIGRATOR.run(&pool).await?;
    tracing::info!("database ready");

    let redis_client = redis::Client::open(config.redis_url.as_str())?;
    let redis = ConnectionManager::new(redis_client).await?;

    let storage = create_storage(config).await?;
    tracing::info!(backend = ?storage.backend_type(), "storage ready");

    let users = UserRepository::new(pool.clone());
    let posts = PostRepository::new(pool.clone());
    let status = TaskStatusStore::from_connection(redis.clone());

    let worker = Arc::new(PostIngestWorker::new(
        posts.clone(),
        storage,
        status.clone(),
        config.aspect_resolution,
    ));

    let (queue, worker_shutdown) = match config.execution_mode {
        ExecutionMode::Deferred => {
            let worker_loop =
                WorkerLoop::new(redis.clone(), worker.clone(), config.worker_concurrency);
            let shutdown = worker_loop.shutdown_handle();
            tokio::spawn(worker_loop.run());
            (JobQueue::deferred(redis), Some(shutdown))
        }
        ExecutionMode::Inline => (JobQueue::inline(worker.clone()), None),
    };
    tracing::info!(mode = %config.execution_mode, "job queue ready");

    let submission = PostSubmissionService::new(Arc::new(users), queue, Arc::new(status));

    let state = Arc::new(AppState { submission, posts });

    let router = Router::new()
        .route(
            &format!("{}/users/{{user_id}}/posts", API_PREFIX),
            post(handlers::submit_post),
        )
        .route(
            &format!("{}/tasks/{{task_id}}", API_PREFIX),
            get(handlers::get_task_status),
        )
        .route(
            &format!("{}/posts/{{post_id}}", API_PREFIX),
            get(handlers::get_post),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    Ok((state, router, worker_shutdown))
}

pub async fn start_server(
    config: &Config,
    router: Router,
    worker_shutdown: Option<mpsc::Sender<()>>,
) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "lenta api listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // ask the worker loop to stop once the server has drained
    if let Some(shutdown) = worker_shutdown {
        let _ = shutdown.send(()).await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install shutdown signal handler");
    }
}
