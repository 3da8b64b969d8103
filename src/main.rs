use std::{future::IntoFuture, process, sync::Arc, time::Duration};

use postcache::{
    application::{
        error::AppError,
        posts::{PostService, clear_cache_entry},
        repos::{PostsRepo, PostsWriteRepo},
    },
    cache::{self, CacheConfig},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use sqlx::PgPool;
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
        config::Command::ClearCache(args) => run_clear_cache(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_database(&settings).await?;
    PostgresRepositories::run_migrations(&pool).await?;

    let repositories = Arc::new(PostgresRepositories::new(pool));
    let cache_config = CacheConfig::from(&settings.cache);
    let store = cache::connect(&cache_config).await.map_err(InfraError::from)?;

    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories;
    let service = PostService::new(posts_repo, posts_write_repo, store, cache_config);

    serve_http(&settings, ApiState::new(service)).await
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_database(&settings).await?;
    PostgresRepositories::run_migrations(&pool).await?;
    info!(target = "postcache::migrate", "migrations applied");
    Ok(())
}

async fn run_clear_cache(
    settings: config::Settings,
    args: config::ClearCacheArgs,
) -> Result<(), AppError> {
    let cache_config = CacheConfig::from(&settings.cache);
    if cache_config.is_process_local() {
        return Err(InfraError::configuration(
            "clear-cache needs a shared cache backend; cache.backend is memory",
        )
        .into());
    }

    let store = cache::connect(&cache_config).await.map_err(InfraError::from)?;
    clear_cache_entry(store.as_ref(), Some(args.key.as_str())).await?;
    Ok(())
}

async fn connect_database(settings: &config::Settings) -> Result<PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await?;
    Ok(pool)
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;
    info!(
        target = "postcache::serve",
        addr = %settings.server.addr,
        "listening"
    );

    let stop = Arc::new(Notify::new());
    let server = {
        let stop = stop.clone();
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move { stop.notified().await })
            .into_future()
    };
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            return result.map_err(|err| AppError::from(InfraError::from(err)));
        }
        () = shutdown_signal() => {
            info!(target = "postcache::serve", "shutdown requested, draining connections");
            stop.notify_one();
        }
    }

    drain(server, settings.server.graceful_shutdown).await
}

async fn drain<F>(server: F, grace: Duration) -> Result<(), AppError>
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    match tokio::time::timeout(grace, server).await {
        Ok(result) => result.map_err(|err| AppError::from(InfraError::from(err))),
        Err(_) => {
            warn!(
                target = "postcache::serve",
                grace_secs = grace.as_secs(),
                "graceful shutdown timed out"
            );
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
