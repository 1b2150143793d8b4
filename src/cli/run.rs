//! Run command implementation

use crate::api::{create_router, AppState};
use crate::cli::RunArgs;
use crate::config::{GuardianConfig, LogFormat};
use crate::fleet::GuardianRuntime;
use crate::probe::HttpHealthCheck;
use crate::restart::CommandRestarter;
use crate::scheduler::GuardianScheduler;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &RunArgs,
) -> Result<GuardianConfig, Box<dyn std::error::Error>> {
    let mut config = GuardianConfig::load(Some(&args.config))?;

    config = config.with_env_overrides();

    // CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.paused {
        config.guardian.start_active = false;
    }
    if args.no_api {
        config.server.enabled = false;
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => {}
    }

    cancel_token.cancel();
}

/// Main run command handler
pub async fn run_guardian(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load, merge and validate configuration
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;

    tracing::info!(
        nodes = config.nodes.len(),
        max_failures = config.guardian.max_failures,
        max_restarts = config.guardian.max_restarts,
        availability_floor = config.guardian.availability_floor,
        "Starting fleet guardian"
    );
    tracing::debug!(?config, "Loaded configuration");

    // 3. Shared state and collaborators
    let runtime = Arc::new(GuardianRuntime::new(&config));
    let health_check = Arc::new(HttpHealthCheck::new(config.guardian.health_path.clone())?);
    let restarter = Arc::new(CommandRestarter::new(&config.restart));

    // 4. Start the control loop
    let cancel_token = CancellationToken::new();
    let scheduler =
        GuardianScheduler::new(&config, Arc::clone(&runtime), health_check, restarter);
    let guardian_handle = scheduler.start(cancel_token.clone());

    // 5. Serve the status/control API, or just wait for a signal
    if config.server.enabled {
        let state = AppState::new(Arc::clone(&runtime))
            .with_request_timeout(Duration::from_secs(config.server.request_timeout_seconds));
        let app = create_router(Arc::new(state));

        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(addr = %addr, "Guardian API listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
            .await?;
    } else {
        tracing::info!("Guardian API disabled");
        shutdown_signal(cancel_token.clone()).await;
    }

    // 6. Cleanup
    cancel_token.cancel();
    tracing::info!("Waiting for guardian loop to stop");
    let final_snapshot = guardian_handle.await?;

    tracing::info!(
        crashed = final_snapshot.count(crate::fleet::NodeState::Crashed),
        "Fleet guardian stopped"
    );
    Ok(())
}
