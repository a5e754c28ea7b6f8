//! Pharmacy admin dashboard.
//!
//! Serves the dashboard on port 3001 (see [`AdminConfig`] for settings).
//! All data is read from and written to the pharmacy REST API configured by
//! `API_BASE_URL`.
//!
//! # Logging
//!
//! Text logs locally; JSON logs when `LOG_FORMAT=json` or on Fly.io. Levels
//! follow `RUST_LOG`, defaulting to `pharmacy_admin=info,tower_http=debug`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use secrecy::ExposeSecret;
use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pharmacy_admin::api::ApiError;
use pharmacy_admin::config::{AdminConfig, ConfigError, SentryConfig, TlsConfig};
use pharmacy_admin::state::AppState;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("API client: {0}")]
    Api(#[from] ApiError),
    #[error("rustls crypto provider already installed")]
    CryptoProvider,
    #[error("TLS certificates: {0}")]
    Tls(std::io::Error),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

fn init_sentry(sentry: &SentryConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = sentry.dsn.as_deref()?;
    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: sentry.environment.clone().map(Into::into),
            sample_rate: sentry.sample_rate,
            traces_sample_rate: sentry.traces_sample_rate,
            attach_stacktrace: true,
            // customer names and phone numbers stay out of reports
            send_default_pii: false,
            ..Default::default()
        },
    ));
    Some(guard)
}

/// Warnings and errors become Sentry events; info and debug ride along as breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn json_logs() -> bool {
    std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"))
        || std::env::var("FLY_APP_NAME").is_ok()
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pharmacy_admin=info,tower_http=debug".into());

    let json = json_logs();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true)))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AdminConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // tracing is not up yet
            #[allow(clippy::print_stderr)]
            {
                eprintln!("pharmacy-admin: {e}");
            }
            return ExitCode::FAILURE;
        }
    };

    // the Sentry client has to exist before the tracing layer that feeds it
    let _sentry = init_sentry(&config.sentry);
    init_tracing();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Dashboard stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AdminConfig) -> Result<(), StartupError> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| StartupError::CryptoProvider)?;

    let addr = config.socket_addr();
    let tls = config.tls.clone();
    let state = AppState::new(config)?;
    tracing::info!(api = %state.config().api.base_url, "Pharmacy API client ready");

    let app = pharmacy_admin::app(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    match tls {
        Some(tls) => serve_https(addr, &tls, app).await,
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, "Dashboard listening on http");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            Ok(())
        }
    }
}

async fn serve_https(addr: std::net::SocketAddr, tls: &TlsConfig, app: Router) -> Result<(), StartupError> {
    let rustls = RustlsConfig::from_pem(
        tls.cert_pem.as_bytes().to_vec(),
        tls.key_pem.expose_secret().as_bytes().to_vec(),
    )
    .await
    .map_err(StartupError::Tls)?;

    let handle = Handle::new();
    let on_signal = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        on_signal.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    tracing::info!(%addr, "Dashboard listening on https");
    axum_server::bind_rustls(addr, rustls)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM. A handler that fails to install never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutting down");
}
