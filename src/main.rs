//! `live-status` binary: runs one dashboard session against the configured
//! endpoint and redraws it on stdout whenever its state changes.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use live_status::adapters::WebSocketTransport;
use live_status::application::spawn_session;
use live_status::config::{AppConfig, LogFormat, LoggingConfig};
use live_status::domain::telemetry::{DashboardKind, DashboardState};
use live_status::view::{render_debug, render_monitor, LogListRenderer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("live-status: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging);

    let settings = match config.prepare_session() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let kind = settings.kind;
    let transport = Arc::new(WebSocketTransport::new(config.endpoint.connect_timeout()));
    let handle = spawn_session(settings, transport);
    let mut state = handle.state();
    let mut console = LogListRenderer::new(config.logs.virtual_list());

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        let frame = {
            let current = state.borrow_and_update();
            draw(kind, &current, &mut console)
        };
        let mut stdout = std::io::stdout().lock();
        if writeln!(stdout, "\x1b[2J\x1b[H{}", frame)
            .and_then(|_| stdout.flush())
            .is_err()
        {
            break;
        }
        drop(stdout);

        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = &mut interrupted => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
        }
    }

    handle.shutdown().await;
    ExitCode::SUCCESS
}

fn draw(kind: DashboardKind, state: &DashboardState, console: &mut LogListRenderer) -> String {
    match kind {
        DashboardKind::Debug => render_debug(state),
        DashboardKind::Monitor => {
            console.sync(&state.logs);
            render_monitor(state, console)
        }
    }
}

/// Diagnostics go to stderr so they never interleave with the dashboard.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
