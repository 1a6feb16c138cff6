//! Taleweaver CLI and REST API entry point.
//!
//! Binary name: `taleweaver`
//!
//! Parses CLI arguments, initializes the database and generation backend,
//! then dispatches to a command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use taleweaver_observe::tracing_setup::{init_tracing, shutdown_tracing};
use taleweaver_types::tale::GenerateTaleRequest;

use cli::{Cli, Commands, ListResource};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,taleweaver=debug",
        _ => "trace",
    };
    init_tracing(filter, cli.otel).map_err(|e| anyhow::anyhow!(e))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "taleweaver", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Initialize application state (DB, backend, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!();
                println!(
                    "  {} Taleweaver API listening on {}",
                    console::style("✦").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!(
                    "  {}",
                    console::style(format!(
                        "Backend: {}",
                        state.tale_service.synthesizer().backend_name().unwrap_or("none (templates)")
                    ))
                    .dim()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }
            tracing::info!(%addr, "server started");

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Generate {
            age,
            topic,
            setting,
            characters,
            mood,
        } => {
            let request = GenerateTaleRequest {
                child_age: Some(age),
                topic: Some(topic),
                setting,
                characters,
                mood,
            };
            cli::tale::generate(&state, request, cli.json, cli.quiet).await?;
        }

        Commands::List { resource } => match resource {
            ListResource::Public { viewer } => {
                cli::tale::list_public(&state, viewer, cli.json).await?;
            }
            ListResource::Mine { user } => {
                cli::tale::list_mine(&state, user, cli.json).await?;
            }
        },

        Commands::CheckBackend => {
            cli::backend::check_backend(&state, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
