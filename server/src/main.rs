//! dev-helper binary — thin CLI shell over the [`devhelper_server`] library crate.

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use devhelper_core::StaticDocuments;
use devhelper_server::types::AppContext;
use devhelper_server::{build_router, load_devhelper_config};

// ---------------------------------------------------------------------------
// CLI definition (clap derive)
// ---------------------------------------------------------------------------

/// Local HTTP tool server — list, read and write project files, run npm scripts.
#[derive(Parser)]
#[command(name = "dev-helper", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project root directory (default: $PROJECT_ROOT, then current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Listen port (default: $PORT, then .devhelper.toml, then 3000)
    #[arg(long)]
    port: Option<u16>,

    /// Bind to 0.0.0.0 instead of 127.0.0.1 (localhost)
    #[arg(long)]
    bind_all: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Graceful shutdown signal
// ---------------------------------------------------------------------------

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received SIGINT, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                error!(error = %e, "Could not register SIGTERM handler");
                let _ = ctrl_c.await;
                info!("Received SIGINT, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("Received Ctrl+C, shutting down...");
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    // Initialize structured logging
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "devhelper=info".parse::<tracing_subscriber::filter::Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "dev-helper", &mut std::io::stdout());
        return;
    }

    // Project root: --root, then PROJECT_ROOT, then cwd
    let project_root = match cli.root.or_else(|| std::env::var_os("PROJECT_ROOT").map(PathBuf::from)) {
        Some(root) => root,
        None => std::env::current_dir().unwrap_or_else(|e| {
            error!(error = %e, "Could not determine current directory. Use --root <path>");
            std::process::exit(1);
        }),
    };
    let project_root = project_root.canonicalize().unwrap_or_else(|e| {
        error!(root = %project_root.display(), error = %e, "Project root not found");
        std::process::exit(1);
    });

    let mut config = load_devhelper_config(&project_root);

    // Port: --port, then PORT, then .devhelper.toml / default
    let env_port: Option<u16> = std::env::var("PORT").ok().and_then(|p| p.parse().ok());
    if let Some(port) = cli.port.or(env_port) {
        config.port = port;
    }
    config.bind_all = cli.bind_all;

    let bind_addr = config.bind_addr();
    info!(
        root = %config.project_root.display(),
        heartbeat_secs = config.heartbeat.as_secs(),
        npm = config.npm_command.as_str(),
        "Configuration loaded"
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap_or_else(|e| {
        error!(addr = bind_addr.as_str(), error = %e, "Could not bind");
        eprintln!("  Choose a different port with --port or PORT=<port>.");
        std::process::exit(1);
    });
    let port = listener.local_addr().map(|a| a.port()).unwrap_or(config.port);

    let ctx = AppContext::new(config, Arc::new(StaticDocuments::builtin()));
    let shutdown = ctx.shutdown.clone();
    let app = build_router(ctx);

    info!(port = port, "Dev helper running on http://localhost:{port}");
    info!("Tools available at http://localhost:{port}/tools/*");

    // Cancelling the token ends open SSE streams, so the graceful wait can finish
    let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        shutdown.cancel();
    });
    if let Err(e) = serve.await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
