//! `figurag-server`: JSON API over the engine.

use clap::Parser;
use std::sync::Arc;
use tracing::info;

use figurag_cli::env_file::load_env_file;
use figurag_cli::init_tracing;
use figurag_cli::server::{build_router, AppState};
use figurag_core::config::Config;
use figurag_engine::build_engine;

#[derive(Parser)]
#[command(name = "figurag-server", version, about = "FigureYa Q&A HTTP server")]
struct Cli {
    /// Overrides server.host
    #[arg(long)]
    host: Option<String>,
    /// Overrides server.port
    #[arg(short, long)]
    port: Option<u16>,
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    load_env_file(std::path::Path::new(".env"))?;
    let settings = Config::load()?.settings()?;

    // Built outside the runtime: blocking HTTP clients must not be created
    // or dropped on an async worker.
    let engine = Arc::new(build_engine(&settings, &std::env::current_dir()?));
    let addr = format!(
        "{}:{}",
        cli.host.unwrap_or(settings.server.host),
        cli.port.unwrap_or(settings.server.port)
    );
    let status = engine.status();
    info!(source = status.source, size = status.knowledge_size, llm = ?status.llm, "Engine ready");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let app = build_router(AppState::new(engine.clone()));
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(%addr, "Listening");
        axum::serve(listener, app).await?;
        anyhow::Ok(())
    })?;
    drop(runtime);
    drop(engine);
    Ok(())
}
