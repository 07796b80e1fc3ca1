//! `snake-serve` - static file server binary

use anyhow::Context;
use clap::Parser;
use mimalloc::MiMalloc;

use snake_serve::cli::Cli;
use snake_serve::{init_logging, Server, ServerConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    let mut config = ServerConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;
    cli.apply(&mut config);
    config.validate()?;

    if !config.root.is_dir() {
        tracing::warn!(root = %config.root.display(), "served root is not a directory");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    runtime.block_on(async {
        let server = Server::bind(&config)
            .with_context(|| format!("failed to bind {}:{}", config.hostname, config.port))?;
        let addr = server.local_addr()?;

        tracing::info!(
            root = %config.root.display(),
            mime = %config.mime,
            workers = config.workers,
            "Server running at http://{}/",
            addr
        );

        server.run_until(shutdown_signal()).await?;
        Ok::<(), anyhow::Error>(())
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
