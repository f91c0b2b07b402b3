mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use httpwatch::http::Client;
use httpwatch::session::Session;
use httpwatch::watch::{FsWatcher, WatchCoordinator};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.into_raw_config()?.validate()?;

    // 初始化日志系统
    httpwatch::logger::init_logger(config.verbose);
    tracing::debug!("Configuration loaded successfully: {:?}", config);

    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let transport = Client::new(config.request_timeout)?;
    let session = Arc::new(Session::new(config.clone(), cwd, transport));

    // 启动时先执行一次，之后再开始监听
    session.run_and_report().await;

    let (watcher, channels) = FsWatcher::start(&config.watch)?;
    let coordinator = WatchCoordinator::new(Arc::clone(&session), config.exclusions.clone(), config.debounce);
    let watch_loop = tokio::spawn(coordinator.run(channels.events, channels.errors));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    drop(watcher);
    watch_loop.abort();
    Ok(())
}
