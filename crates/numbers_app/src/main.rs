mod config;
mod logging;
mod server;

use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use engine_logging::{engine_info, engine_warn};
use numbers_engine::MergeEngine;

use config::Cli;
use logging::LogDestination;
use server::NumbersService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match Cli::parse().validate() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}\n");
            let _ = Cli::command().print_help();
            std::process::exit(1);
        }
    };

    logging::initialize(LogDestination::from_path(config.log_file.clone()));

    let engine = Arc::new(
        MergeEngine::start(config.engine_settings()).context("failed to start merge engine")?,
    );
    let service = NumbersService::new(engine.clone(), config.response_timeout);

    let served = server::serve(config.listen_addr(), service, shutdown_signal()).await;
    engine.shutdown().await;
    engine_info!("merge engine stopped");
    served
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        engine_warn!("failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    engine_info!("shutdown signal received");
}
