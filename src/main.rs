mod auth;
mod client;
mod config;
mod error;
mod jobs;
mod server;
mod trigger;

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use rmcp::ServiceExt;

use client::JenkinsClient;
use config::Config;
use server::JenkinsServer;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP transport; env_logger writes to stderr.
    env_logger::init();

    let config = Config::parse();
    info!("Starting jenkins-mcp against {}", config.url);
    if config.insecure_skip_tls_verify {
        warn!("TLS certificate verification is disabled");
    }

    let client = JenkinsClient::new(&config)?;

    let service = JenkinsServer::new(client)
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| eprintln!("MCP server error: {e}"))?;
    service.waiting().await?;

    Ok(())
}
