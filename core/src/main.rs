//! The entrypoint to the gateway, connects to the chain node and serves the
//! HTTP API until the server fails

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

use std::sync::Arc;

use api_server::{ApiServerConfig, HttpServer, PoolConfig};
use chain_client::{
    client::{ChainClientConfig, RpcChainClient},
    context::ChainContext,
};
use config::GatewayConfig;
use eyre::{Result, eyre};
use task_driver::{TaskContext, TaskDriver};
use tracing::info;
use util::telemetry::configure_telemetry;

/// Build the task driver over a connection to the configured node
async fn build_driver(config: &GatewayConfig) -> Result<TaskDriver> {
    let client = RpcChainClient::new(&ChainClientConfig {
        rpc_url: config.rpc_url.clone(),
        block_polling_interval: config.receipt_poll_interval,
    })?;

    let chain = ChainContext::new(Arc::new(client)).await?;
    info!("connected to chain {} at {}", chain.chain_id(), config.rpc_url);

    let ctx = TaskContext {
        chain,
        gateway_key: config.gateway_key.clone(),
        permit_signer: config.permit_signer.clone(),
        contracts: config.contracts,
        receipt_timeout: config.receipt_timeout,
        receipt_poll_interval: config.receipt_poll_interval,
    };
    Ok(TaskDriver::new(ctx))
}

/// The pool parameters the server applies to requests
fn pool_config(config: &GatewayConfig) -> PoolConfig {
    PoolConfig {
        token0: config.token0,
        token1: config.token1,
        fee: config.fee,
        tick_spacing: config.tick_spacing,
        hooks: config.hooks,
        permit_deadline: config.permit_deadline,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::parse_command_line_args().map_err(|e| eyre!(e))?;
    configure_telemetry(config.debug, config.json_logs)?;

    info!(
        "gateway account {:#x}, permit signer {:#x}",
        config.gateway_key.address(),
        config.permit_signer.address()
    );

    let driver = build_driver(&config).await?;
    let server = HttpServer::new(ApiServerConfig {
        http_addr: config.http_addr(),
        driver,
        pool: pool_config(&config),
    })?;

    server.execution_loop().await?;
    Ok(())
}
