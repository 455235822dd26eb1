//! The gateway CLI and config definitions

use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use alloy_primitives::Address;
use clap::Parser;
use common::types::{
    chain::ContractAddresses,
    pool::{InvalidPoolKey, PoolKey},
};
use gateway_crypto::keys::SigningKey;
use serde::{Deserialize, Serialize};

// -------
// | CLI |
// -------

/// Defines the gateway command line interface
#[derive(Debug, Parser, Serialize, Deserialize)]
#[clap(author, about, long_about = None, args_override_self = true)]
#[rustfmt::skip]
pub struct Cli {
    // ---------------
    // | Config File |
    // ---------------
    /// A TOML config file to read options from
    ///
    /// Keys are the long option names; options given on the command line take precedence
    #[clap(long, value_parser)]
    pub config_file: Option<String>,

    // ----------------------
    // | Chain Connectivity |
    // ----------------------

    /// The RPC url of the chain node
    #[clap(long, value_parser, env = "RPC_URL", default_value = constants::DEFAULT_RPC_URL)]
    pub rpc_url: String,
    /// The hex encoded private key the gateway sends transactions from
    ///
    /// Defaults to the first prefunded account of a local development node
    #[clap(long, value_parser, env = "PRIVATE_KEY", default_value = constants::DEV_PRIVATE_KEY)]
    pub private_key: String,
    /// The hex encoded private key that authors permits
    #[clap(long, value_parser, env = "PERMIT_SIGNER_KEY")]
    pub permit_signer_key: Option<String>,
    /// A seed from which the permit signer's key is derived as its keccak hash
    ///
    /// Used when no permit signer key is given, defaults to "alice"
    #[clap(long, value_parser, env = "PERMIT_SIGNER_SEED")]
    pub permit_signer_seed: Option<String>,

    // -------------
    // | Contracts |
    // -------------

    /// The address of the pool manager
    #[clap(long, value_parser, env = "POOL_MANAGER")]
    pub pool_manager: String,
    /// The address of the swap router
    #[clap(long, value_parser, env = "SWAP_ROUTER")]
    pub swap_router: String,
    /// The address of the liquidity router
    #[clap(long, value_parser, env = "LP_ROUTER")]
    pub lp_router: String,
    /// The hooks contract of the pools the gateway addresses
    #[clap(long, value_parser, env = "HOOKS", default_value = "0x0000000000000000000000000000000000000000")]
    pub hooks: String,
    /// The first currency of requests that do not name one
    #[clap(long, value_parser, env = "TOKEN0")]
    pub token0: Option<String>,
    /// The second currency of requests that do not name one
    #[clap(long, value_parser, env = "TOKEN1")]
    pub token1: Option<String>,

    // ----------------------
    // | Pool Configuration |
    // ----------------------

    /// The fee tier of the pools the gateway addresses, in hundredths of a bip
    #[clap(long, value_parser, default_value = "3000")]
    pub fee: u32,
    /// The tick spacing of the pools the gateway addresses
    #[clap(long, value_parser, default_value = "60")]
    pub tick_spacing: i32,

    // -------------------------
    // | Transaction Lifecycle |
    // -------------------------

    /// The time to wait for a submitted transaction to be mined, in milliseconds
    #[clap(long, value_parser, default_value = "60000")]
    pub receipt_timeout_ms: u64,
    /// The interval at which the node is polled for a receipt, in milliseconds
    #[clap(long, value_parser, default_value = "500")]
    pub receipt_poll_interval_ms: u64,
    /// The lifetime of a signed permit, in seconds
    #[clap(long, value_parser, default_value = "3600")]
    pub permit_deadline_secs: u64,

    // ---------------
    // | HTTP Server |
    // ---------------

    /// The address the HTTP server binds to
    #[clap(long, value_parser, default_value = "0.0.0.0")]
    pub http_host: IpAddr,
    /// The port the HTTP server listens on
    #[clap(long, value_parser, default_value = "8080")]
    pub http_port: u16,

    // -------------
    // | Telemetry |
    // -------------

    /// Whether to log at debug level
    #[clap(short, long, value_parser)]
    pub debug: bool,
    /// Whether to format logs as JSON
    #[clap(long, value_parser)]
    pub json_logs: bool,
}

// ----------
// | Config |
// ----------

/// The parsed configuration of the gateway
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// The RPC url of the chain node
    pub rpc_url: String,
    /// The key the gateway sends transactions from
    pub gateway_key: SigningKey,
    /// The key that authors permits
    pub permit_signer: SigningKey,
    /// The deployed pool manager and routers
    pub contracts: ContractAddresses,
    /// The hooks contract of the pools the gateway addresses
    pub hooks: Address,
    /// The first currency of requests that do not name one
    pub token0: Option<Address>,
    /// The second currency of requests that do not name one
    pub token1: Option<Address>,
    /// The fee tier of the pools the gateway addresses
    pub fee: u32,
    /// The tick spacing of the pools the gateway addresses
    pub tick_spacing: i32,
    /// The time to wait for a submitted transaction to be mined
    pub receipt_timeout: Duration,
    /// The interval at which the node is polled for a receipt
    pub receipt_poll_interval: Duration,
    /// The lifetime of a signed permit
    pub permit_deadline: Duration,
    /// The address the HTTP server binds to
    pub http_host: IpAddr,
    /// The port the HTTP server listens on
    pub http_port: u16,
    /// Whether to log at debug level
    pub debug: bool,
    /// Whether to format logs as JSON
    pub json_logs: bool,
}

impl GatewayConfig {
    /// The socket address the HTTP server binds to
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http_host, self.http_port)
    }

    /// Build the key of a pool on the configured fee tier and hooks
    pub fn pool_key(
        &self,
        currency0: Address,
        currency1: Address,
    ) -> Result<PoolKey, InvalidPoolKey> {
        PoolKey::new(currency0, currency1, self.fee, self.tick_spacing, self.hooks)
    }
}
