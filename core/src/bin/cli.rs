//! A command line client for a running gateway
//!
//! Each subcommand posts one request and prints the JSON response

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

use std::time::Duration;

use alloy_primitives::Address;
use clap::{Args, Parser, Subcommand};
use eyre::{Result, eyre};
use external_api::{
    http::{
        PING_ROUTE,
        pool::{
            ADD_LIQUIDITY_PERMIT_ROUTE, ADD_LIQUIDITY_ROUTE, APPROVE_TOKENS_ROUTE,
            AddLiquidityRequest, ApproveTokensRequest, INITIALIZE_POOL_ROUTE,
            InitializePoolRequest, SWAP_ROUTE, SWAP_WITH_PERMIT_ROUTE, SwapRequest,
        },
        signature::{VERIFY_SIGNATURE_ROUTE, VerifySignatureRequest},
    },
    types::ApiCurrencies,
};
use reqwest::{Client, Method};
use serde_json::Value;

/// The time to wait for a response; operations wait on inclusion
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// -------
// | CLI |
// -------

/// The gateway client CLI
#[derive(Debug, Parser)]
#[clap(author, about)]
struct Cli {
    /// The base url of the gateway
    #[clap(long, env = "GATEWAY_URL", default_value = "http://localhost:8080")]
    url: String,

    /// The request to send
    #[clap(subcommand)]
    command: Command,
}

/// The currencies of the pool, the gateway's defaults if omitted
#[derive(Debug, Args)]
struct CurrencyArgs {
    /// The lower currency of the pool
    #[clap(long)]
    currency0: Option<Address>,
    /// The higher currency of the pool
    #[clap(long)]
    currency1: Option<Address>,
}

impl From<CurrencyArgs> for ApiCurrencies {
    fn from(args: CurrencyArgs) -> Self {
        ApiCurrencies { currency0: args.currency0, currency1: args.currency1 }
    }
}

/// The requests the client sends
#[derive(Debug, Subcommand)]
enum Command {
    /// Check that the gateway is up
    Ping,
    /// Approve both currencies to both routers
    Approve {
        /// The currencies to approve
        #[clap(flatten)]
        currencies: CurrencyArgs,
    },
    /// Initialize the pool
    Initialize {
        /// The pool's currencies
        #[clap(flatten)]
        currencies: CurrencyArgs,
        /// The starting sqrt price in Q64.96, 1:1 if omitted
        #[clap(long)]
        sqrt_price_x96: Option<String>,
    },
    /// Add full range liquidity
    AddLiquidity {
        /// The pool's currencies
        #[clap(flatten)]
        currencies: CurrencyArgs,
        /// The liquidity to add
        #[clap(long)]
        liquidity: Option<String>,
        /// Authorize the transfer with permits from the permit signer
        #[clap(long)]
        permit: bool,
    },
    /// Swap an exact input amount
    Swap {
        /// The pool's currencies
        #[clap(flatten)]
        currencies: CurrencyArgs,
        /// The input amount
        #[clap(long)]
        amount: Option<String>,
        /// Sell currency1 for currency0
        #[clap(long)]
        one_for_zero: bool,
        /// Authorize the transfer with a permit from the permit signer
        #[clap(long)]
        permit: bool,
    },
    /// Verify a signature over a hex encoded message
    Verify {
        /// The hex encoded message
        #[clap(long)]
        message: String,
        /// The hex encoded signature
        #[clap(long)]
        signature: String,
        /// The address expected to have signed
        #[clap(long)]
        address: Address,
    },
}

impl Command {
    /// The method, route, and body of the request
    fn into_request(self) -> Result<(Method, &'static str, Value)> {
        let (route, body) = match self {
            Command::Ping => return Ok((Method::GET, PING_ROUTE, Value::Null)),
            Command::Approve { currencies } => {
                let req = ApproveTokensRequest { currencies: currencies.into() };
                (APPROVE_TOKENS_ROUTE, serde_json::to_value(req)?)
            },
            Command::Initialize { currencies, sqrt_price_x96 } => {
                let req = InitializePoolRequest { currencies: currencies.into(), sqrt_price_x96 };
                (INITIALIZE_POOL_ROUTE, serde_json::to_value(req)?)
            },
            Command::AddLiquidity { currencies, liquidity, permit } => {
                let route = if permit { ADD_LIQUIDITY_PERMIT_ROUTE } else { ADD_LIQUIDITY_ROUTE };
                let req = AddLiquidityRequest { currencies: currencies.into(), liquidity };
                (route, serde_json::to_value(req)?)
            },
            Command::Swap { currencies, amount, one_for_zero, permit } => {
                let route = if permit { SWAP_WITH_PERMIT_ROUTE } else { SWAP_ROUTE };
                let req = SwapRequest {
                    currencies: currencies.into(),
                    amount,
                    zero_for_one: Some(!one_for_zero),
                };
                (route, serde_json::to_value(req)?)
            },
            Command::Verify { message, signature, address } => {
                let req = VerifySignatureRequest { message, signature, address };
                (VERIFY_SIGNATURE_ROUTE, serde_json::to_value(req)?)
            },
        };

        Ok((Method::POST, route, body))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (method, route, body) = cli.command.into_request()?;

    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    let url = format!("{}{route}", cli.url.trim_end_matches('/'));
    let mut req = client.request(method, url);
    if !body.is_null() {
        req = req.json(&body);
    }

    let resp = req.send().await?;
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        return Err(eyre!("gateway responded {status}: {text}"));
    }

    let pretty = match serde_json::from_str::<Value>(&text) {
        Ok(value) => serde_json::to_string_pretty(&value)?,
        Err(_) => text,
    };
    println!("{pretty}");
    Ok(())
}
