//! Parsing logic for the gateway config

use std::{env, time::Duration};

use alloy_primitives::Address;
use clap::Parser;
use common::types::chain::ContractAddresses;
use constants::DEFAULT_PERMIT_SIGNER_SEED;
use gateway_crypto::keys::SigningKey;
use util::hex::address_from_hex_string;

use crate::{Cli, GatewayConfig, parsing::config_file::config_file_args, validation::validate_config};

pub mod config_file;

/// Parses command line args into the gateway config
///
/// Options may come from both a config file and the command line. The config
/// file's options are placed before the command line's so that, with clap
/// letting later occurrences override earlier ones, the command line wins
pub fn parse_command_line_args() -> Result<GatewayConfig, String> {
    let full_args = merge_config_file_args(env::args().collect())?;
    let cli = Cli::parse_from(full_args);
    parse_config_from_args(cli)
}

/// Parse the config from an explicit argument list, the first element being
/// the program name
///
/// Unlike `parse_command_line_args`, clap errors are returned rather than
/// printed
pub fn parse_config_from_arg_list(args: Vec<String>) -> Result<GatewayConfig, String> {
    let full_args = merge_config_file_args(args)?;
    let cli = Cli::try_parse_from(full_args).map_err(|e| e.to_string())?;
    parse_config_from_args(cli)
}

/// Insert the config file's options between the program name and the
/// command line options
fn merge_config_file_args(mut args: Vec<String>) -> Result<Vec<String>, String> {
    if args.is_empty() {
        return Err("missing program name".to_string());
    }

    let file_args = config_file_args(&args)?;
    let mut full_args = vec![args.remove(0)];
    full_args.extend(file_args);
    full_args.extend(args);
    Ok(full_args)
}

/// Parse the config from a set of parsed command line arguments
pub(crate) fn parse_config_from_args(cli_args: Cli) -> Result<GatewayConfig, String> {
    let gateway_key = SigningKey::from_hex(&cli_args.private_key)
        .map_err(|e| format!("invalid --private-key: {e}"))?;
    let permit_signer =
        parse_permit_signer(cli_args.permit_signer_key, cli_args.permit_signer_seed)?;

    let contracts = ContractAddresses {
        pool_manager: parse_address("pool-manager", &cli_args.pool_manager)?,
        swap_router: parse_address("swap-router", &cli_args.swap_router)?,
        lp_router: parse_address("lp-router", &cli_args.lp_router)?,
    };
    let hooks = parse_address("hooks", &cli_args.hooks)?;
    let token0 = cli_args.token0.map(|t| parse_address("token0", &t)).transpose()?;
    let token1 = cli_args.token1.map(|t| parse_address("token1", &t)).transpose()?;

    let config = GatewayConfig {
        rpc_url: cli_args.rpc_url,
        gateway_key,
        permit_signer,
        contracts,
        hooks,
        token0,
        token1,
        fee: cli_args.fee,
        tick_spacing: cli_args.tick_spacing,
        receipt_timeout: Duration::from_millis(cli_args.receipt_timeout_ms),
        receipt_poll_interval: Duration::from_millis(cli_args.receipt_poll_interval_ms),
        permit_deadline: Duration::from_secs(cli_args.permit_deadline_secs),
        http_host: cli_args.http_host,
        http_port: cli_args.http_port,
        debug: cli_args.debug,
        json_logs: cli_args.json_logs,
    };

    validate_config(&config)?;
    Ok(config)
}

/// Parse the permit signer from exactly one of a key or a seed, defaulting to
/// the development seed when neither is given
fn parse_permit_signer(key: Option<String>, seed: Option<String>) -> Result<SigningKey, String> {
    let res = match (key, seed) {
        (Some(_), Some(_)) => {
            return Err(
                "only one of --permit-signer-key and --permit-signer-seed may be set".to_string()
            );
        },
        (Some(key), None) => SigningKey::from_hex(&key),
        (None, Some(seed)) => SigningKey::from_seed(&seed),
        (None, None) => SigningKey::from_seed(DEFAULT_PERMIT_SIGNER_SEED),
    };

    res.map_err(|e| format!("invalid permit signer: {e}"))
}

/// Parse an address option, naming the option on failure
fn parse_address(option: &str, value: &str) -> Result<Address, String> {
    address_from_hex_string(value).map_err(|e| format!("invalid --{option}: {e}"))
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use alloy_primitives::address;

    use super::*;

    /// A pool manager address
    const MANAGER: &str = "0x1000000000000000000000000000000000000001";
    /// A swap router address
    const SWAP_ROUTER: &str = "0x2000000000000000000000000000000000000002";
    /// A liquidity router address
    const LP_ROUTER: &str = "0x3000000000000000000000000000000000000003";

    /// Build an argument list with the required contract options
    fn args(extra: &[&str]) -> Vec<String> {
        let mut args = vec![
            "v4-gateway",
            "--pool-manager",
            MANAGER,
            "--swap-router",
            SWAP_ROUTER,
            "--lp-router",
            LP_ROUTER,
        ];
        args.extend_from_slice(extra);
        args.into_iter().map(String::from).collect()
    }

    /// Tests parsing with only the required options
    #[test]
    fn test_defaults() {
        let config = parse_config_from_arg_list(args(&["--rpc-url", "http://node:8545"])).unwrap();
        assert_eq!(config.rpc_url, "http://node:8545");
        assert_eq!(config.contracts.lp_router, address!("0x3000000000000000000000000000000000000003"));
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.fee, 3000);
        assert_eq!(config.tick_spacing, 60);
        assert_eq!(config.receipt_timeout, Duration::from_secs(60));
        assert_eq!(
            config.permit_signer.address(),
            SigningKey::from_seed("alice").unwrap().address()
        );
    }

    /// Tests that a zero router is rejected
    #[test]
    fn test_zero_router() {
        let mut list = args(&[]);
        list.extend(["--swap-router".to_string(), Address::ZERO.to_string()]);
        let err = parse_config_from_arg_list(list).unwrap_err();
        assert!(err.contains("swap router"));
    }

    /// Tests that both forms of permit signer may not be given at once
    #[test]
    fn test_conflicting_permit_signer() {
        let list = args(&[
            "--permit-signer-seed",
            "bob",
            "--permit-signer-key",
            constants::DEV_PRIVATE_KEY,
        ]);
        assert!(parse_config_from_arg_list(list).is_err());
    }

    /// Tests that an oversized fee is rejected
    #[test]
    fn test_fee_too_large() {
        let err = parse_config_from_arg_list(args(&["--fee", "1000001"])).unwrap_err();
        assert!(err.contains("fee"));
    }

    /// Tests that command line options take precedence over the config file
    #[test]
    fn test_config_file_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http-port = 9000\nfee = 500\njson-logs = true").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config =
            parse_config_from_arg_list(args(&["--config-file", path.as_str(), "--http-port", "9100"]))
                .unwrap();
        assert_eq!(config.http_port, 9100);
        assert_eq!(config.fee, 500);
        assert!(config.json_logs);
    }
}
