//! Validation of a parsed config

use alloy_primitives::Address;
use constants::MAX_FEE;

use crate::GatewayConfig;

/// Check the config for values the gateway cannot operate with
pub(crate) fn validate_config(config: &GatewayConfig) -> Result<(), String> {
    let contracts = &config.contracts;
    for (name, addr) in [
        ("pool manager", contracts.pool_manager),
        ("swap router", contracts.swap_router),
        ("lp router", contracts.lp_router),
    ] {
        if addr == Address::ZERO {
            return Err(format!("the {name} address must be non-zero"));
        }
    }

    if config.fee > MAX_FEE {
        return Err(format!("fee {} exceeds the maximum of {MAX_FEE}", config.fee));
    }
    if config.tick_spacing <= 0 {
        return Err(format!("tick spacing must be positive, got {}", config.tick_spacing));
    }

    if config.receipt_poll_interval.is_zero() {
        return Err("the receipt poll interval must be non-zero".to_string());
    }
    if config.receipt_poll_interval > config.receipt_timeout {
        return Err("the receipt poll interval exceeds the receipt timeout".to_string());
    }

    Ok(())
}
