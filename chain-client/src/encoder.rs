//! Encodes contract calls by method name against a fixed interface
//!
//! Each interface is a set of human readable function signatures. Encoding
//! picks the function by name and, for overloaded names, by the shape of the
//! arguments; nested structs are passed as tuples in declared field order

use std::collections::HashMap;

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::Function,
    primitives::{Bytes, Selector},
};
use itertools::Itertools;

use crate::{abi, errors::ChainClientError};

/// The byte length of a function selector
const SELECTOR_LEN: usize = 4;

/// A decoded call: the method name and its arguments
pub type DecodedCall = (String, Vec<DynSolValue>);

/// A contract interface, indexed by method name
#[derive(Clone, Debug)]
pub struct ContractInterface {
    /// A human readable name of the contract, for error messages
    name: &'static str,
    /// The functions of the interface, overloads grouped by name
    functions: HashMap<String, Vec<Function>>,
}

impl ContractInterface {
    /// Parse an interface from its function signatures
    pub fn parse<S: AsRef<str>>(name: &'static str, signatures: &[S]) -> Result<Self, ChainClientError> {
        let mut functions: HashMap<String, Vec<Function>> = HashMap::new();
        for sig in signatures {
            let func = Function::parse(sig.as_ref()).map_err(|e| {
                ChainClientError::encoding(format!("invalid signature in {name}: {e}"))
            })?;
            functions.entry(func.name.clone()).or_default().push(func);
        }

        Ok(Self { name, functions })
    }

    /// The name of the interface
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Encode a call to `method` as `selector || abi.encode(args)`
    pub fn encode(&self, method: &str, args: &[DynSolValue]) -> Result<Bytes, ChainClientError> {
        let overloads = self.functions.get(method).ok_or_else(|| {
            ChainClientError::encoding(format!("unknown method {method} on {}", self.name))
        })?;

        // Try each overload, keeping the errors in case none match
        let mut errors = Vec::with_capacity(overloads.len());
        for func in overloads.iter().filter(|f| f.inputs.len() == args.len()) {
            match func.abi_encode_input(args) {
                Ok(data) => return Ok(Bytes::from(data)),
                Err(e) => errors.push(format!("{}: {e}", func.signature())),
            }
        }

        if errors.is_empty() {
            let arities = overloads.iter().map(|f| f.inputs.len()).join(" or ");
            return Err(ChainClientError::encoding(format!(
                "{}.{method} takes {arities} arguments, got {}",
                self.name,
                args.len()
            )));
        }

        Err(ChainClientError::encoding(format!(
            "arguments do not match {}.{method}: {}",
            self.name,
            errors.join("; ")
        )))
    }

    /// Decode calldata produced by `encode`, selecting the function by its
    /// selector
    pub fn decode(&self, data: &[u8]) -> Result<DecodedCall, ChainClientError> {
        if data.len() < SELECTOR_LEN {
            return Err(ChainClientError::encoding("calldata shorter than a selector"));
        }

        let selector = Selector::from_slice(&data[..SELECTOR_LEN]);
        let func = self.functions.values().flatten().find(|f| f.selector() == selector).ok_or_else(
            || ChainClientError::encoding(format!("unknown selector {selector} on {}", self.name)),
        )?;

        let args = func
            .abi_decode_input(&data[SELECTOR_LEN..])
            .map_err(|e| ChainClientError::encoding(format!("{}: {e}", func.signature())))?;
        Ok((func.name.clone(), args))
    }
}

/// The call encoder for every contract the gateway interacts with
#[derive(Clone, Debug)]
pub struct CallEncoder {
    /// The pool manager interface
    pub pool_manager: ContractInterface,
    /// The swap router interface
    pub swap_router: ContractInterface,
    /// The liquidity router interface
    pub lp_router: ContractInterface,
    /// The ERC20 interface
    pub erc20: ContractInterface,
}

impl CallEncoder {
    /// Build the encoder from the known contract interfaces
    pub fn new() -> Result<Self, ChainClientError> {
        Ok(Self {
            pool_manager: ContractInterface::parse("PoolManager", &abi::pool_manager_signatures())?,
            swap_router: ContractInterface::parse("PoolSwapTest", &abi::swap_router_signatures())?,
            lp_router: ContractInterface::parse(
                "PoolModifyLiquidityTest",
                &abi::lp_router_signatures(),
            )?,
            erc20: ContractInterface::parse("ERC20", &abi::erc20_signatures())?,
        })
    }
}
