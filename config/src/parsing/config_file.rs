//! Parsing logic for a separate gateway config file

use std::fs;

use clap::Parser;
use toml::{Value, value::Map};

use crate::{Cli, GatewayConfig, parsing::parse_config_from_args};

/// The CLI argument name for the config file
const CONFIG_FILE_ARG: &str = "--config-file";

/// Read the options of the config file named on the command line, if any
pub(crate) fn config_file_args(cli_args: &[String]) -> Result<Vec<String>, String> {
    let path = cli_args
        .iter()
        .position(|arg| arg == CONFIG_FILE_ARG)
        .map(|idx| {
            cli_args.get(idx + 1).ok_or_else(|| format!("{CONFIG_FILE_ARG} requires a path"))
        })
        .transpose()?;

    match path {
        Some(path) => read_config_file(path),
        None => Ok(vec![]),
    }
}

/// Parse a config entirely from a file
pub fn parse_config_from_file(path: &str) -> Result<GatewayConfig, String> {
    let mut file_args = read_config_file(path)?;
    file_args.insert(0, "v4-gateway".to_string());
    let cli = Cli::try_parse_from(file_args).map_err(|e| e.to_string())?;
    parse_config_from_args(cli)
}

/// Read a config file into CLI style arguments
fn read_config_file(path: &str) -> Result<Vec<String>, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("could not read {path}: {e}"))?;
    let table: Map<String, Value> = toml::from_str(&contents).map_err(|e| e.to_string())?;

    let mut args = Vec::with_capacity(table.len() * 2);
    for (key, value) in table.iter() {
        args.extend(toml_value_to_args(format!("--{key}"), value)?);
    }

    Ok(args)
}

// ----------------
// | TOML Parsing |
// ----------------

/// Convert a TOML entry into CLI arguments
///
/// A true boolean becomes a bare flag and a false one is omitted
fn toml_value_to_args(cli_arg: String, val: &Value) -> Result<Vec<String>, String> {
    let value = match val {
        Value::Boolean(true) => return Ok(vec![cli_arg]),
        Value::Boolean(false) => return Ok(vec![]),
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        _ => return Err(format!("unsupported value for {cli_arg}")),
    };

    Ok(vec![cli_arg, value])
}

#[cfg(test)]
mod test {
    use super::*;

    /// Tests converting scalar TOML values
    #[test]
    fn test_toml_values() {
        let arg = "--fee".to_string();
        assert_eq!(toml_value_to_args(arg.clone(), &Value::Integer(500)).unwrap(), ["--fee", "500"]);
        assert_eq!(toml_value_to_args(arg.clone(), &Value::Boolean(true)).unwrap(), ["--fee"]);
        assert!(toml_value_to_args(arg.clone(), &Value::Boolean(false)).unwrap().is_empty());
        assert!(toml_value_to_args(arg, &Value::Array(vec![])).is_err());
    }

    /// Tests that a missing config file path is an error
    #[test]
    fn test_missing_path() {
        let args = vec!["v4-gateway".to_string(), CONFIG_FILE_ARG.to_string()];
        assert!(config_file_args(&args).is_err());
    }
}
