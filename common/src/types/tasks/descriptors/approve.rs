//! Descriptor for the approve tokens task

use alloy_primitives::Address;

/// The task descriptor containing only the parameterization of the
/// `ApproveTokens` task
#[derive(Clone, Debug)]
pub struct ApproveTokensTaskDescriptor {
    /// The tokens to approve each router for
    pub tokens: Vec<Address>,
}

impl ApproveTokensTaskDescriptor {
    /// Constructor
    pub fn new(tokens: Vec<Address>) -> Result<Self, String> {
        if tokens.is_empty() {
            return Err("no tokens to approve".to_string());
        }
        if let Some(zero) = tokens.iter().find(|t| t.is_zero()) {
            return Err(format!("cannot approve the zero address as a token: {zero:#x}"));
        }

        Ok(ApproveTokensTaskDescriptor { tokens })
    }
}
