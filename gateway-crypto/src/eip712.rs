//! EIP-712 digests for ERC20 permits
//!
//! The domain separator is an input here rather than something computed
//! locally; tokens disagree on their domain parameters, so callers read it
//! from the token itself

use alloy::primitives::{Address, B256, U256, keccak256};
use constants::{EIP712_DIGEST_PREFIX, PERMIT_TYPE_STRING};
use lazy_static::lazy_static;

use crate::{
    ecdsa::{RecoverableSignature, recover, sign_digest},
    error::CryptoError,
    keys::SigningKey,
};

/// The type string of the EIP-712 domain with all standard fields
const DOMAIN_TYPE_STRING: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

lazy_static! {
    /// The type hash of an ERC20 permit
    pub static ref PERMIT_TYPEHASH: B256 = keccak256(PERMIT_TYPE_STRING.as_bytes());
    /// The type hash of the standard EIP-712 domain
    static ref DOMAIN_TYPEHASH: B256 = keccak256(DOMAIN_TYPE_STRING.as_bytes());
}

/// The fields of a permit covered by its signature
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PermitMessage {
    /// The owner of the tokens
    pub owner: Address,
    /// The account allowed to spend the tokens
    pub spender: Address,
    /// The allowance granted
    pub value: U256,
    /// The token's permit nonce for the owner
    pub nonce: U256,
    /// The timestamp after which the permit is invalid
    pub deadline: U256,
}

/// Left pad an address to a 32-byte word
fn pad_address(addr: &Address) -> B256 {
    addr.into_word()
}

/// Hash the permit struct:
/// `keccak256(typehash || owner || spender || value || nonce || deadline)`
pub fn permit_struct_hash(permit: &PermitMessage) -> B256 {
    let mut buf = Vec::with_capacity(32 * 6);
    buf.extend_from_slice(PERMIT_TYPEHASH.as_slice());
    buf.extend_from_slice(pad_address(&permit.owner).as_slice());
    buf.extend_from_slice(pad_address(&permit.spender).as_slice());
    buf.extend_from_slice(&permit.value.to_be_bytes::<32>());
    buf.extend_from_slice(&permit.nonce.to_be_bytes::<32>());
    buf.extend_from_slice(&permit.deadline.to_be_bytes::<32>());
    keccak256(buf)
}

/// The signable digest of a struct under a domain:
/// `keccak256(0x1901 || domainSeparator || structHash)`
pub fn typed_data_digest(domain_separator: &B256, struct_hash: &B256) -> B256 {
    let mut buf = [0u8; 2 + 32 + 32];
    buf[..2].copy_from_slice(&EIP712_DIGEST_PREFIX);
    buf[2..34].copy_from_slice(domain_separator.as_slice());
    buf[34..].copy_from_slice(struct_hash.as_slice());
    keccak256(buf)
}

/// The signable digest of a permit under a token's domain separator
pub fn permit_digest(domain_separator: &B256, permit: &PermitMessage) -> B256 {
    typed_data_digest(domain_separator, &permit_struct_hash(permit))
}

/// Sign a permit under a token's domain separator
pub fn sign_permit(
    domain_separator: &B256,
    permit: &PermitMessage,
    key: &SigningKey,
) -> Result<RecoverableSignature, CryptoError> {
    sign_digest(&permit_digest(domain_separator, permit), key)
}

/// Recover the signer of a permit
pub fn recover_permit_signer(
    domain_separator: &B256,
    permit: &PermitMessage,
    sig: &RecoverableSignature,
) -> Result<Address, CryptoError> {
    recover(&permit_digest(domain_separator, permit), sig)
}

/// Compute the separator of a standard `(name, version, chainId,
/// verifyingContract)` domain
///
/// Tokens expose their own separator; this is for contracts that do not, and
/// for simulating tokens
pub fn domain_separator(
    name: &str,
    version: &str,
    chain_id: u64,
    verifying_contract: Address,
) -> B256 {
    let mut buf = Vec::with_capacity(32 * 5);
    buf.extend_from_slice(DOMAIN_TYPEHASH.as_slice());
    buf.extend_from_slice(keccak256(name.as_bytes()).as_slice());
    buf.extend_from_slice(keccak256(version.as_bytes()).as_slice());
    buf.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    buf.extend_from_slice(pad_address(&verifying_contract).as_slice());
    keccak256(buf)
}
