//! The single contract view call the app needs: `isRepresentative(address) -> bool`.

use std::fmt;

use crate::identity::Address;

pub type Selector = [u8; 4];

/// First four bytes of `keccak256("isRepresentative(address)")`.
pub const IS_REPRESENTATIVE: Selector = [0xab, 0x1d, 0x6d, 0x34];

const WORD: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    NotHex,
    Length { expected: usize, got: usize },
    NotBool,
}

impl fmt::Display for AbiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiError::NotHex => write!(f, "value is not hex"),
            AbiError::Length { expected, got } => {
                write!(f, "expected {expected} bytes, got {got}")
            }
            AbiError::NotBool => write!(f, "return word is not a boolean"),
        }
    }
}

impl std::error::Error for AbiError {}

fn strip_0x(raw: &str) -> &str {
    let raw = raw.trim();
    raw.strip_prefix("0x").unwrap_or(raw)
}

pub fn parse_selector(raw: &str) -> Result<Selector, AbiError> {
    let bytes = hex::decode(strip_0x(raw)).map_err(|_| AbiError::NotHex)?;
    bytes.as_slice().try_into().map_err(|_| AbiError::Length {
        expected: 4,
        got: bytes.len(),
    })
}

/// Calldata for a function taking one `address` argument.
pub fn encode_address_call(selector: Selector, account: &Address) -> String {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector);
    data.extend_from_slice(&[0u8; WORD - 20]);
    data.extend_from_slice(account.as_bytes());
    format!("0x{}", hex::encode(data))
}

/// Decodes a single `bool` return word. Anything that is not exactly one
/// word holding 0 or 1 is rejected.
pub fn decode_bool(raw: &str) -> Result<bool, AbiError> {
    let bytes = hex::decode(strip_0x(raw)).map_err(|_| AbiError::NotHex)?;
    if bytes.len() != WORD {
        return Err(AbiError::Length {
            expected: WORD,
            got: bytes.len(),
        });
    }
    if bytes[..WORD - 1].iter().any(|b| *b != 0) {
        return Err(AbiError::NotBool);
    }
    match bytes[WORD - 1] {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(AbiError::NotBool),
    }
}
