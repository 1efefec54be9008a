use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing an account identity string.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("account id must start with '0x'")]
    InvalidPrefix,
    #[error("account id must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("account id payload is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Number of raw bytes contained in an account identity.
pub const ACCOUNT_ID_BYTES: usize = 20;
/// Expected string length of an encoded identity (`0x` + 40 hex chars).
pub const ACCOUNT_ID_STRING_LENGTH: usize = 2 + ACCOUNT_ID_BYTES * 2;

/// Identity of a caller: a buyer, a recipient, a trading venue or the owner.
///
/// Rendered as `0x` followed by lowercase hex. Parsing accepts either case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(pub [u8; ACCOUNT_ID_BYTES]);

impl AccountId {
    /// The all-zero identity. Never a valid owner or recipient.
    pub const ZERO: AccountId = AccountId([0u8; ACCOUNT_ID_BYTES]);

    /// Derive a stable identity from a human label (`"alice"`, `"seaport"`).
    ///
    /// Uses the first 20 bytes of the blake3 digest of the label, which keeps
    /// simulations and fixtures reproducible across runs.
    pub fn from_label(label: &str) -> Self {
        let hash = blake3::hash(label.as_bytes());
        let mut bytes = [0u8; ACCOUNT_ID_BYTES];
        bytes.copy_from_slice(&hash.as_bytes()[..ACCOUNT_ID_BYTES]);
        AccountId(bytes)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// Encode raw identity bytes into the `0x`-prefixed hex form.
pub fn encode_account_id(bytes: &[u8; ACCOUNT_ID_BYTES]) -> String {
    let mut encoded = String::with_capacity(ACCOUNT_ID_STRING_LENGTH);
    encoded.push_str("0x");
    encoded.push_str(&hex::encode(bytes));
    encoded
}

/// Decode a `0x`-prefixed identity string into raw bytes.
pub fn decode_account_id(value: &str) -> Result<[u8; ACCOUNT_ID_BYTES], AddressError> {
    let payload = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or(AddressError::InvalidPrefix)?;

    if value.len() != ACCOUNT_ID_STRING_LENGTH {
        return Err(AddressError::InvalidLength {
            expected: ACCOUNT_ID_STRING_LENGTH,
            actual: value.len(),
        });
    }

    let mut bytes = [0u8; ACCOUNT_ID_BYTES];
    hex::decode_to_slice(payload, &mut bytes)?;
    Ok(bytes)
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_account_id(&self.0))
    }
}

impl FromStr for AccountId {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_account_id(s).map(AccountId)
    }
}

impl From<[u8; ACCOUNT_ID_BYTES]> for AccountId {
    fn from(value: [u8; ACCOUNT_ID_BYTES]) -> Self {
        AccountId(value)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        encode_account_id(&value.0)
    }
}

impl TryFrom<String> for AccountId {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
