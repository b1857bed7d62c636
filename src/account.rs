//! Connected wallet account
//!
//! The persisted record is the serde form of [`WalletAccount`]:
//! `{"address":"...","name":"..."}`, fields in that order.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Characters kept from each end of the address in the display name
const NAME_EDGE_CHARS: usize = 4;

/// A wallet account as seen by the session layer
///
/// Immutable once built. Deserialization rejects an empty address so a
/// persisted record that parses is always a usable account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAccount")]
pub struct WalletAccount {
    address: String,
    name: String,
}

#[derive(Deserialize)]
struct RawAccount {
    address: String,
    name: String,
}

impl TryFrom<RawAccount> for WalletAccount {
    type Error = SessionError;

    fn try_from(raw: RawAccount) -> Result<Self, Self::Error> {
        if raw.address.is_empty() {
            return Err(SessionError::InvalidAccount(
                "address must not be empty".to_string(),
            ));
        }
        Ok(Self {
            address: raw.address,
            name: raw.name,
        })
    }
}

impl WalletAccount {
    /// Build an account from an address returned by the wallet, deriving its name
    pub fn from_address(address: impl Into<String>) -> Result<Self, SessionError> {
        let address = address.into();
        if address.is_empty() {
            return Err(SessionError::InvalidAccount(
                "address must not be empty".to_string(),
            ));
        }
        let name = display_name(&address);
        Ok(Self { address, name })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Derive the display label for an address: `Account ABCD...WXYZ`
///
/// Short addresses overlap rather than pad, so `"ABC"` becomes
/// `Account ABC...ABC`.
pub fn display_name(address: &str) -> String {
    let head: String = address.chars().take(NAME_EDGE_CHARS).collect();
    let count = address.chars().count();
    let tail: String = address
        .chars()
        .skip(count.saturating_sub(NAME_EDGE_CHARS))
        .collect();
    format!("Account {}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALGO_ADDRESS: &str = "7ZUECA7HFLZTXENRV24SHLU4AVPUTMTTDUFUBNBD64C73F3UHRTHAIOF6Q";

    #[test]
    fn test_display_name_truncates() {
        assert_eq!(display_name(ALGO_ADDRESS), "Account 7ZUE...OF6Q");
    }

    #[test]
    fn test_display_name_short_address_overlaps() {
        assert_eq!(display_name("ABC"), "Account ABC...ABC");
        assert_eq!(display_name("ABCDEF"), "Account ABCD...CDEF");
    }

    #[test]
    fn test_from_address_rejects_empty() {
        assert!(matches!(
            WalletAccount::from_address(""),
            Err(SessionError::InvalidAccount(_))
        ));
    }

    #[test]
    fn test_serialized_shape() {
        let account = WalletAccount::from_address("ABCD...WXYZ").unwrap();
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(
            json,
            r#"{"address":"ABCD...WXYZ","name":"Account ABCD...WXYZ"}"#
        );
    }

    #[test]
    fn test_deserialize_keeps_stored_name() {
        let account: WalletAccount =
            serde_json::from_str(r#"{"address":"ADDR1234","name":"Main"}"#).unwrap();
        assert_eq!(account.address(), "ADDR1234");
        assert_eq!(account.name(), "Main");
    }

    #[test]
    fn test_deserialize_rejects_empty_address() {
        let result = serde_json::from_str::<WalletAccount>(r#"{"address":"","name":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_missing_fields() {
        assert!(serde_json::from_str::<WalletAccount>(r#"{"address":"ADDR"}"#).is_err());
        assert!(serde_json::from_str::<WalletAccount>("null").is_err());
    }
}
