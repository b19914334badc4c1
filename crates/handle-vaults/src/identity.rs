use std::fmt;

use alloy_primitives::{Address, hex, keccak256};

/// Identifier of a vault record: the Keccak-256 digest of `account ‖ fx_token`,
/// rendered as `0x`-prefixed lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VaultId(String);

impl VaultId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Wraps an identifier read back from storage. No digest is recomputed.
    pub const fn from_stored(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VaultId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lowercase `0x` hex, the form addresses and ids are stored and keyed in.
pub fn to_db_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode_prefixed(bytes)
}

/// Maps an (account, fx token) pair to its vault identifier.
pub fn resolve(account: &Address, fx_token: &Address) -> VaultId {
    let mut preimage = [0u8; 40];
    preimage[..20].copy_from_slice(account.as_slice());
    preimage[20..].copy_from_slice(fx_token.as_slice());
    VaultId(to_db_hex(keccak256(preimage)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_resolve_hashes_account_then_token() {
        let account = address(0x11);
        let fx_token = address(0x22);

        let mut preimage = Vec::with_capacity(40);
        preimage.extend_from_slice(account.as_slice());
        preimage.extend_from_slice(fx_token.as_slice());
        let expected = format!("0x{}", hex::encode(keccak256(&preimage)));

        let id = resolve(&account, &fx_token);
        assert_eq!(id.as_str(), expected);
        assert_eq!(id.as_str().len(), 66);
        assert!(id.as_str()[2..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_resolve_ignores_address_casing() {
        let checksummed: Address = "0x5B38Da6a701c568545dCfcB03FcB875f56beddC4".parse().unwrap();
        let lowercase: Address = "0x5b38da6a701c568545dcfcb03fcb875f56beddc4".parse().unwrap();
        let fx_token = address(0x02);
        assert_eq!(resolve(&checksummed, &fx_token), resolve(&lowercase, &fx_token));
        assert_eq!(to_db_hex(checksummed.as_slice()), "0x5b38da6a701c568545dcfcb03fcb875f56beddc4");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let account = address(0x01);
        let fx_token = address(0x02);
        assert_eq!(resolve(&account, &fx_token), resolve(&account, &fx_token));
    }

    #[test]
    fn test_resolve_distinguishes_ordered_pairs() {
        let a = address(0x01);
        let b = address(0x02);
        let c = address(0x03);

        assert_ne!(resolve(&a, &b), resolve(&b, &a));
        assert_ne!(resolve(&a, &b), resolve(&a, &c));
        assert_ne!(resolve(&a, &b), resolve(&c, &b));
        assert_ne!(resolve(&a, &a), resolve(&b, &b));
    }
}
