use std::fmt;
use std::path::Path;

use alloy::signers::{local::PrivateKeySigner, SignerSync};
use serde::Deserialize;

use crate::{KeeperError, Result};

/// One wallet identity from the wallet file.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// 0x-prefixed public address. `publicAddress` is accepted as an alias
    /// for older wallet files.
    #[serde(alias = "publicAddress")]
    pub address: String,
    pub private_key: String,
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl Wallet {
    /// Signs `message` with the wallet key (EIP-191 personal sign) and
    /// returns the 65-byte signature as a 0x-prefixed hex string.
    ///
    /// The remote service verifies the signature against the exact message
    /// bytes, so callers must pass the template output unmodified.
    pub fn sign(&self, message: &str) -> Result<String> {
        let signer: PrivateKeySigner = self.private_key.parse().map_err(|err| {
            KeeperError::Signer(format!("invalid private key for {}: {err}", self.address))
        })?;
        let signature = signer
            .sign_message_sync(message.as_bytes())
            .map_err(|err| KeeperError::Signer(format!("signing failed: {err}")))?;
        Ok(format!("0x{}", alloy::hex::encode(signature.as_bytes())))
    }
}

/// Loads the wallet file: a JSON array of address/private-key pairs.
pub fn load_wallets(path: &Path) -> Result<Vec<Wallet>> {
    let text = std::fs::read_to_string(path).map_err(|err| {
        KeeperError::Config(format!("cannot read wallet file {}: {err}", path.display()))
    })?;
    serde_json::from_str(&text).map_err(|err| {
        KeeperError::Config(format!("invalid wallet file {}: {err}", path.display()))
    })
}
