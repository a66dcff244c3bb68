//! Block-explorer deep links for minted assets.

use core::str::FromStr;

use wastetrack_core::DomainError;

const EXPLORER_ADDRESS_URL: &str = "https://explorer.solana.com/address";

/// Ledger cluster the assets are minted on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Cluster {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::MainnetBeta => "mainnet-beta",
        }
    }

    /// Explorer page for an asset id. Mainnet is the explorer's default and
    /// takes no `cluster` parameter.
    pub fn explorer_url(&self, asset_id: &str) -> String {
        match self {
            Cluster::MainnetBeta => format!("{EXPLORER_ADDRESS_URL}/{asset_id}"),
            other => format!("{EXPLORER_ADDRESS_URL}/{asset_id}?cluster={}", other.as_str()),
        }
    }
}

impl core::fmt::Display for Cluster {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Cluster::MainnetBeta),
            other => Err(DomainError::validation(format!("unknown cluster: {other:?}"))),
        }
    }
}
