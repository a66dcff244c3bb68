//! Boundary to the external asset-minting collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::metadata::AssetMetadata;

/// Public key of the operator's connected wallet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletIdentity(String);

impl WalletIdentity {
    /// `None` for a blank key: a blank key is not a connected wallet.
    pub fn new(public_key: impl Into<String>) -> Option<Self> {
        let key: String = public_key.into();
        let key = key.trim();
        (!key.is_empty()).then(|| Self(key.to_string()))
    }

    pub fn public_key(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for WalletIdentity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the minter needs for one asset.
#[derive(Debug, Clone, PartialEq)]
pub struct MintRequest {
    /// Correlates log lines of one registration attempt.
    pub attempt_id: Uuid,
    pub owner: WalletIdentity,
    pub metadata: AssetMetadata,
}

/// Confirmation of a finalized mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    /// Opaque asset id; becomes the record's external asset reference.
    pub asset_id: String,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MintError {
    #[error("metadata upload failed: {0}")]
    MetadataUpload(String),

    #[error("mint transaction rejected: {0}")]
    Rejected(String),

    #[error("minting service unavailable: {0}")]
    Unavailable(String),
}

/// Mints one asset per registered mattress.
///
/// Implementations return only once the mint is final; a returned receipt is
/// taken as proof that the asset exists.
#[async_trait]
pub trait Minter: Send + Sync {
    async fn mint(&self, request: &MintRequest) -> Result<MintReceipt, MintError>;
}

#[async_trait]
impl<M> Minter for std::sync::Arc<M>
where
    M: Minter + ?Sized,
{
    async fn mint(&self, request: &MintRequest) -> Result<MintReceipt, MintError> {
        (**self).mint(request).await
    }
}

/// An asset already minted by external wallet tooling.
///
/// Lets an operator record a mattress whose mint was confirmed out of band
/// while still going through the same registration workflow.
#[derive(Debug, Clone)]
pub struct ConfirmedAsset {
    receipt: MintReceipt,
}

impl ConfirmedAsset {
    pub fn new(asset_id: impl Into<String>, signature: Option<String>) -> Self {
        Self {
            receipt: MintReceipt {
                asset_id: asset_id.into(),
                signature,
            },
        }
    }
}

#[async_trait]
impl Minter for ConfirmedAsset {
    async fn mint(&self, _request: &MintRequest) -> Result<MintReceipt, MintError> {
        if self.receipt.asset_id.trim().is_empty() {
            return Err(MintError::Rejected("no asset id supplied".to_string()));
        }
        Ok(self.receipt.clone())
    }
}
