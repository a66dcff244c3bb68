use std::time::Duration;

use thiserror::Error;
use wastetrack_inventory::{InventoryError, MattressRecord};

use crate::form::FormField;
use crate::minter::{MintError, MintReceipt};

/// Why a registration did not complete.
///
/// None of these are fatal: the inventory already held is untouched, and the
/// operator can act on each one (connect, fill in, resubmit, or flush).
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("no wallet connected; connect a wallet before registering")]
    NotConnected,

    #[error("a registration is already being submitted")]
    AlreadySubmitting,

    #[error("form incomplete: select a {0}")]
    IncompleteForm(FormField),

    #[error("minting failed: {0}")]
    MintFailed(#[from] MintError),

    #[error("minting timed out after {0:?}")]
    MintTimedOut(Duration),

    /// The asset was minted and the record exists in memory, but storage
    /// refused the write. Resubmitting would mint a second asset; flush instead.
    #[error("asset {} minted but the inventory could not be saved: {source}", .receipt.asset_id)]
    NotPersisted {
        record: Box<MattressRecord>,
        receipt: MintReceipt,
        #[source]
        source: InventoryError,
    },

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl RegistrationError {
    /// Whether submitting the same form again is the right recovery.
    pub fn can_resubmit(&self) -> bool {
        matches!(
            self,
            RegistrationError::NotConnected
                | RegistrationError::AlreadySubmitting
                | RegistrationError::IncompleteForm(_)
                | RegistrationError::MintFailed(_)
                | RegistrationError::MintTimedOut(_)
        )
    }
}
