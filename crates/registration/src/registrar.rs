//! Registration workflow: validate, mint (bounded), then record.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use wastetrack_inventory::{InventoryStore, KeyValueStorage, MattressRecord};

use crate::error::RegistrationError;
use crate::explorer::Cluster;
use crate::form::RegistrationForm;
use crate::metadata::AssetMetadata;
use crate::minter::{MintReceipt, MintRequest, Minter, WalletIdentity};

pub const DEFAULT_MINT_TIMEOUT: Duration = Duration::from_secs(60);

/// Outcome of a completed registration.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub record: MattressRecord,
    pub receipt: MintReceipt,
    pub metadata: AssetMetadata,
    pub explorer_url: String,
}

/// Drives registrations through a [`Minter`], one at a time.
pub struct Registrar<M: Minter> {
    minter: M,
    mint_timeout: Duration,
    cluster: Cluster,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag however the registration ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<M: Minter> Registrar<M> {
    pub fn new(minter: M) -> Self {
        Self {
            minter,
            mint_timeout: DEFAULT_MINT_TIMEOUT,
            cluster: Cluster::default(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_mint_timeout(mut self, timeout: Duration) -> Self {
        self.mint_timeout = timeout;
        self
    }

    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn cluster(&self) -> Cluster {
        self.cluster
    }

    pub fn mint_timeout(&self) -> Duration {
        self.mint_timeout
    }

    /// Whether a registration is currently awaiting its mint.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, RegistrationError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlightGuard(&self.in_flight))
            .map_err(|_| RegistrationError::AlreadySubmitting)
    }

    /// Register one mattress.
    ///
    /// No record is created unless the minter confirms the asset within the
    /// configured timeout.
    pub async fn register<S: KeyValueStorage>(
        &self,
        store: &mut InventoryStore<S>,
        wallet: Option<&WalletIdentity>,
        form: &RegistrationForm,
    ) -> Result<Registration, RegistrationError> {
        let _guard = self.begin()?;

        let owner = wallet.ok_or(RegistrationError::NotConnected)?;
        let attributes = form.validate().map_err(RegistrationError::IncompleteForm)?;

        let attempt_id = Uuid::now_v7();
        let metadata = AssetMetadata::for_mattress(&attributes, attempt_id, Utc::now().timestamp_millis());
        let request = MintRequest {
            attempt_id,
            owner: owner.clone(),
            metadata,
        };

        let span = info_span!("mint", attempt = %attempt_id, asset_name = %request.metadata.name);
        let receipt = match tokio::time::timeout(self.mint_timeout, self.minter.mint(&request))
            .instrument(span)
            .await
        {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(err)) => {
                warn!(attempt = %attempt_id, error = %err, "mint failed; no record created");
                return Err(err.into());
            }
            Err(_) => {
                warn!(attempt = %attempt_id, timeout = ?self.mint_timeout, "mint timed out; no record created");
                return Err(RegistrationError::MintTimedOut(self.mint_timeout));
            }
        };
        info!(attempt = %attempt_id, asset = %receipt.asset_id, signature = ?receipt.signature, "asset minted");

        let record = match store.create_record(attributes, receipt.asset_id.clone()) {
            Ok(record) => record,
            Err(source) if source.is_write_failure() => {
                return match store.records().first().cloned() {
                    Some(record) => Err(RegistrationError::NotPersisted {
                        record: Box::new(record),
                        receipt,
                        source,
                    }),
                    None => Err(source.into()),
                };
            }
            Err(other) => return Err(other.into()),
        };

        Ok(Registration {
            explorer_url: self.cluster.explorer_url(&receipt.asset_id),
            record,
            receipt,
            metadata: request.metadata,
        })
    }
}
