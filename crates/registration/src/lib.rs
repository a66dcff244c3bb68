//! Mattress registration: from a filled-in form to a minted, tracked record.
//!
//! Minting itself is delegated to a [`Minter`]; this crate validates the form,
//! builds the asset metadata, bounds the mint with a timeout, guards against
//! double submission, and only then creates the inventory record.

pub mod error;
pub mod explorer;
pub mod form;
pub mod metadata;
pub mod minter;
pub mod registrar;

pub use error::RegistrationError;
pub use explorer::Cluster;
pub use form::{FormField, RegistrationForm};
pub use metadata::{AssetMetadata, MetadataAttribute};
pub use minter::{ConfirmedAsset, MintError, MintReceipt, MintRequest, Minter, WalletIdentity};
pub use registrar::{Registrar, Registration};
