//! Off-ledger metadata document uploaded alongside each minted asset.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use wastetrack_inventory::MattressAttributes;

pub const SYMBOL: &str = "MTR";

pub const IMAGE_URI: &str =
    "https://gateway.irys.xyz/5Fu9qg1ApBoKk6TbCmK9rxqVAY5vadQxVLT7NBMBVfjw";

/// Royalty recorded on the asset, in basis points.
pub const SELLER_FEE_BASIS_POINTS: u16 = 100;

const DESCRIPTION_LINES: [&str; 5] = [
    "CLU - Closed Loop Upcycling System",
    "",
    "Powered by Naion Ltd",
    "",
    "This Waste Collection App is used for creating the first digital passport of a mattress \
     that has become end of life.Tracking the chain of custody of the mattress perpetually \
     throughout the closed loop upcycling system.",
];

/// One `{trait_type, value}` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataAttribute {
    pub trait_type: String,
    pub value: Value,
}

impl MetadataAttribute {
    fn new(trait_type: &str, value: impl Into<Value>) -> Self {
        Self {
            trait_type: trait_type.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
    pub seller_fee_basis_points: u16,
    pub attributes: Vec<MetadataAttribute>,
}

impl AssetMetadata {
    /// Metadata for one mattress.
    ///
    /// The asset name is `MTR-` plus three values below 0xff taken from the
    /// attempt id's random tail, each in unpadded hex, so retries of the same
    /// attempt share a name.
    pub fn for_mattress(attributes: &MattressAttributes, attempt_id: Uuid, timestamp_ms: i64) -> Self {
        let suffix: String = attempt_id.as_bytes()[13..]
            .iter()
            .map(|b| format!("{:x}", b % 0xff))
            .collect();
        let name = format!("{SYMBOL}-{suffix}");

        Self {
            name,
            symbol: SYMBOL.to_string(),
            description: DESCRIPTION_LINES.join("\n"),
            image: IMAGE_URI.to_string(),
            seller_fee_basis_points: SELLER_FEE_BASIS_POINTS,
            attributes: vec![
                MetadataAttribute::new("mattressSize", attributes.mattress_size.as_str()),
                MetadataAttribute::new(
                    "materialComposition",
                    attributes.material_composition.as_str(),
                ),
                MetadataAttribute::new(
                    "conditionAssessment",
                    attributes.condition_assessment.as_str(),
                ),
                MetadataAttribute::new(
                    "collectionDate",
                    attributes.collection_date.format("%Y-%m-%d").to_string(),
                ),
                MetadataAttribute::new("timestamp", timestamp_ms),
            ],
        }
    }

    pub fn attribute(&self, trait_type: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|a| a.trait_type == trait_type)
            .map(|a| &a.value)
    }
}
