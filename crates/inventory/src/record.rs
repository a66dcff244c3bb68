use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use wastetrack_core::RecordId;

use crate::attributes::{
    ConditionAssessment, MaterialComposition, MattressAttributes, MattressSize,
};
use crate::status::MattressStatus;

/// One tracked end-of-life mattress.
///
/// Fields are read-only outside this crate: the only mutation a record ever
/// sees is a status change applied by the inventory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MattressRecord {
    id: RecordId,
    mattress_size: MattressSize,
    material_composition: MaterialComposition,
    condition_assessment: ConditionAssessment,
    collection_date: NaiveDate,
    status: MattressStatus,
    /// Opaque asset id returned by the minting collaborator.
    #[serde(rename = "nftAddress", alias = "externalAssetReference")]
    external_asset_reference: String,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "timestamp", alias = "createdAt")]
    created_at: i64,
}

impl MattressRecord {
    pub(crate) fn new(
        id: RecordId,
        attributes: MattressAttributes,
        external_asset_reference: String,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            mattress_size: attributes.mattress_size,
            material_composition: attributes.material_composition,
            condition_assessment: attributes.condition_assessment,
            collection_date: attributes.collection_date,
            status: MattressStatus::INITIAL,
            external_asset_reference,
            created_at,
        }
    }

    pub fn id_typed(&self) -> &RecordId {
        &self.id
    }

    pub fn mattress_size(&self) -> MattressSize {
        self.mattress_size
    }

    pub fn material_composition(&self) -> MaterialComposition {
        self.material_composition
    }

    pub fn condition_assessment(&self) -> ConditionAssessment {
        self.condition_assessment
    }

    pub fn collection_date(&self) -> NaiveDate {
        self.collection_date
    }

    pub fn status(&self) -> MattressStatus {
        self.status
    }

    pub fn external_asset_reference(&self) -> &str {
        &self.external_asset_reference
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn attributes(&self) -> MattressAttributes {
        MattressAttributes {
            mattress_size: self.mattress_size,
            material_composition: self.material_composition,
            condition_assessment: self.condition_assessment,
            collection_date: self.collection_date,
        }
    }

    pub(crate) fn set_status(&mut self, status: MattressStatus) {
        self.status = status;
    }
}
