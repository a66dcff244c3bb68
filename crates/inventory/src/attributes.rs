//! Mattress attributes collected at registration, plus their reference data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::wire::wire_enum;

/// Where every mattress handled by this deployment is collected.
pub const COLLECTION_LOCATION: &str = "Manchester";

wire_enum! {
    /// Named size category of a mattress.
    pub enum MattressSize("mattress size") {
        SmallSingle => "Small single",
        Single => "Single",
        SmallDouble => "Small double (Queen)",
        Double => "Double",
        King => "King",
        SuperKing => "Super king",
    }
}

/// Dimensions and typical weight of a size category.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SizeReference {
    pub width_cm: u16,
    pub length_cm: u16,
    pub min_weight_kg: u16,
    pub max_weight_kg: u16,
}

impl SizeReference {
    /// `"<width> x <length>"`, in centimetres.
    pub fn dimensions(&self) -> String {
        format!("{} x {}", self.width_cm, self.length_cm)
    }

    /// `"<min>-<max>"`, in kilograms.
    pub fn weight_range(&self) -> String {
        format!("{}-{}", self.min_weight_kg, self.max_weight_kg)
    }
}

impl MattressSize {
    /// Static reference data; records only store the size name.
    pub fn reference(&self) -> SizeReference {
        let (width_cm, length_cm, min_weight_kg, max_weight_kg) = match self {
            MattressSize::SmallSingle => (75, 190, 10, 13),
            MattressSize::Single => (90, 190, 16, 27),
            MattressSize::SmallDouble => (120, 190, 24, 30),
            MattressSize::Double => (135, 190, 35, 40),
            MattressSize::King => (150, 200, 40, 70),
            MattressSize::SuperKing => (180, 200, 51, 82),
        };
        SizeReference {
            width_cm,
            length_cm,
            min_weight_kg,
            max_weight_kg,
        }
    }
}

wire_enum! {
    pub enum MaterialComposition("material composition") {
        SpringsAndFoam => "Springs and Foam",
        FoamOnly => "Foam only",
    }
}

wire_enum! {
    /// Reusability and cleanliness as judged by the collecting operator.
    pub enum ConditionAssessment("condition assessment") {
        ReusableGood => "Reusable good",
        ReusablePoor => "Reusable poor",
        NonReusableGood => "Non-reusable good",
        NonReusablePoor => "Non-reusable poor",
        ContaminatedGood => "Contaminated good",
        ContaminatedPoor => "Contaminated poor",
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Reusability {
    Reusable,
    NonReusable,
    Contaminated,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Cleanliness {
    Good,
    Poor,
}

impl ConditionAssessment {
    pub fn reusability(&self) -> Reusability {
        match self {
            ConditionAssessment::ReusableGood | ConditionAssessment::ReusablePoor => {
                Reusability::Reusable
            }
            ConditionAssessment::NonReusableGood | ConditionAssessment::NonReusablePoor => {
                Reusability::NonReusable
            }
            ConditionAssessment::ContaminatedGood | ConditionAssessment::ContaminatedPoor => {
                Reusability::Contaminated
            }
        }
    }

    pub fn cleanliness(&self) -> Cleanliness {
        match self {
            ConditionAssessment::ReusableGood
            | ConditionAssessment::NonReusableGood
            | ConditionAssessment::ContaminatedGood => Cleanliness::Good,
            _ => Cleanliness::Poor,
        }
    }
}

/// Everything the registration form collects about one mattress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MattressAttributes {
    pub mattress_size: MattressSize,
    pub material_composition: MaterialComposition,
    pub condition_assessment: ConditionAssessment,
    /// Local calendar date of registration.
    pub collection_date: NaiveDate,
}
