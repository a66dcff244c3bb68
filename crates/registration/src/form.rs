//! The registration form an operator fills in for each collected mattress.

use chrono::{Local, NaiveDate};

use wastetrack_inventory::{
    COLLECTION_LOCATION, ConditionAssessment, MaterialComposition, MattressAttributes,
    MattressSize, SizeReference,
};

/// A selectable field of the form.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormField {
    MattressSize,
    MaterialComposition,
    ConditionAssessment,
}

impl core::fmt::Display for FormField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            FormField::MattressSize => "mattress size",
            FormField::MaterialComposition => "material composition",
            FormField::ConditionAssessment => "condition assessment",
        })
    }
}

/// Operator selections plus the read-only date and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    pub mattress_size: Option<MattressSize>,
    pub material_composition: Option<MaterialComposition>,
    pub condition_assessment: Option<ConditionAssessment>,
    collection_date: NaiveDate,
}

impl RegistrationForm {
    /// An empty form dated `collection_date`.
    pub fn new(collection_date: NaiveDate) -> Self {
        Self {
            mattress_size: None,
            material_composition: None,
            condition_assessment: None,
            collection_date,
        }
    }

    /// An empty form dated today in the local timezone.
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn with_size(mut self, size: MattressSize) -> Self {
        self.mattress_size = Some(size);
        self
    }

    pub fn with_material(mut self, material: MaterialComposition) -> Self {
        self.material_composition = Some(material);
        self
    }

    pub fn with_condition(mut self, condition: ConditionAssessment) -> Self {
        self.condition_assessment = Some(condition);
        self
    }

    pub fn collection_date(&self) -> NaiveDate {
        self.collection_date
    }

    pub fn collection_location(&self) -> &'static str {
        COLLECTION_LOCATION
    }

    /// Reference data for the selected size, shown next to the size picker.
    pub fn size_reference(&self) -> Option<SizeReference> {
        self.mattress_size.map(|s| s.reference())
    }

    /// The attribute set, or the first field still unselected.
    pub fn validate(&self) -> Result<MattressAttributes, FormField> {
        Ok(MattressAttributes {
            mattress_size: self.mattress_size.ok_or(FormField::MattressSize)?,
            material_composition: self
                .material_composition
                .ok_or(FormField::MaterialComposition)?,
            condition_assessment: self
                .condition_assessment
                .ok_or(FormField::ConditionAssessment)?,
            collection_date: self.collection_date,
        })
    }

    /// Clear the selections after a successful registration; the date stays.
    pub fn reset(&mut self) {
        self.mattress_size = None;
        self.material_composition = None;
        self.condition_assessment = None;
    }
}
