//! Canonical column list compiled into slot lookups.
//!
//! The model's input schema is an ordered list of column names. Instead of
//! matching names on every request, the list is resolved once into a slot
//! index for each numeric column and for each (field, value) pair a record can
//! carry. Values the list does not know about resolve to no slot and encode as
//! all-zero indicators.

use crate::attributes::{
    AreaType, Category, City, ContactMethod, Furnishing, TenantPreference, NUMERIC_COLUMNS,
};
use crate::error::{Artifact, Error, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Slot of every value of one categorical field.
#[derive(Debug, Clone)]
struct CategorySlots {
    slots: Vec<Option<usize>>,
}

impl CategorySlots {
    fn resolve<C: Category>(index: &HashMap<&str, usize>) -> Self {
        let slots = C::all()
            .iter()
            .map(|value| index.get(value.column_name().as_str()).copied())
            .collect();
        Self { slots }
    }

    fn slot<C: Category>(&self, value: C) -> Option<usize> {
        self.slots[value.ordinal()]
    }

    fn missing<C: Category>(&self) -> impl Iterator<Item = String> + '_ {
        C::all()
            .iter()
            .filter(move |value| self.slot(**value).is_none())
            .map(|value| value.column_name())
    }
}

/// Differences between what the form can send and what the model was trained on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDrift {
    /// Selectable category columns the model has no slot for
    pub missing_categories: Vec<String>,

    /// Columns no record can ever populate (always zero)
    pub unreachable_columns: Vec<String>,
}

impl SchemaDrift {
    pub fn is_empty(&self) -> bool {
        self.missing_categories.is_empty() && self.unreachable_columns.is_empty()
    }
}

/// The model's input schema with precomputed slot lookups.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    columns: Arc<[String]>,
    numeric_slots: [usize; 4],
    area_type: CategorySlots,
    city: CategorySlots,
    furnishing: CategorySlots,
    tenant_preference: CategorySlots,
    contact_method: CategorySlots,
}

impl FeatureSchema {
    /// Compile a canonical column list.
    ///
    /// Fails if the list is empty, has blank or repeated names, or is missing
    /// one of the numeric columns the scaler operates on.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::Configuration("canonical column list is empty".into()));
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (slot, name) in columns.iter().enumerate() {
            if name.is_empty() {
                return Err(Error::Configuration(format!(
                    "canonical column {slot} has an empty name"
                )));
            }
            if index.insert(name.as_str(), slot).is_some() {
                return Err(Error::Configuration(format!(
                    "canonical column {name:?} appears more than once"
                )));
            }
        }

        let mut numeric_slots = [0; 4];
        for (slot, name) in numeric_slots.iter_mut().zip(NUMERIC_COLUMNS) {
            *slot = *index.get(name).ok_or_else(|| {
                Error::Configuration(format!("canonical columns lack numeric column {name:?}"))
            })?;
        }

        let area_type = CategorySlots::resolve::<AreaType>(&index);
        let city = CategorySlots::resolve::<City>(&index);
        let furnishing = CategorySlots::resolve::<Furnishing>(&index);
        let tenant_preference = CategorySlots::resolve::<TenantPreference>(&index);
        let contact_method = CategorySlots::resolve::<ContactMethod>(&index);

        Ok(Self {
            columns: columns.into(),
            numeric_slots,
            area_type,
            city,
            furnishing,
            tenant_preference,
            contact_method,
        })
    }

    /// Load a canonical column list stored as a JSON array of strings.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ArtifactMissing {
            artifact: Artifact::Columns,
            path: path.to_path_buf(),
            source,
        })?;
        let columns: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            Error::Configuration(format!("column list {} is malformed: {e}", path.display()))
        })?;

        let schema = Self::new(columns)?;
        info!(
            path = %path.display(),
            columns = schema.len(),
            "Loaded canonical column list"
        );
        Ok(schema)
    }

    /// Column names in model order.
    pub fn columns(&self) -> &Arc<[String]> {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Slots of `BHK`, `Size`, `Bathroom`, `Floor`, in that order.
    pub fn numeric_slots(&self) -> [usize; 4] {
        self.numeric_slots
    }

    pub fn area_type_slot(&self, value: AreaType) -> Option<usize> {
        self.area_type.slot(value)
    }

    pub fn city_slot(&self, value: City) -> Option<usize> {
        self.city.slot(value)
    }

    pub fn furnishing_slot(&self, value: Furnishing) -> Option<usize> {
        self.furnishing.slot(value)
    }

    pub fn tenant_preference_slot(&self, value: TenantPreference) -> Option<usize> {
        self.tenant_preference.slot(value)
    }

    pub fn contact_method_slot(&self, value: ContactMethod) -> Option<usize> {
        self.contact_method.slot(value)
    }

    /// Compare the schema against every value the form can produce.
    pub fn drift(&self) -> SchemaDrift {
        let missing_categories = self
            .area_type
            .missing::<AreaType>()
            .chain(self.city.missing::<City>())
            .chain(self.furnishing.missing::<Furnishing>())
            .chain(self.tenant_preference.missing::<TenantPreference>())
            .chain(self.contact_method.missing::<ContactMethod>())
            .collect();

        let reachable: HashSet<usize> = self
            .numeric_slots
            .iter()
            .copied()
            .chain(self.area_type.slots.iter().flatten().copied())
            .chain(self.city.slots.iter().flatten().copied())
            .chain(self.furnishing.slots.iter().flatten().copied())
            .chain(self.tenant_preference.slots.iter().flatten().copied())
            .chain(self.contact_method.slots.iter().flatten().copied())
            .collect();

        let unreachable_columns = self
            .columns
            .iter()
            .enumerate()
            .filter(|(slot, _)| !reachable.contains(slot))
            .map(|(_, name)| name.clone())
            .collect();

        SchemaDrift {
            missing_categories,
            unreachable_columns,
        }
    }

    /// Log any drift once; in strict mode drift is a configuration error.
    pub fn check_drift(&self, strict: bool) -> Result<SchemaDrift> {
        let drift = self.drift();
        if drift.is_empty() {
            return Ok(drift);
        }

        if strict {
            return Err(Error::Configuration(format!(
                "column list does not match the form: missing {:?}, unreachable {:?}",
                drift.missing_categories, drift.unreachable_columns
            )));
        }

        if !drift.missing_categories.is_empty() {
            warn!(
                columns = ?drift.missing_categories,
                "Selectable categories have no model column and will encode as all zeros"
            );
        }
        if !drift.unreachable_columns.is_empty() {
            warn!(
                columns = ?drift.unreachable_columns,
                "Model columns can never be set by the form and will always be zero"
            );
        }
        Ok(drift)
    }
}

/// Every column the form can reach, in the order a dummy expansion emits them.
#[cfg(test)]
pub(crate) fn full_columns() -> Vec<String> {
    let mut columns: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(AreaType::all().iter().map(|v| v.column_name()));
    columns.extend(City::all().iter().map(|v| v.column_name()));
    columns.extend(Furnishing::all().iter().map(|v| v.column_name()));
    columns.extend(TenantPreference::all().iter().map(|v| v.column_name()));
    columns.extend(ContactMethod::all().iter().map(|v| v.column_name()));
    columns
}
