//! Property attributes as supplied by the valuation form.
//!
//! Category labels and field names are the ones the training pipeline saw, so
//! `{field}_{label}` reproduces the one-hot column names stored in the
//! canonical column list.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Training column names of the numeric features, in scaler order.
pub const NUMERIC_COLUMNS: [&str; 4] = ["BHK", "Size", "Bathroom", "Floor"];

/// A closed categorical field that one-hot expands into `{FIELD}_{label}` columns.
pub trait Category: Copy + Sized + 'static {
    /// Field name used as the one-hot column prefix.
    const FIELD: &'static str;

    /// Every selectable value, in declaration order.
    fn all() -> &'static [Self];

    /// Label as it appears in the training data.
    fn label(&self) -> &'static str;

    /// Position of this value within [`Category::all`].
    fn ordinal(&self) -> usize;

    /// One-hot column name for this value.
    fn column_name(&self) -> String {
        format!("{}_{}", Self::FIELD, self.label())
    }
}

macro_rules! category {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $label:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label $(, alias = $alias)*)]
                $variant,
            )+
        }

        impl Category for $name {
            const FIELD: &'static str = $field;

            fn all() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            fn ordinal(&self) -> usize {
                *self as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

category! {
    /// How the listed size was measured.
    AreaType, "Area Type" {
        SuperArea => "Super Area" | "SuperArea",
        CarpetArea => "Carpet Area" | "CarpetArea",
        BuiltArea => "Built Area" | "BuiltArea",
    }
}

category! {
    /// Cities offered by the valuation form.
    City, "City" {
        Mumbai => "Mumbai",
        Bangalore => "Bangalore",
        Delhi => "Delhi",
        Kolkata => "Kolkata",
        Hyderabad => "Hyderabad",
        Chennai => "Chennai",
    }
}

category! {
    Furnishing, "Furnishing Status" {
        Unfurnished => "Unfurnished",
        SemiFurnished => "Semi-Furnished" | "SemiFurnished",
        Furnished => "Furnished",
    }
}

category! {
    TenantPreference, "Tenant Preferred" {
        Bachelors => "Bachelors",
        BachelorsOrFamily => "Bachelors/Family" | "BachelorsOrFamily",
        Family => "Family",
    }
}

category! {
    /// Who the listing is handled by.
    ContactMethod, "Point of Contact" {
        Owner => "Contact Owner" | "Owner",
        Agent => "Contact Agent" | "Agent",
        Builder => "Contact Builder" | "Builder",
    }
}

/// A single rental property to be valued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAttributes {
    /// Number of bedrooms (BHK), 1-10
    #[serde(alias = "bhk")]
    pub bedrooms: u32,

    /// Size in square feet, 100-10000
    pub size: u32,

    /// Number of bathrooms, 1-10
    #[serde(alias = "bath")]
    pub bathrooms: u32,

    /// Floor level, -1 (basement) to 100
    pub floor: i32,

    pub area_type: AreaType,
    pub city: City,
    pub furnishing: Furnishing,

    #[serde(alias = "tenant")]
    pub tenant_preference: TenantPreference,

    #[serde(alias = "contact")]
    pub contact_method: ContactMethod,
}

impl PropertyAttributes {
    pub const BEDROOMS_RANGE: (u32, u32) = (1, 10);
    pub const SIZE_RANGE: (u32, u32) = (100, 10_000);
    pub const BATHROOMS_RANGE: (u32, u32) = (1, 10);
    pub const FLOOR_RANGE: (i32, i32) = (-1, 100);

    /// Check the numeric fields against the ranges the form allows.
    pub fn validate(&self) -> Result<()> {
        check_range("bedrooms", self.bedrooms, Self::BEDROOMS_RANGE)?;
        check_range("size", self.size, Self::SIZE_RANGE)?;
        check_range("bathrooms", self.bathrooms, Self::BATHROOMS_RANGE)?;
        check_range("floor", self.floor, Self::FLOOR_RANGE)?;
        Ok(())
    }

    /// Numeric features in [`NUMERIC_COLUMNS`] order.
    pub fn numeric_values(&self) -> [f64; 4] {
        [
            f64::from(self.bedrooms),
            f64::from(self.size),
            f64::from(self.bathrooms),
            f64::from(self.floor),
        ]
    }

    /// One-hot column names produced by this record, one per categorical field.
    pub fn one_hot_columns(&self) -> [String; 5] {
        [
            self.area_type.column_name(),
            self.city.column_name(),
            self.furnishing.column_name(),
            self.tenant_preference.column_name(),
            self.contact_method.column_name(),
        ]
    }
}

fn check_range<T>(name: &str, value: T, (min, max): (T, T)) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(Error::InvalidInput(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(())
}
