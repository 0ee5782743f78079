//! # Unit Converter Module
//!
//! Converts `(amount, unit)` pairs into a common base unit per measurement
//! family so quantities phrased in different units can be summed.
//!
//! | Family | Base unit | Members |
//! |--------|-----------|---------|
//! | Volume | cup | tbsp, tsp, ml, l |
//! | Weight | lb | oz, g, kg |
//! | Count | (itself) | clove, piece |
//!
//! There is no conversion between families. Unknown units pass through
//! unchanged.

use log::trace;

const ML_PER_CUP: f64 = 236.588;
const G_PER_LB: f64 = 453.592;
const LB_PER_KG: f64 = 2.20462;

/// Measurement family of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitFamily {
    /// Volume units, summed in cups
    Volume,
    /// Weight units, summed in pounds
    Weight,
    /// Counted units (cloves, pieces), summed as-is
    Count,
    /// Anything not in the conversion table
    Unknown,
}

impl UnitFamily {
    /// Family of a unit token, matched case-insensitively
    pub fn of(unit: &str) -> Self {
        base_factor(unit).map_or(UnitFamily::Unknown, |(family, _)| family)
    }

    /// Base unit of the family, if the family has a shared one
    pub fn base_unit(&self) -> Option<&'static str> {
        match self {
            UnitFamily::Volume => Some("cup"),
            UnitFamily::Weight => Some("lb"),
            UnitFamily::Count | UnitFamily::Unknown => None,
        }
    }

    /// Check if this is a volume family
    pub fn is_volume(&self) -> bool {
        matches!(self, UnitFamily::Volume)
    }

    /// Check if this is a weight family
    pub fn is_weight(&self) -> bool {
        matches!(self, UnitFamily::Weight)
    }

    /// Check if this is a count family
    pub fn is_count(&self) -> bool {
        matches!(self, UnitFamily::Count)
    }
}

/// Family and multiplier into the family's base unit
fn base_factor(unit: &str) -> Option<(UnitFamily, f64)> {
    let unit = unit.trim().trim_end_matches('.').to_lowercase();
    let factor = match unit.as_str() {
        "cup" | "cups" | "c" => (UnitFamily::Volume, 1.0),
        "tbsp" | "tbsps" | "tbs" | "tablespoon" | "tablespoons" => (UnitFamily::Volume, 1.0 / 16.0),
        "tsp" | "tsps" | "teaspoon" | "teaspoons" => (UnitFamily::Volume, 1.0 / 48.0),
        "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
            (UnitFamily::Volume, 1.0 / ML_PER_CUP)
        }
        "l" | "liter" | "liters" | "litre" | "litres" => (UnitFamily::Volume, 1000.0 / ML_PER_CUP),
        "lb" | "lbs" | "pound" | "pounds" => (UnitFamily::Weight, 1.0),
        "oz" | "ounce" | "ounces" => (UnitFamily::Weight, 1.0 / 16.0),
        "g" | "gram" | "grams" => (UnitFamily::Weight, 1.0 / G_PER_LB),
        "kg" | "kilogram" | "kilograms" => (UnitFamily::Weight, LB_PER_KG),
        "clove" | "cloves" | "piece" | "pieces" => (UnitFamily::Count, 1.0),
        _ => return None,
    };
    Some(factor)
}

/// Convert an amount into its family's base unit
///
/// Unknown units are returned unchanged.
///
/// # Examples
///
/// ```rust
/// use grocery_aggregator::unit_converter::convert_to_base;
///
/// assert_eq!(convert_to_base(2.0, "tbsp"), 0.125);
/// assert_eq!(convert_to_base(8.0, "oz"), 0.5);
/// assert_eq!(convert_to_base(3.0, "clove"), 3.0);
/// assert_eq!(convert_to_base(2.0, "handful"), 2.0);
/// ```
pub fn convert_to_base(amount: f64, unit: &str) -> f64 {
    match base_factor(unit) {
        Some((_, factor)) => amount * factor,
        None => {
            trace!("No conversion for unit '{}', keeping amount {}", unit, amount);
            amount
        }
    }
}

/// Convert an amount expressed in the family's base unit back into `unit`
pub fn convert_from_base(amount: f64, unit: &str) -> f64 {
    match base_factor(unit) {
        Some((_, factor)) => amount / factor,
        None => amount,
    }
}

/// Check whether two units can be summed after conversion
pub fn are_compatible(left: &str, right: &str) -> bool {
    match (UnitFamily::of(left), UnitFamily::of(right)) {
        (UnitFamily::Unknown, _) | (_, UnitFamily::Unknown) => {
            left.trim().eq_ignore_ascii_case(right.trim())
        }
        (a, b) => a == b,
    }
}
