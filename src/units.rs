//! Unit conversion within a single category.
//!
//! Length and weight are linear: each unit has a scale factor relative to
//! the category base (metre, kilogram). Temperature is affine and converts
//! through Kelvin with a to-base/from-base function pair.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Unsupported conversion from '{from}' to '{to}'")]
    UnsupportedConversion { from: String, to: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Length,
    Weight,
    Temperature,
}

impl Category {
    pub fn base_unit(self) -> &'static str {
        match self {
            Self::Length => "m",
            Self::Weight => "kg",
            Self::Temperature => "kelvin",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Length => "length",
            Self::Weight => "weight",
            Self::Temperature => "temperature",
        };
        f.write_str(name)
    }
}

/// How a unit maps onto its category base.
#[derive(Clone, Copy)]
enum Scale {
    /// `base = value * factor`
    Linear(f64),
    /// Explicit conversion functions for non-linear categories.
    Affine {
        to_base: fn(f64) -> f64,
        from_base: fn(f64) -> f64,
    },
}

impl Scale {
    fn to_base(self, value: f64) -> f64 {
        match self {
            Self::Linear(factor) => value * factor,
            Self::Affine { to_base, .. } => to_base(value),
        }
    }

    fn from_base(self, value: f64) -> f64 {
        match self {
            Self::Linear(factor) => value / factor,
            Self::Affine { from_base, .. } => from_base(value),
        }
    }
}

#[derive(Clone, Copy)]
struct UnitDef {
    category: Category,
    scale: Scale,
}

const KELVIN_OFFSET: f64 = 273.15;

lazy_static! {
    static ref UNITS: HashMap<&'static str, UnitDef> = {
        let mut m = HashMap::new();
        let mut linear = |name: &'static str, category: Category, factor: f64| {
            m.insert(name, UnitDef { category, scale: Scale::Linear(factor) });
        };

        linear("mm", Category::Length, 0.001);
        linear("cm", Category::Length, 0.01);
        linear("m", Category::Length, 1.0);
        linear("km", Category::Length, 1000.0);
        linear("in", Category::Length, 0.0254);
        linear("ft", Category::Length, 0.3048);
        linear("yd", Category::Length, 0.9144);
        linear("mi", Category::Length, 1609.344);

        linear("mg", Category::Weight, 0.000_001);
        linear("g", Category::Weight, 0.001);
        linear("kg", Category::Weight, 1.0);
        linear("t", Category::Weight, 1000.0);
        linear("oz", Category::Weight, 0.028_349_523_125);
        linear("lb", Category::Weight, 0.453_592_37);
        linear("st", Category::Weight, 6.350_293_18);

        let temperature = |to_base: fn(f64) -> f64, from_base: fn(f64) -> f64| UnitDef {
            category: Category::Temperature,
            scale: Scale::Affine { to_base, from_base },
        };
        let celsius = temperature(|c| c + KELVIN_OFFSET, |k| k - KELVIN_OFFSET);
        let fahrenheit = temperature(
            |f| (f - 32.0) * 5.0 / 9.0 + KELVIN_OFFSET,
            |k| (k - KELVIN_OFFSET) * 9.0 / 5.0 + 32.0,
        );
        let kelvin = temperature(|k| k, |k| k);
        for (name, def) in [
            ("celsius", celsius),
            ("C", celsius),
            ("fahrenheit", fahrenheit),
            ("F", fahrenheit),
            ("kelvin", kelvin),
            ("K", kelvin),
        ] {
            m.insert(name, def);
        }
        m
    };
}

/// Exact names win, so the upper-case temperature shorthands (`C`, `F`, `K`)
/// stay distinct; everything else is matched case-insensitively.
fn lookup(unit: &str) -> Option<UnitDef> {
    let key = unit.trim();
    UNITS
        .get(key)
        .or_else(|| UNITS.get(key.to_ascii_lowercase().as_str()))
        .copied()
}

/// The category a unit belongs to, if it is known.
pub fn category_of(unit: &str) -> Option<Category> {
    lookup(unit).map(|def| def.category)
}

/// Every known unit name in a category, sorted.
pub fn units_in(category: Category) -> Vec<&'static str> {
    let mut names: Vec<_> = UNITS
        .iter()
        .filter(|(_, def)| def.category == category)
        .map(|(name, _)| *name)
        .collect();
    names.sort_unstable();
    names
}

/// Convert `value` from one unit to another in the same category.
///
/// # Errors
///
/// [`ConversionError::UnsupportedConversion`] when either unit is unknown
/// or the two units belong to different categories.
pub fn convert_unit(value: f64, from: &str, to: &str) -> Result<f64, ConversionError> {
    let unsupported = || ConversionError::UnsupportedConversion {
        from: from.to_string(),
        to: to.to_string(),
    };

    let source = lookup(from).ok_or_else(unsupported)?;
    let target = lookup(to).ok_or_else(unsupported)?;
    if source.category != target.category {
        debug!(from, to, "Units belong to different categories");
        return Err(unsupported());
    }

    let base = source.scale.to_base(value);
    Ok(target.scale.from_base(base))
}
