//! Physical quantities and units for channel axes
//!
//! A channel axis is tagged with a [`Quantity`]: a human-readable name plus a
//! [`Unit`]. Units are an SI prefix over a small closed set of base
//! dimensions; conversion between units of the same dimension is a pure
//! scale factor. Conversion across dimensions is an error, never a silent
//! pass-through.

use crate::error::{Error, Result};
use std::fmt;

/// Base physical dimensions that appear on force-curve axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseUnit {
    /// Distance (metre)
    Meter,
    /// Force (newton)
    Newton,
    /// Photodiode voltage (volt)
    Volt,
    /// Dimensionless axis (e.g. point index)
    Dimensionless,
}

impl BaseUnit {
    /// Unit symbol without prefix.
    pub fn symbol(&self) -> &'static str {
        match self {
            BaseUnit::Meter => "m",
            BaseUnit::Newton => "N",
            BaseUnit::Volt => "V",
            BaseUnit::Dimensionless => "",
        }
    }
}

/// Decimal SI prefix, stored as the power of ten it denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiPrefix {
    Femto,
    Pico,
    Nano,
    Micro,
    Milli,
    None,
    Kilo,
}

impl SiPrefix {
    /// Power of ten this prefix denotes.
    pub fn exponent(&self) -> i32 {
        match self {
            SiPrefix::Femto => -15,
            SiPrefix::Pico => -12,
            SiPrefix::Nano => -9,
            SiPrefix::Micro => -6,
            SiPrefix::Milli => -3,
            SiPrefix::None => 0,
            SiPrefix::Kilo => 3,
        }
    }

    /// Prefix symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            SiPrefix::Femto => "f",
            SiPrefix::Pico => "p",
            SiPrefix::Nano => "n",
            SiPrefix::Micro => "u",
            SiPrefix::Milli => "m",
            SiPrefix::None => "",
            SiPrefix::Kilo => "k",
        }
    }
}

/// An SI-prefixed unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unit {
    pub prefix: SiPrefix,
    pub base: BaseUnit,
}

impl Unit {
    pub fn new(prefix: SiPrefix, base: BaseUnit) -> Self {
        Self { prefix, base }
    }

    /// Unprefixed unit of the given base dimension.
    pub fn base(base: BaseUnit) -> Self {
        Self {
            prefix: SiPrefix::None,
            base,
        }
    }

    /// Multiplicative factor converting a value in `self` into `other`.
    ///
    /// Fails when the base dimensions differ.
    pub fn conversion_factor_to(&self, other: &Unit) -> Result<f64> {
        if self.base != other.base {
            return Err(Error::incompatible_units(
                &self.to_string(),
                &other.to_string(),
            ));
        }
        let exponent = self.prefix.exponent() - other.prefix.exponent();
        Ok(10f64.powi(exponent))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix.symbol(), self.base.symbol())
    }
}

/// A named physical quantity: what an axis measures, and in which unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantity {
    name: String,
    unit: Unit,
}

impl Quantity {
    pub fn new(name: impl Into<String>, unit: Unit) -> Self {
        Self {
            name: name.into(),
            unit,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Same quantity expressed in a different unit of the same dimension.
    pub fn in_unit(&self, unit: Unit) -> Result<Quantity> {
        // Validates dimension compatibility up front.
        self.unit.conversion_factor_to(&unit)?;
        Ok(Quantity {
            name: self.name.clone(),
            unit,
        })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.unit)
    }
}
