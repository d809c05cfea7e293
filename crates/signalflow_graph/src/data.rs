// SPDX-License-Identifier: MIT OR Apache-2.0
//! Data values flowing through ports and their semantic metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of data a port produces or requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataKind {
    /// Uniformly sampled signal
    Signal,
    /// Single dimensionless value
    Scalar,
    /// Any kind (for generic ports)
    Any,
}

impl DataKind {
    /// Check whether data of kind `produced` satisfies this required kind.
    pub fn accepts(&self, produced: DataKind) -> bool {
        matches!(self, Self::Any) || matches!(produced, DataKind::Any) || *self == produced
    }
}

/// A data value held by an output port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Data {
    /// Uniformly sampled signal
    Signal(Signal),
    /// Single value
    Scalar(f64),
}

impl Data {
    /// Kind of this value.
    pub fn kind(&self) -> DataKind {
        match self {
            Self::Signal(_) => DataKind::Signal,
            Self::Scalar(_) => DataKind::Scalar,
        }
    }

    /// Borrow the contained signal, if this is one.
    pub fn as_signal(&self) -> Option<&Signal> {
        match self {
            Self::Signal(signal) => Some(signal),
            Self::Scalar(_) => None,
        }
    }

    /// Borrow the contained scalar, if this is one.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            Self::Signal(_) => None,
        }
    }
}

/// A uniformly sampled signal.
///
/// The abscissa is implicit: sample `i` sits at
/// `abscissa_start + i * increment`. Invariant: `ordinate.len() == values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Abscissa value of the first sample
    pub abscissa_start: f64,
    /// Distance between adjacent samples
    pub increment: f64,
    /// Number of samples
    pub values: usize,
    /// Sample values
    pub ordinate: Vec<f64>,
}

impl Signal {
    /// Create a signal from its ordinate values.
    pub fn new(abscissa_start: f64, increment: f64, ordinate: Vec<f64>) -> Self {
        Self {
            abscissa_start,
            increment,
            values: ordinate.len(),
            ordinate,
        }
    }

    /// Abscissa value of the last sample.
    pub fn abscissa_end(&self) -> f64 {
        if self.values == 0 {
            self.abscissa_start
        } else {
            self.abscissa_start + self.increment * (self.values - 1) as f64
        }
    }
}

/// Physical unit attached to an axis, compared symbolically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit(String);

impl Unit {
    /// Create a unit from its symbol (`"s"`, `"V"`, `"Hz"`, ...).
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// The dimensionless unit.
    pub fn one() -> Self {
        Self("1".to_string())
    }

    /// Unit symbol.
    pub fn symbol(&self) -> &str {
        &self.0
    }

    /// Product of two units, e.g. `V * V = V*V`.
    pub fn product(&self, other: &Unit) -> Unit {
        match (self.0.as_str(), other.0.as_str()) {
            ("1", _) => other.clone(),
            (_, "1") => self.clone(),
            (a, b) => Unit(format!("{a}*{b}")),
        }
    }

    /// Ratio of two units, e.g. `V / s = V/s`.
    pub fn ratio(&self, other: &Unit) -> Unit {
        match (self.0.as_str(), other.0.as_str()) {
            (_, "1") => self.clone(),
            (a, b) if a == b => Unit::one(),
            (a, b) => Unit(format!("{a}/{b}")),
        }
    }
}

impl Default for Unit {
    fn default() -> Self {
        Self::one()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Semantic shape of a signal: per-axis quantity, symbol and unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Signal name
    pub name: String,
    /// Abscissa quantity (e.g. "Time")
    pub quantity_a: String,
    /// Abscissa symbol (e.g. "t")
    pub symbol_a: String,
    /// Abscissa unit
    pub unit_a: Unit,
    /// Ordinate quantity (e.g. "Voltage")
    pub quantity_o: String,
    /// Ordinate symbol (e.g. "U")
    pub symbol_o: String,
    /// Ordinate unit
    pub unit_o: Unit,
}

impl Metadata {
    /// Metadata with only the axis units set.
    pub fn with_units(unit_a: Unit, unit_o: Unit) -> Self {
        Self {
            unit_a,
            unit_o,
            ..Self::default()
        }
    }

    /// Conventional time/voltage metadata for generated signals.
    pub fn time_voltage(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity_a: "Time".to_string(),
            symbol_a: "t".to_string(),
            unit_a: Unit::new("s"),
            quantity_o: "Voltage".to_string(),
            symbol_o: "U".to_string(),
            unit_o: Unit::new("V"),
        }
    }
}
