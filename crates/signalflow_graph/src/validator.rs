// SPDX-License-Identifier: MIT OR Apache-2.0
//! Data validators shared by block implementations.
//!
//! Every check fails with a typed [`DataTypeError`] which the core
//! propagates to the caller of the triggering edit unmodified.

use crate::data::{Data, DataKind, Signal, Unit};
use crate::error::DataTypeError;

/// Relative tolerance for comparing sampling grids.
const EPS: f64 = 1e-9;

/// Require `data` to be a signal; fails naming the offending port.
pub fn check_type_signal<'a>(port: &str, data: &'a Data) -> Result<&'a Signal, DataTypeError> {
    match data {
        Data::Signal(signal) => Ok(signal),
        other => Err(DataTypeError::KindMismatch {
            port: port.to_string(),
            expected: DataKind::Signal,
            actual: other.kind(),
        }),
    }
}

/// Require all units to be equal. Empty and single-element slices pass.
pub fn check_same_units(units: &[&Unit]) -> Result<(), DataTypeError> {
    let Some(first) = units.first() else {
        return Ok(());
    };
    for unit in &units[1..] {
        if unit != first {
            return Err(DataTypeError::UnitMismatch {
                expected: (*first).clone(),
                actual: (*unit).clone(),
            });
        }
    }
    Ok(())
}

/// Require all signals to share one sampling grid: finite positive
/// increments, equal across signals, and abscissa starts offset by whole
/// multiples of the increment.
pub fn check_intervals(signals: &[&Signal]) -> Result<(), DataTypeError> {
    let Some(first) = signals.first() else {
        return Ok(());
    };
    // Degenerate grids would turn the offset arithmetic below (and any
    // span matching built on it) into NaN, so they are rejected up front.
    for signal in signals {
        if !signal.increment.is_finite()
            || signal.increment <= 0.0
            || !signal.abscissa_start.is_finite()
        {
            return Err(DataTypeError::IntervalMismatch);
        }
    }
    let increment = first.increment;
    for signal in &signals[1..] {
        if (signal.increment - increment).abs() > EPS * increment {
            return Err(DataTypeError::IntervalMismatch);
        }
        let offset = (signal.abscissa_start - first.abscissa_start) / increment;
        if (offset - offset.round()).abs() > EPS * offset.abs().max(1.0) {
            return Err(DataTypeError::IntervalMismatch);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_is_not_a_signal() {
        let err = check_type_signal("in 1", &Data::Scalar(3.0)).unwrap_err();
        assert!(matches!(err, DataTypeError::KindMismatch { .. }));
    }

    #[test]
    fn unit_mismatch_is_detected() {
        let volt = Unit::new("V");
        let ampere = Unit::new("A");
        assert!(check_same_units(&[&volt, &volt]).is_ok());
        assert!(check_same_units(&[&volt, &ampere]).is_err());
    }

    #[test]
    fn degenerate_grids_are_rejected() {
        let flat = Signal::new(0.0, 0.0, vec![0.0; 10]);
        let backwards = Signal::new(0.0, -0.01, vec![0.0; 10]);
        let nan = Signal::new(0.0, f64::NAN, vec![0.0; 10]);
        let unanchored = Signal::new(f64::INFINITY, 0.01, vec![0.0; 10]);
        let ok = Signal::new(0.0, 0.01, vec![0.0; 10]);
        assert!(check_intervals(&[&flat]).is_err());
        assert!(check_intervals(&[&backwards]).is_err());
        assert!(check_intervals(&[&ok, &nan]).is_err());
        assert!(check_intervals(&[&ok, &unanchored]).is_err());
    }

    #[test]
    fn misaligned_grids_are_rejected() {
        let a = Signal::new(0.0, 0.01, vec![0.0; 10]);
        let aligned = Signal::new(0.05, 0.01, vec![0.0; 10]);
        let shifted = Signal::new(0.005, 0.01, vec![0.0; 10]);
        let coarser = Signal::new(0.0, 0.02, vec![0.0; 10]);
        assert!(check_intervals(&[&a, &aligned]).is_ok());
        assert!(check_intervals(&[&a, &shifted]).is_err());
        assert!(check_intervals(&[&a, &coarser]).is_err());
    }
}
