// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared helpers for arithmetic blocks.

use signalflow_graph::Signal;

/// Match signals onto the union of their abscissa spans, padding the
/// missing stretches with zeros.
///
/// Callers must have validated the grids first (equal increments,
/// aligned starts); see `signalflow_graph::validator::check_intervals`.
pub(crate) fn fill_zeros(signals: &[&Signal]) -> Vec<Signal> {
    let Some(first) = signals.first() else {
        return Vec::new();
    };
    let increment = first.increment;
    let start = signals
        .iter()
        .map(|signal| signal.abscissa_start)
        .fold(f64::INFINITY, f64::min);
    let end = signals
        .iter()
        .map(|signal| signal.abscissa_end())
        .fold(f64::NEG_INFINITY, f64::max);
    let values = ((end - start) / increment).round() as usize + 1;

    signals
        .iter()
        .map(|signal| {
            let offset = ((signal.abscissa_start - start) / increment).round() as usize;
            let mut ordinate = vec![0.0; values];
            ordinate[offset..offset + signal.values].copy_from_slice(&signal.ordinate);
            Signal::new(start, increment, ordinate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_the_union_span() {
        let a = Signal::new(0.0, 1.0, vec![1.0, 1.0]);
        let b = Signal::new(2.0, 1.0, vec![5.0, 5.0]);
        let matched = fill_zeros(&[&a, &b]);
        assert_eq!(matched[0].ordinate, vec![1.0, 1.0, 0.0, 0.0]);
        assert_eq!(matched[1].ordinate, vec![0.0, 0.0, 5.0, 5.0]);
        assert!((matched[1].abscissa_start - 0.0).abs() < 1e-12);
    }
}
