//! Confusion tabulation and confusion-derived rates.
//!
//! [`ConfusionTable`] cross-tabulates actual vs. predicted labels into a
//! sparse labeled count table; [`BinaryCounts`] is its coerced 2×2 form,
//! carrying the standard binary-classifier rates.

use std::collections::{BTreeMap, BTreeSet};

use caliper_core::{CaliperError, Result, Summarizable};

// ---------------------------------------------------------------------------
// Confusion table
// ---------------------------------------------------------------------------

/// Sparse labeled cross-tabulation of (actual, predicted) label pairs.
///
/// Rows are the distinct values occurring in `actual`, columns the distinct
/// values occurring in `predicted`, both in ascending order. A label absent
/// from one of the two inputs produces no row/column — the table mirrors a
/// cross-tabulation, not a fixed-size matrix. Callers that need a guaranteed
/// 2×2 go through [`ConfusionTable::binary_counts`], which fails loudly when
/// a class is missing rather than zero-filling it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionTable {
    counts: BTreeMap<(i32, i32), usize>,
    actual_labels: Vec<i32>,
    predicted_labels: Vec<i32>,
    total: usize,
}

impl ConfusionTable {
    /// Tabulate actual vs. predicted label vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the slices are empty or have different lengths.
    pub fn from_labels(actual: &[i32], predicted: &[i32]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(CaliperError::LengthMismatch {
                left: actual.len(),
                right: predicted.len(),
            });
        }
        if actual.is_empty() {
            return Err(CaliperError::InvalidInput("empty label vectors".into()));
        }

        let mut counts: BTreeMap<(i32, i32), usize> = BTreeMap::new();
        for (&a, &p) in actual.iter().zip(predicted.iter()) {
            *counts.entry((a, p)).or_insert(0) += 1;
        }

        let actual_labels: Vec<i32> = actual.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let predicted_labels: Vec<i32> =
            predicted.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

        Ok(Self {
            counts,
            actual_labels,
            predicted_labels,
            total: actual.len(),
        })
    }

    /// Count for a specific (actual, predicted) pair. 0 for a cell whose
    /// row/column exists but was never hit (and for labels outside the table).
    #[inline]
    pub fn get(&self, actual: i32, predicted: i32) -> usize {
        self.counts.get(&(actual, predicted)).copied().unwrap_or(0)
    }

    /// Distinct values seen in `actual`, ascending (the row labels).
    pub fn actual_labels(&self) -> &[i32] {
        &self.actual_labels
    }

    /// Distinct values seen in `predicted`, ascending (the column labels).
    pub fn predicted_labels(&self) -> &[i32] {
        &self.predicted_labels
    }

    /// Total number of samples (sum of all cells).
    pub fn total(&self) -> usize {
        self.total
    }

    /// Row-major cell counts over the present rows × columns.
    ///
    /// For the binary table (rows and columns both `{0, 1}`) this is exactly
    /// `[TN, FP, FN, TP]`.
    pub fn ravel(&self) -> Vec<usize> {
        let mut cells = Vec::with_capacity(self.actual_labels.len() * self.predicted_labels.len());
        for &a in &self.actual_labels {
            for &p in &self.predicted_labels {
                cells.push(self.get(a, p));
            }
        }
        cells
    }

    /// Coerce to the guaranteed 2×2 binary form.
    ///
    /// # Errors
    ///
    /// Returns an error unless rows and columns are exactly `{0, 1}` — i.e.
    /// both classes occur in both inputs. The sparse table never zero-fills
    /// an absent class; deciding how to handle one is the caller's job.
    pub fn binary_counts(&self) -> Result<BinaryCounts> {
        if self.actual_labels != [0, 1] || self.predicted_labels != [0, 1] {
            return Err(CaliperError::InvalidInput(format!(
                "binary coercion needs classes {{0, 1}} on both axes; actual has {:?}, predicted has {:?}",
                self.actual_labels, self.predicted_labels,
            )));
        }
        Ok(BinaryCounts {
            true_negatives: self.get(0, 0),
            false_positives: self.get(0, 1),
            false_negatives: self.get(1, 0),
            true_positives: self.get(1, 1),
        })
    }
}

impl Summarizable for ConfusionTable {
    fn summary(&self) -> String {
        format!(
            "ConfusionTable: {}x{}, n={}",
            self.actual_labels.len(),
            self.predicted_labels.len(),
            self.total,
        )
    }
}

// ---------------------------------------------------------------------------
// Binary counts and rates
// ---------------------------------------------------------------------------

/// The four outcome counts of a binary classifier.
///
/// Rate methods return [`CaliperError::UndefinedRate`] when their denominator
/// is structurally zero (a class entirely absent) instead of a silent NaN or
/// 0; callers that want a default write `.unwrap_or(..)` at the call site.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryCounts {
    /// Actual 0, predicted 0.
    pub true_negatives: usize,
    /// Actual 0, predicted 1.
    pub false_positives: usize,
    /// Actual 1, predicted 0.
    pub false_negatives: usize,
    /// Actual 1, predicted 1.
    pub true_positives: usize,
}

impl BinaryCounts {
    /// Total number of samples.
    pub fn total(&self) -> usize {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }

    /// Recall (sensitivity): `TP / (TP + FN)`.
    pub fn recall(&self) -> Result<f64> {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
            "recall: no actual positives (TP + FN == 0)",
        )
    }

    /// True positive rate; same quantity as [`BinaryCounts::recall`].
    pub fn true_positive_rate(&self) -> Result<f64> {
        self.recall()
    }

    /// Specificity: `TN / (TN + FP)`.
    pub fn specificity(&self) -> Result<f64> {
        ratio(
            self.true_negatives,
            self.true_negatives + self.false_positives,
            "specificity: no actual negatives (TN + FP == 0)",
        )
    }

    /// True negative rate; same quantity as [`BinaryCounts::specificity`].
    pub fn true_negative_rate(&self) -> Result<f64> {
        self.specificity()
    }

    /// Precision: `TP / (TP + FP)`.
    pub fn precision(&self) -> Result<f64> {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
            "precision: nothing predicted positive (TP + FP == 0)",
        )
    }

    /// False positive rate: `FP / (FP + TN)`.
    pub fn false_positive_rate(&self) -> Result<f64> {
        ratio(
            self.false_positives,
            self.false_positives + self.true_negatives,
            "false positive rate: no actual negatives (FP + TN == 0)",
        )
    }

    /// False negative rate: `FN / (FN + TP)`.
    pub fn false_negative_rate(&self) -> Result<f64> {
        ratio(
            self.false_negatives,
            self.false_negatives + self.true_positives,
            "false negative rate: no actual positives (FN + TP == 0)",
        )
    }

    /// Overall accuracy: `(TP + TN) / total`.
    pub fn accuracy(&self) -> Result<f64> {
        ratio(
            self.true_positives + self.true_negatives,
            self.total(),
            "accuracy: zero samples",
        )
    }

    /// F1 score (harmonic mean of precision and recall).
    ///
    /// 0.0 when precision and recall are both defined and both 0; propagates
    /// [`CaliperError::UndefinedRate`] when either is undefined.
    pub fn f1(&self) -> Result<f64> {
        let p = self.precision()?;
        let r = self.recall()?;
        if p + r == 0.0 {
            return Ok(0.0);
        }
        Ok(2.0 * p * r / (p + r))
    }
}

impl Summarizable for BinaryCounts {
    fn summary(&self) -> String {
        format!(
            "BinaryCounts: tn={}, fp={}, fn={}, tp={}",
            self.true_negatives, self.false_positives, self.false_negatives, self.true_positives,
        )
    }
}

#[inline]
fn ratio(numerator: usize, denominator: usize, undefined: &'static str) -> Result<f64> {
    if denominator == 0 {
        return Err(CaliperError::UndefinedRate(undefined));
    }
    Ok(numerator as f64 / denominator as f64)
}

// ---------------------------------------------------------------------------
// Standalone rate functions
// ---------------------------------------------------------------------------

/// Recall from raw label vectors. Requires both classes present in both
/// inputs (see [`ConfusionTable::binary_counts`]).
pub fn recall(actual: &[i32], predicted: &[i32]) -> Result<f64> {
    binary_counts(actual, predicted)?.recall()
}

/// Specificity from raw label vectors.
pub fn specificity(actual: &[i32], predicted: &[i32]) -> Result<f64> {
    binary_counts(actual, predicted)?.specificity()
}

/// Precision from raw label vectors.
pub fn precision(actual: &[i32], predicted: &[i32]) -> Result<f64> {
    binary_counts(actual, predicted)?.precision()
}

/// False positive rate from raw label vectors.
pub fn false_positive_rate(actual: &[i32], predicted: &[i32]) -> Result<f64> {
    binary_counts(actual, predicted)?.false_positive_rate()
}

/// False negative rate from raw label vectors.
pub fn false_negative_rate(actual: &[i32], predicted: &[i32]) -> Result<f64> {
    binary_counts(actual, predicted)?.false_negative_rate()
}

/// Tabulate and coerce in one step.
pub fn binary_counts(actual: &[i32], predicted: &[i32]) -> Result<BinaryCounts> {
    ConfusionTable::from_labels(actual, predicted)?.binary_counts()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn label_pairs() -> impl Strategy<Value = (Vec<i32>, Vec<i32>)> {
        proptest::collection::vec((0..4i32, 0..4i32), 1..80)
            .prop_map(|pairs| pairs.into_iter().unzip())
    }

    proptest! {
        #[test]
        fn cell_sum_equals_n((actual, predicted) in label_pairs()) {
            let table = ConfusionTable::from_labels(&actual, &predicted).unwrap();
            prop_assert_eq!(table.ravel().iter().sum::<usize>(), actual.len());
            prop_assert_eq!(table.total(), actual.len());
        }

        #[test]
        fn defined_rates_are_bounded(
            (actual, predicted) in proptest::collection::vec((0..2i32, 0..2i32), 1..80)
                .prop_map(|pairs| pairs.into_iter().unzip::<_, _, Vec<i32>, Vec<i32>>())
        ) {
            if let Ok(counts) = binary_counts(&actual, &predicted) {
                for rate in [
                    counts.recall(),
                    counts.specificity(),
                    counts.precision(),
                    counts.false_positive_rate(),
                    counts.false_negative_rate(),
                    counts.accuracy(),
                    counts.f1(),
                ] {
                    if let Ok(value) = rate {
                        prop_assert!((0.0..=1.0).contains(&value), "rate out of bounds: {}", value);
                    }
                }
            }
        }
    }
}
