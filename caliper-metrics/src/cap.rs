//! Cumulative Accuracy Profile (CAP) curves.
//!
//! Builds the classifier, perfect, and random cumulative-positive curves for
//! a ranked binary classification, scales them into the unit square, and
//! converts coordinate arrays between CAP and ROC space.
//!
//! A cumulative curve has `n + 1` points: entry `k` is the number of true
//! positives among the `k` samples ranked most positive, with a leading 0.

use std::str::FromStr;

use caliper_core::{CaliperError, Result, Summarizable};

// ---------------------------------------------------------------------------
// Ordering method
// ---------------------------------------------------------------------------

/// How the classifier outputs used for ranking were produced.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingMethod {
    /// Outputs are hard 0/1 class predictions.
    HardLabel,
    /// Outputs are real-valued scores or probabilities.
    Score,
}

impl FromStr for OrderingMethod {
    type Err = CaliperError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "label" => Ok(Self::HardLabel),
            "score" => Ok(Self::Score),
            other => Err(CaliperError::InvalidMethod(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Curve construction
// ---------------------------------------------------------------------------

/// Cumulative positives under the classifier's ranking.
///
/// Samples are ordered by output descending; equal outputs put positive
/// labels first. The tie-break fixes the curve's value on score plateaus and
/// is part of the output contract, not an implementation detail.
///
/// # Errors
///
/// Returns an error if the slices are empty or have different lengths, or if
/// `method` is [`OrderingMethod::HardLabel`] and an output is neither 0 nor 1.
pub fn classifier_cumulative(
    outputs: &[f64],
    labels: &[bool],
    method: OrderingMethod,
) -> Result<Vec<f64>> {
    validate_ranked(outputs, labels)?;
    if method == OrderingMethod::HardLabel {
        if let Some(bad) = outputs.iter().find(|v| **v != 0.0 && **v != 1.0) {
            return Err(CaliperError::InvalidInput(format!(
                "hard-label ordering expects 0/1 outputs, got {bad}"
            )));
        }
    }

    let mut order: Vec<usize> = (0..outputs.len()).collect();
    order.sort_by(|&i, &j| {
        outputs[j]
            .total_cmp(&outputs[i])
            .then_with(|| labels[j].cmp(&labels[i]))
    });

    Ok(running_positive_total(order.iter().map(|&i| labels[i])))
}

/// Cumulative positives under the best possible ranking (all positives
/// first): entry `k` is `min(k, positives)`.
pub fn perfect_cumulative(labels: &[bool]) -> Result<Vec<f64>> {
    if labels.is_empty() {
        return Err(CaliperError::InvalidInput("empty label vector".into()));
    }
    let positives = labels.iter().filter(|&&l| l).count();
    Ok((0..=labels.len()).map(|k| k.min(positives) as f64).collect())
}

/// Expected cumulative positives of an uninformative ranking: the straight
/// line from (0, 0) to (n, positives), sampled at every integer `k`.
pub fn random_cumulative(labels: &[bool]) -> Result<Vec<f64>> {
    if labels.is_empty() {
        return Err(CaliperError::InvalidInput("empty label vector".into()));
    }
    let n = labels.len() as f64;
    let positives = labels.iter().filter(|&&l| l).count() as f64;
    Ok((0..=labels.len()).map(|k| k as f64 * positives / n).collect())
}

/// All three CAP curves for one ranked classification.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CapCurves {
    /// Cumulative positives under the classifier's ranking.
    pub classifier: Vec<f64>,
    /// Cumulative positives under the best possible ranking.
    pub perfect: Vec<f64>,
    /// Expected cumulative positives of an uninformative ranking.
    pub random: Vec<f64>,
    /// Total number of positive samples.
    pub positives: usize,
}

/// Build the classifier, perfect, and random curves in one call.
///
/// # Errors
///
/// Same conditions as [`classifier_cumulative`].
pub fn cap_curves(outputs: &[f64], labels: &[bool], method: OrderingMethod) -> Result<CapCurves> {
    let classifier = classifier_cumulative(outputs, labels, method)?;
    let perfect = perfect_cumulative(labels)?;
    let random = random_cumulative(labels)?;
    let positives = labels.iter().filter(|&&l| l).count();
    Ok(CapCurves {
        classifier,
        perfect,
        random,
        positives,
    })
}

impl CapCurves {
    /// Number of samples (each curve has `samples() + 1` points).
    pub fn samples(&self) -> usize {
        self.classifier.len() - 1
    }

    /// All three curves scaled into the unit square.
    ///
    /// # Errors
    ///
    /// Returns [`CaliperError::NoPositiveSamples`] when there is nothing to
    /// divide the positive axis by.
    pub fn normalized(&self) -> Result<NormalizedCapCurves> {
        if self.positives == 0 {
            return Err(CaliperError::NoPositiveSamples);
        }
        Ok(NormalizedCapCurves {
            classifier: normalize_curve(&self.classifier)?,
            perfect: normalize_curve(&self.perfect)?,
            random: normalize_curve(&self.random)?,
        })
    }

    /// Accuracy ratio: trapezoidal area between the classifier and random
    /// curves over the area between the perfect and random curves. 1 for a
    /// perfect ranking, 0 for an uninformative one.
    ///
    /// # Errors
    ///
    /// [`CaliperError::NoPositiveSamples`] with zero positives, and
    /// [`CaliperError::InvalidInput`] when every sample is positive (the
    /// perfect and random curves coincide, so the ratio is 0/0).
    pub fn accuracy_ratio(&self) -> Result<f64> {
        if self.positives == 0 {
            return Err(CaliperError::NoPositiveSamples);
        }
        let classifier = unit_trapezoid_area(&self.classifier);
        let perfect = unit_trapezoid_area(&self.perfect);
        let random = unit_trapezoid_area(&self.random);
        if perfect == random {
            return Err(CaliperError::InvalidInput(
                "accuracy ratio undefined: every sample is positive".into(),
            ));
        }
        Ok((classifier - random) / (perfect - random))
    }
}

impl Summarizable for CapCurves {
    fn summary(&self) -> String {
        format!(
            "CapCurves: n={}, positives={}",
            self.samples(),
            self.positives,
        )
    }
}

/// Unit-square version of [`CapCurves`], as explicit (x, y) points.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCapCurves {
    /// Classifier curve in the unit square.
    pub classifier: Vec<[f64; 2]>,
    /// Perfect curve in the unit square.
    pub perfect: Vec<[f64; 2]>,
    /// Random baseline in the unit square (the diagonal).
    pub random: Vec<[f64; 2]>,
}

/// Scale one cumulative curve into the unit square: point `k` becomes
/// `(k / n, curve[k] / positives)`, where the positive count is the curve's
/// final value.
///
/// # Errors
///
/// [`CaliperError::NoPositiveSamples`] when the curve tops out at 0, and
/// [`CaliperError::InvalidInput`] for a curve with fewer than 2 points.
pub fn normalize_curve(curve: &[f64]) -> Result<Vec<[f64; 2]>> {
    if curve.len() < 2 {
        return Err(CaliperError::InvalidInput(
            "cumulative curve needs at least 2 points".into(),
        ));
    }
    let positives = curve[curve.len() - 1];
    if positives == 0.0 {
        return Err(CaliperError::NoPositiveSamples);
    }
    let n = (curve.len() - 1) as f64;
    Ok(curve
        .iter()
        .enumerate()
        .map(|(k, &y)| [k as f64 / n, y / positives])
        .collect())
}

// ---------------------------------------------------------------------------
// CAP ↔ ROC coordinates
// ---------------------------------------------------------------------------

/// CAP→ROC change of basis: (x, y) ↦ (x − y, y).
const CAP_TO_ROC: [[f64; 2]; 2] = [[1.0, -1.0], [0.0, 1.0]];

/// ROC→CAP change of basis: (x, y) ↦ (x + y, y).
const ROC_TO_CAP: [[f64; 2]; 2] = [[1.0, 1.0], [0.0, 1.0]];

/// Map CAP coordinates (classified-positive count, true-positive count) to
/// ROC coordinates (false-positive count, true-positive count).
///
/// Inverse of [`roc_to_cap`]; the round trip is exact on count-valued
/// (integer) coordinates.
pub fn cap_to_roc(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    apply_linear_map(&CAP_TO_ROC, points)
}

/// Map ROC coordinates back to CAP coordinates. Inverse of [`cap_to_roc`].
pub fn roc_to_cap(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    apply_linear_map(&ROC_TO_CAP, points)
}

/// Pair a cumulative curve with its implicit x axis: point `k` is
/// `(k, curve[k])`, ready for [`cap_to_roc`].
pub fn curve_points(curve: &[f64]) -> Vec<[f64; 2]> {
    curve
        .iter()
        .enumerate()
        .map(|(k, &y)| [k as f64, y])
        .collect()
}

fn apply_linear_map(m: &[[f64; 2]; 2], points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    points
        .iter()
        .map(|p| {
            [
                m[0][0] * p[0] + m[0][1] * p[1],
                m[1][0] * p[0] + m[1][1] * p[1],
            ]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_ranked(outputs: &[f64], labels: &[bool]) -> Result<()> {
    if outputs.len() != labels.len() {
        return Err(CaliperError::LengthMismatch {
            left: outputs.len(),
            right: labels.len(),
        });
    }
    if outputs.is_empty() {
        return Err(CaliperError::InvalidInput("empty input".into()));
    }
    Ok(())
}

/// Prefix sums of a label sequence with a leading 0; length n+1.
fn running_positive_total<I: Iterator<Item = bool>>(labels: I) -> Vec<f64> {
    let mut curve = Vec::with_capacity(labels.size_hint().0 + 1);
    curve.push(0.0);
    let mut seen = 0u64;
    for label in labels {
        seen += label as u64;
        curve.push(seen as f64);
    }
    curve
}

/// Trapezoidal area under a curve sampled at unit x spacing.
fn unit_trapezoid_area(y: &[f64]) -> f64 {
    let mut area = 0.0;
    for i in 1..y.len() {
        area += (y[i] + y[i - 1]) / 2.0;
    }
    area
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
