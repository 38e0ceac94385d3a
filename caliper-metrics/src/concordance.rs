//! Rank concordance: Kendall's Tau-a, Somers' D, and the Gini coefficient.
//!
//! Tau-a is the mean sign-concordance over all n(n−1)/2 distinct index
//! pairs. Two interchangeable strategies compute the same integer pair sum:
//! a lazy O(n²) pairwise enumeration (the defining formula, kept as the
//! reference oracle) and an O(n log n) merge-sort inversion count.
//! [`TauAlgorithm::for_len`] reports which one the default entry points pick,
//! so callers processing large inputs can see — and override — the choice.

use caliper_core::{CaliperError, Result};

// ---------------------------------------------------------------------------
// Pair enumeration
// ---------------------------------------------------------------------------

/// Lazy enumeration of the distinct unordered index pairs `(i, j)`, `i < j`,
/// of a length-`n` sequence, in lexicographic order.
///
/// The pair set is never materialized; iteration state is two counters, so
/// memory stays O(1) no matter how large `n` gets.
#[derive(Debug, Clone)]
pub struct IndexPairs {
    n: usize,
    i: usize,
    j: usize,
}

impl IndexPairs {
    /// Pairs over indices `0..n`.
    pub fn new(n: usize) -> Self {
        Self { n, i: 0, j: 1 }
    }
}

impl Iterator for IndexPairs {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        if self.i + 1 >= self.n {
            return None;
        }
        let pair = (self.i, self.j);
        self.j += 1;
        if self.j == self.n {
            self.i += 1;
            self.j = self.i + 1;
        }
        Some(pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.i + 1 >= self.n {
            0
        } else {
            let tail = self.n - self.i;
            tail * (tail - 1) / 2 - (self.j - self.i - 1)
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for IndexPairs {}

// ---------------------------------------------------------------------------
// Tau-a
// ---------------------------------------------------------------------------

/// Strategy for computing the Tau-a pair sum.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TauAlgorithm {
    /// Direct enumeration of all index pairs: O(n²) time, O(1) extra space.
    /// The defining formula and the test oracle for `MergeSort`.
    Pairwise,
    /// Merge-sort inversion counting: O(n log n) time, O(n) extra space.
    MergeSort,
}

/// Above this length the default entry points switch to `MergeSort`.
const PAIRWISE_CUTOFF: usize = 256;

impl TauAlgorithm {
    /// The strategy [`kendalls_tau_a`] uses for inputs of length `n`.
    pub fn for_len(n: usize) -> Self {
        if n > PAIRWISE_CUTOFF {
            Self::MergeSort
        } else {
            Self::Pairwise
        }
    }
}

/// Kendall's Tau-a between two equal-length sequences: the mean over all
/// distinct index pairs of `sign(a[j] − a[i]) · sign(b[j] − b[i])`.
///
/// 0.0 by convention when `n ≤ 1` (no pairs to average). The strategy is
/// chosen by [`TauAlgorithm::for_len`]; both strategies produce identical
/// results bit for bit. Inputs must not contain NaN.
///
/// # Errors
///
/// Returns [`CaliperError::LengthMismatch`] if the sequences differ in
/// length.
pub fn kendalls_tau_a(a: &[f64], b: &[f64]) -> Result<f64> {
    kendalls_tau_a_with(a, b, TauAlgorithm::for_len(a.len()))
}

/// Kendall's Tau-a with an explicit strategy choice.
pub fn kendalls_tau_a_with(a: &[f64], b: &[f64], algorithm: TauAlgorithm) -> Result<f64> {
    if a.len() != b.len() {
        return Err(CaliperError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let pairs = pair_count(a.len());
    if pairs == 0 {
        return Ok(0.0);
    }
    let numerator = match algorithm {
        TauAlgorithm::Pairwise => pair_sum_pairwise(a, b),
        TauAlgorithm::MergeSort => pair_sum_mergesort(a, b),
    };
    Ok(numerator as f64 / pairs as f64)
}

/// Somers' D: `tau(a, b) / tau(b, b)`.
///
/// The denominator is the self-concordance of `b` — the fraction of pairs
/// with unequal `b` values (for binary labels with positive rate p this is
/// `2·p·(1−p)·n/(n−1)`), so a constant `b` or `n ≤ 1` leaves the ratio
/// undefined.
///
/// # Errors
///
/// [`CaliperError::LengthMismatch`] on unequal lengths, and
/// [`CaliperError::UndefinedConcordance`] when `tau(b, b)` is 0.
pub fn somers_d(a: &[f64], b: &[f64]) -> Result<f64> {
    somers_d_with(a, b, TauAlgorithm::for_len(a.len()))
}

/// Somers' D with an explicit Tau-a strategy.
pub fn somers_d_with(a: &[f64], b: &[f64], algorithm: TauAlgorithm) -> Result<f64> {
    let tau_ab = kendalls_tau_a_with(a, b, algorithm)?;
    let tau_bb = kendalls_tau_a_with(b, b, algorithm)?;
    if tau_bb == 0.0 {
        return Err(CaliperError::UndefinedConcordance(
            "reference sequence has no unequal pairs".into(),
        ));
    }
    Ok(tau_ab / tau_bb)
}

/// Gini coefficient of a ranking: Somers' D between prediction outputs and
/// binary labels. 1 is a perfectly concordant ranking, 0 no better than
/// random, negative a systematically inverted one.
///
/// # Errors
///
/// Same conditions as [`somers_d`]; all-identical labels are
/// [`CaliperError::UndefinedConcordance`].
pub fn gini_coefficient(predictions: &[f64], labels: &[f64]) -> Result<f64> {
    somers_d(predictions, labels)
}

// ---------------------------------------------------------------------------
// Pair-sum strategies
// ---------------------------------------------------------------------------

/// Concordant-minus-discordant pair sum by direct enumeration.
fn pair_sum_pairwise(a: &[f64], b: &[f64]) -> i64 {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..a.len().saturating_sub(1))
            .into_par_iter()
            .map(|i| {
                let mut sum = 0i64;
                for j in (i + 1)..a.len() {
                    sum += sign(a[j] - a[i]) * sign(b[j] - b[i]);
                }
                sum
            })
            .sum()
    }
    #[cfg(not(feature = "parallel"))]
    {
        IndexPairs::new(a.len())
            .map(|(i, j)| sign(a[j] - a[i]) * sign(b[j] - b[i]))
            .sum()
    }
}

/// Concordant-minus-discordant pair sum via merge-sort inversion counting.
///
/// With n0 total pairs, n1 pairs tied in `a`, n2 pairs tied in `b`, n3 pairs
/// tied in both, and D discordant pairs, the sum is
/// `n0 − n1 − n2 + n3 − 2·D`. Sorting by `(a, b)` and counting strict
/// inversions of the reordered `b` yields exactly D: pairs tied in `a` are
/// pre-sorted by `b`, and pairs tied only in `b` never strictly invert.
fn pair_sum_mergesort(a: &[f64], b: &[f64]) -> i64 {
    let n = a.len();
    // total_cmp distinguishes -0.0 from 0.0; the sign-product definition
    // does not, so zeros are canonicalized before sorting.
    let a = canonical_zeros(a);
    let b = canonical_zeros(b);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[i].total_cmp(&a[j]).then_with(|| b[i].total_cmp(&b[j])));

    let tied_a = tie_pair_count(&order, |&i, &j| a[i].total_cmp(&a[j]).is_eq());
    let tied_both = tie_pair_count(&order, |&i, &j| {
        a[i].total_cmp(&a[j]).is_eq() && b[i].total_cmp(&b[j]).is_eq()
    });

    let mut b_by_a: Vec<f64> = order.iter().map(|&i| b[i]).collect();
    let mut scratch = vec![0.0; n];
    let discordant = count_inversions(&mut b_by_a, &mut scratch);

    let mut b_sorted = b.to_vec();
    b_sorted.sort_by(f64::total_cmp);
    let tied_b = tie_pair_count(&b_sorted, |x, y| x.total_cmp(y).is_eq());

    pair_count(n) as i64 - tied_a as i64 - tied_b as i64 + tied_both as i64
        - 2 * discordant as i64
}

/// Number of distinct unordered pairs of `n` items: n(n−1)/2.
fn pair_count(n: usize) -> u64 {
    if n < 2 {
        return 0;
    }
    (n as u64) * (n as u64 - 1) / 2
}

#[inline]
fn sign(d: f64) -> i64 {
    if d > 0.0 {
        1
    } else if d < 0.0 {
        -1
    } else {
        0
    }
}

/// Pairs inside equal runs of a sorted sequence: Σ t(t−1)/2 per run.
fn tie_pair_count<T>(sorted: &[T], eq: impl Fn(&T, &T) -> bool) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let mut pairs = 0u64;
    let mut run = 1u64;
    for w in sorted.windows(2) {
        if eq(&w[0], &w[1]) {
            run += 1;
        } else {
            pairs += run * (run - 1) / 2;
            run = 1;
        }
    }
    pairs + run * (run - 1) / 2
}

fn canonical_zeros(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&x| if x == 0.0 { 0.0 } else { x })
        .collect()
}

/// Strict inversions (left value > right value) counted during a merge sort.
fn count_inversions(values: &mut [f64], scratch: &mut [f64]) -> u64 {
    let n = values.len();
    if n < 2 {
        return 0;
    }
    let mid = n / 2;
    let mut inversions = {
        let (left, right) = values.split_at_mut(mid);
        let (left_scratch, right_scratch) = scratch.split_at_mut(mid);
        count_inversions(left, left_scratch) + count_inversions(right, right_scratch)
    };

    {
        let (left, right) = values.split_at(mid);
        let (mut i, mut j, mut k) = (0, 0, 0);
        while i < left.len() && j < right.len() {
            if left[i].total_cmp(&right[j]).is_gt() {
                // Everything still unmerged on the left exceeds right[j].
                inversions += (left.len() - i) as u64;
                scratch[k] = right[j];
                j += 1;
            } else {
                scratch[k] = left[i];
                i += 1;
            }
            k += 1;
        }
        scratch[k..k + left.len() - i].copy_from_slice(&left[i..]);
        let k = k + left.len() - i;
        scratch[k..k + right.len() - j].copy_from_slice(&right[j..]);
    }
    values.copy_from_slice(&scratch[..n]);
    inversions
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn tau_both_ways(a: &[f64], b: &[f64]) -> (f64, f64) {
        (
            kendalls_tau_a_with(a, b, TauAlgorithm::Pairwise).unwrap(),
            kendalls_tau_a_with(a, b, TauAlgorithm::MergeSort).unwrap(),
        )
    }

    // ── IndexPairs ──────────────────────────────────────────────

    #[test]
    fn index_pairs_lexicographic() {
        let pairs: Vec<_> = IndexPairs::new(4).collect();
        assert_eq!(
            pairs,
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
    }

    #[test]
    fn index_pairs_exact_size() {
        let mut pairs = IndexPairs::new(5);
        assert_eq!(pairs.len(), 10);
        pairs.next();
        pairs.next();
        pairs.next();
        assert_eq!(pairs.len(), 7);
        assert_eq!(pairs.by_ref().count(), 7);
        assert_eq!(pairs.len(), 0);
    }

    #[test]
    fn index_pairs_degenerate() {
        assert_eq!(IndexPairs::new(0).count(), 0);
        assert_eq!(IndexPairs::new(1).count(), 0);
        assert_eq!(IndexPairs::new(2).collect::<Vec<_>>(), vec![(0, 1)]);
    }

    // ── Tau-a ───────────────────────────────────────────────────

    #[test]
    fn tau_injective_self_is_one() {
        let a = [3.0, 1.0, 4.0, 1.5, 9.0];
        let (pw, ms) = tau_both_ways(&a, &a);
        assert!((pw - 1.0).abs() < TOL);
        assert!((ms - 1.0).abs() < TOL);
    }

    #[test]
    fn tau_self_with_ties_below_one() {
        // Pairs: (0,1) tied → 0, (0,2) and (1,2) concordant → 2/3.
        let b = [1.0, 1.0, 2.0];
        let (pw, ms) = tau_both_ways(&b, &b);
        assert!((pw - 2.0 / 3.0).abs() < TOL);
        assert_eq!(pw, ms);
    }

    #[test]
    fn tau_reversed_is_minus_one() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let rev = [4.0, 3.0, 2.0, 1.0];
        let (pw, ms) = tau_both_ways(&a, &rev);
        assert!((pw + 1.0).abs() < TOL);
        assert!((ms + 1.0).abs() < TOL);
    }

    #[test]
    fn tau_symmetry() {
        let a = [0.3, 0.9, 0.9, 0.1, 0.5];
        let b = [1.0, 0.0, 1.0, 0.0, 1.0];
        assert_eq!(
            kendalls_tau_a(&a, &b).unwrap(),
            kendalls_tau_a(&b, &a).unwrap()
        );
    }

    #[test]
    fn tau_no_pairs_is_zero() {
        assert_eq!(kendalls_tau_a(&[], &[]).unwrap(), 0.0);
        assert_eq!(kendalls_tau_a(&[1.0], &[2.0]).unwrap(), 0.0);
    }

    #[test]
    fn tau_length_mismatch() {
        assert!(matches!(
            kendalls_tau_a(&[1.0, 2.0], &[1.0]),
            Err(CaliperError::LengthMismatch { left: 2, right: 1 })
        ));
    }

    #[test]
    fn strategies_agree_under_heavy_ties() {
        let a = [3.0, 1.0, 2.0, 2.0, 5.0, 0.0, 1.0, 2.0];
        let b = [1.0, 1.0, 4.0, 2.0, 2.0, 0.0, 3.0, 1.0];
        let (pw, ms) = tau_both_ways(&a, &b);
        assert_eq!(pw, ms);
        let (pw, ms) = tau_both_ways(&b, &a);
        assert_eq!(pw, ms);
    }

    #[test]
    fn strategy_selection_by_length() {
        assert_eq!(TauAlgorithm::for_len(10), TauAlgorithm::Pairwise);
        assert_eq!(TauAlgorithm::for_len(256), TauAlgorithm::Pairwise);
        assert_eq!(TauAlgorithm::for_len(257), TauAlgorithm::MergeSort);
    }

    // ── Somers' D and Gini ──────────────────────────────────────

    #[test]
    fn somers_d_three_pair_enumeration() {
        // tau(a,b): pairs (0,1)→0, (0,2)→+1, (1,2)→+1 ⇒ 2/3.
        // tau(b,b): one tied pair of three ⇒ 2/3. Ratio 1.
        let a = [1.0, 2.0, 3.0];
        let b = [0.0, 0.0, 1.0];
        let d = somers_d_with(&a, &b, TauAlgorithm::Pairwise).unwrap();
        assert!((d - 1.0).abs() < TOL);
        assert_eq!(d, gini_coefficient(&a, &b).unwrap());
    }

    #[test]
    fn gini_inverted_ranking() {
        let predictions = [0.1, 0.2, 0.9];
        let labels = [1.0, 1.0, 0.0];
        assert!((gini_coefficient(&predictions, &labels).unwrap() + 1.0).abs() < TOL);
    }

    #[test]
    fn gini_uninformative_ranking_is_zero() {
        // Constant predictions: every sign product is 0.
        let predictions = [0.5, 0.5, 0.5, 0.5];
        let labels = [1.0, 0.0, 1.0, 0.0];
        assert_eq!(gini_coefficient(&predictions, &labels).unwrap(), 0.0);
    }

    #[test]
    fn somers_d_binary_denominator() {
        // Binary labels, p = 2/5: 6 unequal pairs of 10, and indeed
        // 2·p·(1−p)·n/(n−1) = 3/5.
        let b = [1.0, 0.0, 1.0, 0.0, 0.0];
        assert!((kendalls_tau_a(&b, &b).unwrap() - 0.6).abs() < TOL);
    }

    #[test]
    fn somers_d_degenerate_reference() {
        let a = [1.0, 2.0, 3.0];
        assert!(matches!(
            somers_d(&a, &[7.0, 7.0, 7.0]),
            Err(CaliperError::UndefinedConcordance(_))
        ));
        assert!(matches!(
            somers_d(&[1.0], &[1.0]),
            Err(CaliperError::UndefinedConcordance(_))
        ));
    }

    #[test]
    fn somers_d_is_asymmetric() {
        // Swapping the roles changes the denominator, not the numerator.
        let a = [0.2, 0.4, 0.6, 0.8];
        let b = [0.0, 0.0, 1.0, 1.0];
        let d_ab = somers_d(&a, &b).unwrap();
        let d_ba = somers_d(&b, &a).unwrap();
        assert!((d_ab - 1.0).abs() < TOL);
        assert!((d_ba - 2.0 / 3.0).abs() < TOL);
    }
}
