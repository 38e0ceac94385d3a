//! Binary-classifier evaluation metrics.
//!
//! Three independent module families, each a set of pure functions over
//! paired prediction/label sequences:
//!
//! - [`confusion`] — cross-tabulation of actual vs. predicted labels and the
//!   confusion-derived rates (recall, specificity, precision, ...)
//! - [`cap`] — Cumulative Accuracy Profile curves and the CAP↔ROC change of
//!   coordinates
//! - [`concordance`] — Kendall's Tau-a, Somers' D, and the Gini coefficient
//!
//! No module depends on another's output; callers feed each one the
//! `(outputs, labels)` pair produced by an external classifier.

pub mod cap;
pub mod concordance;
pub mod confusion;

pub use cap::{cap_curves, CapCurves, OrderingMethod};
pub use concordance::{gini_coefficient, kendalls_tau_a, somers_d, TauAlgorithm};
pub use confusion::{BinaryCounts, ConfusionTable};
