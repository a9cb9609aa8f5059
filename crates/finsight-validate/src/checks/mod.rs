//! The check suite, one module per check family. Every function
//! here is a pure function over already-resolved data — no database
//! access — so each is independently unit-testable; [`crate::runner`]
//! is what resolves a live warehouse into the shapes these expect.

pub mod completeness;
pub mod duplicates;
pub mod identity;
pub mod normalization_conflicts;
pub mod unit_consistency;

pub use completeness::{metric_coverage, missing_data_matrix, universal_metrics_completeness, CompanyMetricPresence, MANDATORY_UNIVERSAL_METRICS};
pub use duplicates::{user_facing_duplicates, LabeledFact};
pub use normalization_conflicts::{normalization_conflicts, ConceptLabel};
