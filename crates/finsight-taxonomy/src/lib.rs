// Copyright (c) 2024 EconGraph. All rights reserved.
// Licensed under the Microsoft Reference Source License (MS-RSL).
// See LICENSE file for complete terms and conditions.

//! C2 Taxonomy cache: download/parse/persist US-GAAP/IFRS taxonomy
//! packages into concept/calculation/presentation/reference indexes, and
//! derive the semantic equivalence and label fallback groups the
//! normalizer (C4) consults.

pub mod cache;
pub mod equivalence;
pub mod error;
pub mod parse;
pub mod types;

pub use cache::TaxonomyCache;
pub use equivalence::EquivalenceGroups;
pub use error::{TaxonomyError, TaxonomyResult};
pub use types::{CalcArc, ConceptMeta, PresentationNode, ReferenceTuple, TaxonomyIndex};
