// Copyright (c) 2024 EconGraph. All rights reserved.
// Licensed under the Microsoft Reference Source License (MS-RSL).
// See LICENSE file for complete terms and conditions.

//! C6/C7 materialization: reduces a filing's presentation
//! tree into its primary statements, attributes balance-sheet side and
//! sign-correction, then derives any universal-metric totals the filer
//! left implicit in its calculation linkbase.

pub mod balance_sheet_side;
pub mod classify;
pub mod derived_totals;
pub mod display_order;
pub mod error;
pub mod preferred_label;
pub mod presentation_tree;
pub mod sign_correction;
pub mod statement_materializer;

pub use derived_totals::{derive_totals, run_derived_totals, CalcEdge, DerivedTotal};
pub use error::{MaterializeError, MaterializeResult};
pub use statement_materializer::materialize_statements;
