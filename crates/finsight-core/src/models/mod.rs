//! Domain models for the FinSight star-schema warehouse.
//!
//! Each submodule owns one family of tables from `crate::schema`: the
//! dimension tables (Company/Concept/TimePeriod/Filing/XBRLDimension),
//! the central fact table plus its relationship tables, the denormalised
//! per-statement materialisations, and the quality/audit tables C7
//! and C8 write.

pub mod company;
pub mod concept;
pub mod fact;
pub mod filing;
pub mod quality;
pub mod relationship;
pub mod source_document;
pub mod statement;
pub mod time_period;
pub mod views;
pub mod xbrl_dimension;

pub use company::{Company, NewCompany};
pub use concept::{BalanceType, Concept, NewConcept, PeriodType, StatementType};
pub use fact::{ExtractionMethod, Fact, NewFact};
pub use filing::{FilingType, Filing, NewFiling};
pub use quality::{DerivedTotalsAudit, NewDerivedTotalsAudit, NewQualityScore, QualityScore, Severity};
pub use relationship::{CalcRel, FootnoteRef, NewCalcRel, NewFootnoteRef, NewPresRel, PresRel, RelationshipSource};
pub use source_document::{NewSourceDocument, SourceDocument};
pub use statement::{
    BalanceSheetSide, FactBalanceSheet, FactCashFlow, FactComprehensiveIncome, FactEquityStatement,
    FactIncomeStatement, NewFactBalanceSheet, NewFactCashFlow, NewFactComprehensiveIncome,
    NewFactEquityStatement, NewFactIncomeStatement, NewStatementItem, StatementItem,
};
pub use time_period::{NewTimePeriod, TimePeriod};
pub use views::{FactDeduplicated, FactHierarchical};
pub use xbrl_dimension::{NewXbrlDimension, XbrlDimension};
