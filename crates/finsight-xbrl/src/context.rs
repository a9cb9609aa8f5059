//! XBRL context resolution: entity, period and explicit-dimension
//! members attached to a `<context>` element ("context (entity,
//! period, any explicit/typed dimensions)").

use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct XbrlPeriod {
    pub instant: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl XbrlPeriod {
    pub fn is_duration(&self) -> bool {
        self.start_date.is_some() && self.end_date.is_some()
    }
}

/// One explicit-dimension member, e.g. `(us-gaap:StatementBusinessSegmentsAxis,
/// us-gaap:ConsumerProductsMember)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionMember {
    pub axis: String,
    pub member: String,
}

#[derive(Debug, Clone)]
pub struct XbrlContext {
    pub id: String,
    pub entity_identifier: String,
    pub period: XbrlPeriod,
    pub dimensions: Vec<DimensionMember>,
}

#[derive(Debug, Clone)]
pub struct XbrlUnit {
    pub id: String,
    pub measure: String,
}
