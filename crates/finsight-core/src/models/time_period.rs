use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::dim_time_periods;

/// Either an instant (point date) or a duration (start, end).
///
/// Business key is the full tuple, so near-identical periods are reused
/// across filings rather than duplicated.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = dim_time_periods)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TimePeriod {
    pub id: Uuid,
    pub period_type: String,
    pub instant_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub fiscal_year: i32,
    pub fiscal_quarter: Option<i32>,
    pub period_label: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = dim_time_periods)]
pub struct NewTimePeriod {
    pub period_type: String,
    pub instant_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub fiscal_year: i32,
    pub fiscal_quarter: Option<i32>,
    pub period_label: Option<String>,
}

impl NewTimePeriod {
    /// fiscal year mapping rule: a period ending in Jan-Mar belongs
    /// to the *previous* fiscal year (the Dec-31-fiscal-year-end filers'
    /// Q4/FY report usually posts in Jan-Mar of the following calendar
    /// year; LLY's FY2023 ending 2024-01-03 is the canonical example,
    /// scenario 6).
    pub fn fiscal_year_for(end_date: NaiveDate) -> i32 {
        use chrono::Datelike;
        if end_date.month() <= 3 {
            end_date.year() - 1
        } else {
            end_date.year()
        }
    }

    pub fn instant(date: NaiveDate) -> Self {
        let fiscal_year = Self::fiscal_year_for(date);
        Self {
            period_type: "instant".to_string(),
            instant_date: Some(date),
            start_date: None,
            end_date: None,
            fiscal_year,
            fiscal_quarter: None,
            period_label: None,
        }
    }

    pub fn duration(start: NaiveDate, end: NaiveDate) -> Self {
        let fiscal_year = Self::fiscal_year_for(end);
        Self {
            period_type: "duration".to_string(),
            instant_date: None,
            start_date: Some(start),
            end_date: Some(end),
            fiscal_year,
            fiscal_quarter: None,
            period_label: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fiscal_year_rolls_back_for_jan_mar_period_ends() {
        // scenario 6: LLY FY2023 ends 2024-01-03, not FY2024.
        let end = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(NewTimePeriod::fiscal_year_for(end), 2023);
    }

    #[test]
    fn fiscal_year_matches_calendar_year_outside_q1() {
        let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(NewTimePeriod::fiscal_year_for(end), 2023);
    }

    #[test]
    fn fiscal_year_boundary_is_inclusive_of_march() {
        let end = NaiveDate::from_ymd_opt(2023, 3, 31).unwrap();
        assert_eq!(NewTimePeriod::fiscal_year_for(end), 2022);
        let end = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();
        assert_eq!(NewTimePeriod::fiscal_year_for(end), 2023);
    }
}
