//! Dimension-table upserts: companies, concepts, time periods and
//! XBRL dimension tuples are all "created on first sight, never deleted"
//! — each upsert here is select-then-insert with a unique-
//! constraint tie-break ("concurrency with shared dimensions"), never
//! explicit locking.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use finsight_core::error::{AppError, AppResult};
use finsight_core::models::{Company, Concept, Filing, NewCompany, NewConcept, NewFiling, NewTimePeriod, NewXbrlDimension, TimePeriod, XbrlDimension};
use finsight_core::schema::{dim_companies, dim_concepts, dim_filings, dim_time_periods, dim_xbrl_dimensions};
use finsight_normalize::Normalizer;
use finsight_taxonomy::ConceptMeta;

pub async fn get_or_create_company(conn: &mut AsyncPgConnection, new_company: &NewCompany) -> AppResult<Company> {
    let inserted = diesel::insert_into(dim_companies::table)
        .values(new_company)
        .on_conflict(dim_companies::ticker)
        .do_nothing()
        .get_result::<Company>(conn)
        .await;

    match inserted {
        Ok(company) => Ok(company),
        Err(diesel::result::Error::NotFound) => dim_companies::table
            .filter(dim_companies::ticker.eq(&new_company.ticker))
            .first::<Company>(conn)
            .await
            .map_err(AppError::from),
        Err(e) => Err(AppError::from(e)),
    }
}

/// resolves `concept_name` to its `dim_concepts` row, running
/// the normalizer exactly once at first sight and writing its result
/// into `normalized_label`; subsequent loads reuse the stored label
/// rather than recomputing it ("written into `dim_concepts
/// .normalized_label` during load").
#[allow(clippy::too_many_arguments)]
pub async fn get_or_create_concept(
    conn: &mut AsyncPgConnection,
    normalizer: &Normalizer<'_>,
    concept_name: &str,
    taxonomy: &str,
    meta: Option<&ConceptMeta>,
    is_calc_child: bool,
    is_top_level_total: bool,
) -> AppResult<Concept> {
    if let Some(existing) = dim_concepts::table
        .filter(dim_concepts::concept_name.eq(concept_name))
        .filter(dim_concepts::taxonomy.eq(taxonomy))
        .first::<Concept>(conn)
        .await
        .optional()?
    {
        return Ok(existing);
    }

    let is_abstract = meta.map(|m| m.is_abstract).unwrap_or(false);
    let data_type = meta.map(|m| m.data_type.as_str()).unwrap_or("");
    let normalized_label = normalizer.normalize(concept_name, is_abstract, data_type, is_calc_child, is_top_level_total);

    let new_concept = NewConcept {
        concept_name: concept_name.to_string(),
        taxonomy: taxonomy.to_string(),
        balance_type: meta.and_then(|m| m.balance_type.clone()),
        period_type: meta.map(|m| m.period_type.clone()).unwrap_or_else(|| "duration".to_string()),
        data_type: meta.map(|m| m.data_type.clone()),
        is_abstract,
        statement_type: None,
        normalized_label,
        preferred_label: meta.and_then(|m| m.labels.first().cloned()),
        hierarchy_level: None,
        parent_concept_id: None,
        calculation_weight: if is_calc_child { None } else { None },
    };

    let inserted = diesel::insert_into(dim_concepts::table)
        .values(&new_concept)
        .on_conflict((dim_concepts::concept_name, dim_concepts::taxonomy))
        .do_nothing()
        .get_result::<Concept>(conn)
        .await;

    match inserted {
        Ok(concept) => Ok(concept),
        Err(diesel::result::Error::NotFound) => dim_concepts::table
            .filter(dim_concepts::concept_name.eq(concept_name))
            .filter(dim_concepts::taxonomy.eq(taxonomy))
            .first::<Concept>(conn)
            .await
            .map_err(AppError::from),
        Err(e) => Err(AppError::from(e)),
    }
}

/// "re-loading an existing filing updates facts in place" extends
/// to the filing row itself — unlike the other dimensions, a second
/// sighting overwrites the mutable header fields (date, accession
/// number, source URL) rather than being silently ignored.
pub async fn upsert_filing(conn: &mut AsyncPgConnection, new_filing: &NewFiling) -> AppResult<Filing> {
    diesel::insert_into(dim_filings::table)
        .values(new_filing)
        .on_conflict((dim_filings::company_id, dim_filings::filing_type, dim_filings::fiscal_year_end))
        .do_update()
        .set((
            dim_filings::filing_date.eq(&new_filing.filing_date),
            dim_filings::accession_number.eq(&new_filing.accession_number),
            dim_filings::source_url.eq(&new_filing.source_url),
            dim_filings::updated_at.eq(diesel::dsl::now),
        ))
        .get_result::<Filing>(conn)
        .await
        .map_err(AppError::from)
}

#[derive(Debug, Clone, Copy)]
pub enum PeriodInput {
    Instant(NaiveDate),
    Duration(NaiveDate, NaiveDate),
}

/// "Business key is the full tuple so near-identical periods are
/// reused"; the migration's `NULLS NOT DISTINCT` index makes two instant
/// periods (both missing start/end) collapse into the same row.
pub async fn get_or_create_time_period(conn: &mut AsyncPgConnection, period: PeriodInput) -> AppResult<TimePeriod> {
    let new_period = match period {
        PeriodInput::Instant(date) => NewTimePeriod::instant(date),
        PeriodInput::Duration(start, end) => NewTimePeriod::duration(start, end),
    };

    let inserted = diesel::insert_into(dim_time_periods::table)
        .values(&new_period)
        .on_conflict((
            dim_time_periods::period_type,
            dim_time_periods::instant_date,
            dim_time_periods::start_date,
            dim_time_periods::end_date,
        ))
        .do_nothing()
        .get_result::<TimePeriod>(conn)
        .await;

    match inserted {
        Ok(tp) => Ok(tp),
        Err(diesel::result::Error::NotFound) => {
            let mut query = dim_time_periods::table.into_boxed();
            query = query.filter(dim_time_periods::period_type.eq(&new_period.period_type));
            query = match new_period.instant_date {
                Some(d) => query.filter(dim_time_periods::instant_date.eq(d)),
                None => query.filter(dim_time_periods::instant_date.is_null()),
            };
            query = match new_period.start_date {
                Some(d) => query.filter(dim_time_periods::start_date.eq(d)),
                None => query.filter(dim_time_periods::start_date.is_null()),
            };
            query = match new_period.end_date {
                Some(d) => query.filter(dim_time_periods::end_date.eq(d)),
                None => query.filter(dim_time_periods::end_date.is_null()),
            };
            query.first::<TimePeriod>(conn).await.map_err(AppError::from)
        }
        Err(e) => Err(AppError::from(e)),
    }
}

/// a dimensioned fact's axis/member tuple, stored once and
/// referenced by id. Returns `None` for the empty tuple — callers treat
/// that as the consolidated (undimensioned) fact per the
pub async fn get_or_create_dimension(
    conn: &mut AsyncPgConnection,
    members: &[(String, String)],
) -> AppResult<Option<XbrlDimension>> {
    if members.is_empty() {
        return Ok(None);
    }

    let new_dimension = NewXbrlDimension::from_members(members);

    let inserted = diesel::insert_into(dim_xbrl_dimensions::table)
        .values(&new_dimension)
        .on_conflict(dim_xbrl_dimensions::dimension_hash)
        .do_nothing()
        .get_result::<XbrlDimension>(conn)
        .await;

    match inserted {
        Ok(dim) => Ok(Some(dim)),
        Err(diesel::result::Error::NotFound) => dim_xbrl_dimensions::table
            .filter(dim_xbrl_dimensions::dimension_hash.eq(&new_dimension.dimension_hash))
            .first::<XbrlDimension>(conn)
            .await
            .map(Some)
            .map_err(AppError::from),
        Err(e) => Err(AppError::from(e)),
    }
}
