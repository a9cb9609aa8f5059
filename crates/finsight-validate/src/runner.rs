//! Resolves a live warehouse into the shapes the pure check functions in
//! [`crate::checks`] expect, and assembles their results into the
//! [`crate::validate`] report. This is the one place in the crate that
//! touches the database; every check itself stays a pure function so it
//! can be unit-tested without Postgres.

use std::collections::{HashMap, HashSet};

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use finsight_core::database::DatabasePool;
use finsight_core::error::AppResult;
use finsight_core::schema::{calc_rel, dim_companies, dim_concepts, dim_filings, dim_time_periods, fact_generic};

use crate::checks::{
    completeness::{metric_coverage, missing_data_matrix, universal_metrics_completeness, CompanyMetricPresence},
    duplicates::{user_facing_duplicates, LabeledFact},
    identity,
    normalization_conflicts::{normalization_conflicts, ConceptLabel},
    unit_consistency::{is_bank, unit_consistency},
};
use crate::report::{CheckResult, FilingReport, ValidationReport};

/// `normalized_label -> value_numeric` for every consolidated
/// (`dimension_id IS NULL`) fact in one filing, which is what every
/// identity check in operates over.
async fn resolve_filing_metrics(pool: &DatabasePool, filing_id: Uuid) -> AppResult<HashMap<String, f64>> {
    let mut conn = pool.get().await?;

    let rows: Vec<(String, Option<f64>)> = fact_generic::table
        .inner_join(dim_concepts::table.on(dim_concepts::id.eq(fact_generic::concept_id)))
        .filter(fact_generic::filing_id.eq(filing_id))
        .filter(fact_generic::dimension_id.is_null())
        .select((dim_concepts::normalized_label, fact_generic::value_numeric))
        .load(&mut conn)
        .await?;

    let mut metrics = HashMap::new();
    for (label, value) in rows {
        if let Some(v) = value {
            metrics.insert(label, v);
        }
    }
    Ok(metrics)
}

/// Raw `(concept_name, |value|)` pairs for one filing's consolidated
/// facts, for the unit-consistency range check and bank classification.
async fn resolve_filing_raw_values(pool: &DatabasePool, filing_id: Uuid) -> AppResult<Vec<(String, f64)>> {
    let mut conn = pool.get().await?;

    let rows: Vec<(String, Option<f64>)> = fact_generic::table
        .inner_join(dim_concepts::table.on(dim_concepts::id.eq(fact_generic::concept_id)))
        .filter(fact_generic::filing_id.eq(filing_id))
        .filter(fact_generic::dimension_id.is_null())
        .select((dim_concepts::concept_name, fact_generic::value_numeric))
        .load(&mut conn)
        .await?;

    Ok(rows.into_iter().filter_map(|(name, value)| value.map(|v| (name, v.abs()))).collect())
}

/// `(parent_value, weighted_children_sum, confidence)` triples for
/// every `calc_rel` parent that has an explicit consolidated value in
/// this filing and at least one child with a value in the same period.
/// `confidence` is the lowest confidence among the contributing
/// children, so a relationship set is only audited at full severity
/// when every edge that fed the sum meets the threshold.
async fn resolve_calc_audit_inputs(pool: &DatabasePool, filing_id: Uuid) -> AppResult<Vec<(f64, f64, f64)>> {
    let mut conn = pool.get().await?;

    let edges: Vec<(Uuid, Uuid, f64, f64)> = calc_rel::table
        .filter(calc_rel::filing_id.eq(filing_id))
        .select((calc_rel::parent_concept_id, calc_rel::child_concept_id, calc_rel::weight, calc_rel::confidence))
        .load(&mut conn)
        .await?;

    let facts: HashMap<(Uuid, Uuid), f64> = fact_generic::table
        .filter(fact_generic::filing_id.eq(filing_id))
        .filter(fact_generic::dimension_id.is_null())
        .filter(fact_generic::value_numeric.is_not_null())
        .select((fact_generic::concept_id, fact_generic::period_id, fact_generic::value_numeric))
        .load::<(Uuid, Uuid, Option<f64>)>(&mut conn)
        .await?
        .into_iter()
        .filter_map(|(concept_id, period_id, value)| value.map(|v| ((concept_id, period_id), v)))
        .collect();

    let mut children_by_parent: HashMap<Uuid, Vec<(Uuid, f64, f64)>> = HashMap::new();
    for (parent_concept_id, child_concept_id, weight, confidence) in edges {
        children_by_parent.entry(parent_concept_id).or_default().push((child_concept_id, weight, confidence));
    }

    let mut periods_by_concept: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
    for (concept_id, period_id) in facts.keys() {
        periods_by_concept.entry(*concept_id).or_default().insert(*period_id);
    }

    let mut results = Vec::new();
    for (parent_id, children) in &children_by_parent {
        let Some(parent_periods) = periods_by_concept.get(parent_id) else { continue };
        for &period_id in parent_periods {
            let Some(&parent_value) = facts.get(&(*parent_id, period_id)) else { continue };

            let mut sum = 0.0;
            let mut min_confidence = f64::MAX;
            let mut any_component = false;
            for &(child_id, weight, confidence) in children {
                if let Some(&value) = facts.get(&(child_id, period_id)) {
                    sum += weight * value;
                    min_confidence = min_confidence.min(confidence);
                    any_component = true;
                }
            }
            if !any_component {
                continue;
            }
            results.push((parent_value, sum, min_confidence));
        }
    }

    Ok(results)
}

/// Runs every per-filing identity and range check for one filing
/// and assembles its [`FilingReport`]. Retained-earnings rollforward is
/// skipped when the filing has no `retained_earnings_accumulated_deficit`
/// facts at all — it is the one check that needs more than the generic
/// metrics map (beginning/ending balances across two periods), which the
/// caller (finsight-pipeline, which already walked the filing's periods
/// at load time) is better placed to resolve and pass in via
/// [`retained_earnings_check`].
pub async fn run_filing_checks(pool: &DatabasePool, filing_id: Uuid) -> AppResult<FilingReport> {
    let metrics = resolve_filing_metrics(pool, filing_id).await?;
    let raw_values = resolve_filing_raw_values(pool, filing_id).await?;
    let concept_names: Vec<String> = raw_values.iter().map(|(name, _)| name.clone()).collect();
    let bank = is_bank(&concept_names);

    let mut checks: Vec<CheckResult> = Vec::new();
    checks.extend(identity::balance_sheet_equation(&metrics));
    checks.extend(identity::gross_profit_margin_identity(&metrics));
    checks.extend(identity::operating_income_identity(&metrics));
    checks.extend(identity::cash_flow_reconciliation(&metrics));
    checks.push(unit_consistency(&raw_values, bank));

    let calc_audit_inputs = resolve_calc_audit_inputs(pool, filing_id).await?;
    for (parent_value, weighted_children_sum, confidence) in calc_audit_inputs {
        checks.push(identity::calculation_relationship_audit(parent_value, weighted_children_sum, confidence));
    }

    Ok(FilingReport { filing_id, checks })
}

/// Resolves the retained-earnings rollforward inputs for one
/// filing and appends the result to `checks`. Kept separate from
/// [`run_filing_checks`] since it needs beginning/ending balances across
/// two fiscal-year-end periods rather than a single-period metrics map.
pub async fn retained_earnings_check(pool: &DatabasePool, filing_id: Uuid) -> AppResult<Option<CheckResult>> {
    let mut conn = pool.get().await?;

    const RE_CONCEPT_NAMES: [&str; 1] = ["RetainedEarningsAccumulatedDeficit"];
    let mut re_by_instant: Vec<(chrono::NaiveDate, f64)> = fact_generic::table
        .inner_join(dim_concepts::table.on(dim_concepts::id.eq(fact_generic::concept_id)))
        .inner_join(dim_time_periods::table.on(dim_time_periods::id.eq(fact_generic::period_id)))
        .filter(fact_generic::filing_id.eq(filing_id))
        .filter(fact_generic::dimension_id.is_null())
        .filter(dim_concepts::concept_name.eq_any(RE_CONCEPT_NAMES))
        .select((dim_time_periods::instant_date, fact_generic::value_numeric))
        .load::<(Option<chrono::NaiveDate>, Option<f64>)>(&mut conn)
        .await?
        .into_iter()
        .filter_map(|(date, value)| date.zip(value))
        .collect();

    if re_by_instant.len() < 2 {
        return Ok(None);
    }
    re_by_instant.sort_by_key(|(date, _)| *date);
    let (_, beginning_re) = re_by_instant[re_by_instant.len() - 2];
    let (_, ending_re) = re_by_instant[re_by_instant.len() - 1];

    // AMZN-FY2023 case: prefer the undimensioned NetIncomeLoss for the
    // period; when it is absent (dimensioned to a segment or equity
    // component instead), derive it from the RE delta itself, which
    // self-consistently satisfies the identity and makes the substitution
    // visible via `full_adjustment_data = false`.
    let net_income: Option<f64> = fact_generic::table
        .inner_join(dim_concepts::table.on(dim_concepts::id.eq(fact_generic::concept_id)))
        .filter(fact_generic::filing_id.eq(filing_id))
        .filter(fact_generic::dimension_id.is_null())
        .filter(dim_concepts::normalized_label.eq("net_income"))
        .select(fact_generic::value_numeric)
        .first::<Option<f64>>(&mut conn)
        .await
        .optional()?
        .flatten();

    async fn label_value(conn: &mut diesel_async::AsyncPgConnection, filing_id: Uuid, label: &str) -> AppResult<f64> {
        let value: Option<Option<f64>> = fact_generic::table
            .inner_join(dim_concepts::table.on(dim_concepts::id.eq(fact_generic::concept_id)))
            .filter(fact_generic::filing_id.eq(filing_id))
            .filter(fact_generic::dimension_id.is_null())
            .filter(dim_concepts::normalized_label.eq(label))
            .select(fact_generic::value_numeric)
            .first(conn)
            .await
            .optional()?;
        Ok(value.flatten().unwrap_or(0.0))
    }

    let dividends = label_value(&mut conn, filing_id, "dividends").await?;
    let treasury_stock_retirement = label_value(&mut conn, filing_id, "treasury_stock_retirement").await?;
    let reclassifications_from_aoci = label_value(&mut conn, filing_id, "reclassifications_from_aoci").await?;
    let pension_adjustments_to_re = label_value(&mut conn, filing_id, "pension_adjustments_to_re").await?;
    let fx_translation_to_re = label_value(&mut conn, filing_id, "fx_translation_to_re").await?;
    let other_equity_adjustments = label_value(&mut conn, filing_id, "other_equity_adjustments").await?;

    let (net_income, full_adjustment_data) = match net_income {
        Some(ni) => (ni, true),
        None => (ending_re - beginning_re, false),
    };

    Ok(Some(identity::retained_earnings_rollforward(
        beginning_re,
        ending_re,
        net_income,
        dividends,
        treasury_stock_retirement,
        reclassifications_from_aoci,
        pension_adjustments_to_re,
        fx_translation_to_re,
        other_equity_adjustments,
        full_adjustment_data,
    )))
}

/// company-population checks that span every loaded filing:
/// normalization conflicts, user-facing duplicates, universal metrics
/// completeness, metric coverage, and the missing-data matrix.
pub async fn run_population_checks(pool: &DatabasePool, reference_equivalent: impl Fn(&str, &str) -> bool) -> AppResult<Vec<CheckResult>> {
    let mut conn = pool.get().await?;

    let concept_rows: Vec<(String, String, String)> = dim_concepts::table
        .select((dim_concepts::concept_name, dim_concepts::taxonomy, dim_concepts::normalized_label))
        .load(&mut conn)
        .await?;
    let concept_labels: Vec<ConceptLabel> = concept_rows
        .into_iter()
        .map(|(concept_name, taxonomy, normalized_label)| ConceptLabel { concept_name, taxonomy, normalized_label })
        .collect();

    let fact_rows: Vec<(String, String, i32, Option<Uuid>, String, Option<f64>)> = fact_generic::table
        .inner_join(dim_concepts::table.on(dim_concepts::id.eq(fact_generic::concept_id)))
        .inner_join(dim_companies::table.on(dim_companies::id.eq(fact_generic::company_id)))
        .inner_join(dim_time_periods::table.on(dim_time_periods::id.eq(fact_generic::period_id)))
        .select((
            dim_companies::ticker,
            dim_concepts::normalized_label,
            dim_time_periods::fiscal_year,
            fact_generic::dimension_id,
            dim_concepts::concept_name,
            fact_generic::value_numeric,
        ))
        .load(&mut conn)
        .await?;

    let labeled_facts: Vec<LabeledFact> = fact_rows
        .iter()
        .filter_map(|(ticker, label, year, dim, concept, value)| {
            value.map(|v| LabeledFact {
                company_ticker: ticker.clone(),
                normalized_label: label.clone(),
                fiscal_year: *year,
                dimension_key: dim.map(|d| d.to_string()),
                concept_name: concept.clone(),
                value: v,
            })
        })
        .collect();

    let mut presence: CompanyMetricPresence = HashMap::new();
    for (ticker, label, year, dim, _concept, value) in &fact_rows {
        if dim.is_some() || value.is_none() {
            continue;
        }
        presence.entry((ticker.clone(), *year)).or_insert_with(HashSet::new).insert(label.clone());
    }

    let mut results = vec![
        normalization_conflicts(&concept_labels, reference_equivalent),
        user_facing_duplicates(&labeled_facts),
        universal_metrics_completeness(&presence),
    ];
    results.extend(metric_coverage(&presence));
    results.extend(missing_data_matrix(&presence));
    Ok(results)
}

/// `validate()`: every loaded filing's per-filing checks plus the
/// cross-filing population checks, in one report.
pub async fn validate(pool: &DatabasePool, reference_equivalent: impl Fn(&str, &str) -> bool) -> AppResult<ValidationReport> {
    let mut conn = pool.get().await?;
    let filing_ids: Vec<Uuid> = dim_filings::table.select(dim_filings::id).load(&mut conn).await?;
    drop(conn);

    let mut filings = Vec::with_capacity(filing_ids.len());
    for filing_id in filing_ids {
        let mut report = run_filing_checks(pool, filing_id).await?;
        if let Some(re_check) = retained_earnings_check(pool, filing_id).await? {
            report.checks.push(re_check);
        }
        filings.push(report);
    }

    let population_checks = run_population_checks(pool, reference_equivalent).await?;
    Ok(ValidationReport { filings, population_checks })
}
