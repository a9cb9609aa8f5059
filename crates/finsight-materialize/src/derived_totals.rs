//! C7 Derived totals: computes missing universal metric totals
//! from their calculation-linkbase components and writes them back as
//! `is_calculated = true` consolidated facts, with an audit trail in
//! `derived_totals_audit`.

use std::collections::{HashMap, HashSet};

use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use finsight_core::database::DatabasePool;
use finsight_core::error::{AppError, AppResult};
use finsight_core::models::{ExtractionMethod, Fact, NewDerivedTotalsAudit, NewFact};
use finsight_core::schema::{calc_rel, derived_totals_audit, dim_filings, fact_generic};

/// One calculation-linkbase parent/child edge for a filing.
#[derive(Debug, Clone, Copy)]
pub struct CalcEdge {
    pub parent_concept_id: Uuid,
    pub child_concept_id: Uuid,
    pub weight: f64,
}

/// One total this pass computed.
#[derive(Debug, Clone, Copy)]
pub struct DerivedTotal {
    pub concept_id: Uuid,
    pub period_id: Uuid,
    pub value: f64,
    pub component_count: i32,
}

/// Pure computation: for every `(parent, period)` pair implied by
/// `edges`, where the parent has no entry in `facts` for that period but
/// every one of its calc-linkbase children does, computes `Σ weight_i *
/// value_i` and reports it. Dedups against any existing explicit total
/// by skipping parents already present in `facts` for that period
/// ("deduplicates against any existing explicit total"); requires
/// at least one component, which the per-child period intersection
/// guarantees whenever a parent has any children at all.
pub fn derive_totals(edges: &[CalcEdge], facts: &HashMap<(Uuid, Uuid), f64>) -> Vec<DerivedTotal> {
    let mut children_by_parent: HashMap<Uuid, Vec<(Uuid, f64)>> = HashMap::new();
    for edge in edges {
        children_by_parent.entry(edge.parent_concept_id).or_default().push((edge.child_concept_id, edge.weight));
    }

    let mut periods_by_concept: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
    for (concept_id, period_id) in facts.keys() {
        periods_by_concept.entry(*concept_id).or_default().insert(*period_id);
    }

    let mut results = Vec::new();
    for (&parent, children) in &children_by_parent {
        if children.is_empty() {
            continue;
        }

        let mut candidate_periods: Option<HashSet<Uuid>> = None;
        for (child_id, _) in children {
            let child_periods = periods_by_concept.get(child_id).cloned().unwrap_or_default();
            candidate_periods = Some(match candidate_periods {
                None => child_periods,
                Some(existing) => existing.intersection(&child_periods).copied().collect(),
            });
        }
        let Some(candidate_periods) = candidate_periods else { continue };

        for period_id in candidate_periods {
            if facts.contains_key(&(parent, period_id)) {
                continue;
            }

            let mut sum = 0.0;
            let mut component_count = 0;
            for (child_id, weight) in children {
                if let Some(&value) = facts.get(&(*child_id, period_id)) {
                    sum += weight * value;
                    component_count += 1;
                }
            }
            if component_count == 0 {
                continue;
            }
            results.push(DerivedTotal { concept_id: parent, period_id, value: sum, component_count });
        }
    }
    results
}

/// Runs C7 against the database for one filing. Derived totals are
/// recomputed on every load for the touched filing: clears the
/// filing's previously derived facts and audit rows, then
/// recomputes from the current explicit (non-dimensioned) facts and the
/// filing's calc-linkbase edges.
pub async fn run_derived_totals(pool: &DatabasePool, filing_id: Uuid) -> AppResult<usize> {
    let mut conn = pool.get().await?;

    conn.transaction::<_, AppError, _>(|conn| {
        async move {
            let company_id: Uuid = dim_filings::table.find(filing_id).select(dim_filings::company_id).first(conn).await?;

            diesel::delete(derived_totals_audit::table.filter(derived_totals_audit::filing_id.eq(filing_id)))
                .execute(conn)
                .await?;
            diesel::delete(fact_generic::table.filter(fact_generic::filing_id.eq(filing_id)).filter(fact_generic::is_calculated.eq(true)))
                .execute(conn)
                .await?;

            // Only high-confidence edges ever back a derived total: a
            // parent written back as `is_calculated = true` must be the
            // parent of a calc relationship with confidence >= 0.995.
            let edges: Vec<CalcEdge> = calc_rel::table
                .filter(calc_rel::filing_id.eq(filing_id))
                .filter(calc_rel::confidence.ge(0.995))
                .select((calc_rel::parent_concept_id, calc_rel::child_concept_id, calc_rel::weight))
                .load::<(Uuid, Uuid, f64)>(conn)
                .await?
                .into_iter()
                .map(|(parent_concept_id, child_concept_id, weight)| CalcEdge { parent_concept_id, child_concept_id, weight })
                .collect();

            let explicit_facts: HashMap<(Uuid, Uuid), f64> = fact_generic::table
                .filter(fact_generic::filing_id.eq(filing_id))
                .filter(fact_generic::dimension_id.is_null())
                .filter(fact_generic::value_numeric.is_not_null())
                .select((fact_generic::concept_id, fact_generic::period_id, fact_generic::value_numeric))
                .load::<(Uuid, Uuid, Option<f64>)>(conn)
                .await?
                .into_iter()
                .filter_map(|(concept_id, period_id, value)| value.map(|v| ((concept_id, period_id), v)))
                .collect();

            let derived = derive_totals(&edges, &explicit_facts);

            for total in &derived {
                let new_fact = NewFact {
                    filing_id,
                    company_id,
                    concept_id: total.concept_id,
                    period_id: total.period_id,
                    dimension_id: None,
                    value_numeric: Some(total.value),
                    value_text: None,
                    unit: None,
                    decimals: None,
                    scale: None,
                    context_id: None,
                    xbrl_fact_id: None,
                    source_line: None,
                    order_index: 0,
                    is_primary: true,
                    is_calculated: true,
                    extraction_method: ExtractionMethod::Calculated.as_str().to_string(),
                };

                let stored: Fact = diesel::insert_into(fact_generic::table)
                    .values(&new_fact)
                    .on_conflict((fact_generic::filing_id, fact_generic::concept_id, fact_generic::period_id, fact_generic::dimension_id))
                    .do_update()
                    .set((
                        fact_generic::value_numeric.eq(diesel::upsert::excluded(fact_generic::value_numeric)),
                        fact_generic::is_calculated.eq(true),
                        fact_generic::extraction_method.eq(diesel::upsert::excluded(fact_generic::extraction_method)),
                    ))
                    .get_result(conn)
                    .await?;

                diesel::insert_into(derived_totals_audit::table)
                    .values(&NewDerivedTotalsAudit {
                        filing_id,
                        concept_id: total.concept_id,
                        fact_id: stored.id,
                        computed_value: total.value,
                        component_count: total.component_count,
                    })
                    .execute(conn)
                    .await?;
            }

            Ok(derived.len())
        }
        .scope_boxed()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_a_total_when_every_component_is_present() {
        let parent = Uuid::new_v4();
        let child_a = Uuid::new_v4();
        let child_b = Uuid::new_v4();
        let period = Uuid::new_v4();

        let edges = vec![
            CalcEdge { parent_concept_id: parent, child_concept_id: child_a, weight: 1.0 },
            CalcEdge { parent_concept_id: parent, child_concept_id: child_b, weight: 1.0 },
        ];
        let facts = HashMap::from([((child_a, period), 100.0), ((child_b, period), 50.0)]);

        let derived = derive_totals(&edges, &facts);
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].value, 150.0);
        assert_eq!(derived[0].component_count, 2);
    }

    #[test]
    fn respects_negative_weights() {
        let parent = Uuid::new_v4();
        let child_a = Uuid::new_v4();
        let child_b = Uuid::new_v4();
        let period = Uuid::new_v4();

        let edges = vec![
            CalcEdge { parent_concept_id: parent, child_concept_id: child_a, weight: 1.0 },
            CalcEdge { parent_concept_id: parent, child_concept_id: child_b, weight: -1.0 },
        ];
        let facts = HashMap::from([((child_a, period), 100.0), ((child_b, period), 30.0)]);

        let derived = derive_totals(&edges, &facts);
        assert_eq!(derived[0].value, 70.0);
    }

    #[test]
    fn skips_when_a_component_is_missing() {
        let parent = Uuid::new_v4();
        let child_a = Uuid::new_v4();
        let child_b = Uuid::new_v4();
        let period = Uuid::new_v4();

        let edges = vec![
            CalcEdge { parent_concept_id: parent, child_concept_id: child_a, weight: 1.0 },
            CalcEdge { parent_concept_id: parent, child_concept_id: child_b, weight: 1.0 },
        ];
        // child_b never reported for this period.
        let facts = HashMap::from([((child_a, period), 100.0)]);

        assert!(derive_totals(&edges, &facts).is_empty());
    }

    #[test]
    fn skips_when_an_explicit_total_already_exists() {
        let parent = Uuid::new_v4();
        let child_a = Uuid::new_v4();
        let period = Uuid::new_v4();

        let edges = vec![CalcEdge { parent_concept_id: parent, child_concept_id: child_a, weight: 1.0 }];
        let facts = HashMap::from([((child_a, period), 100.0), ((parent, period), 999.0)]);

        assert!(derive_totals(&edges, &facts).is_empty());
    }

    #[test]
    fn rederiving_from_the_same_inputs_is_idempotent() {
        let parent = Uuid::new_v4();
        let child_a = Uuid::new_v4();
        let period = Uuid::new_v4();

        let edges = vec![CalcEdge { parent_concept_id: parent, child_concept_id: child_a, weight: 1.0 }];
        let facts = HashMap::from([((child_a, period), 100.0)]);

        let first = derive_totals(&edges, &facts);
        let second = derive_totals(&edges, &facts);
        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].value, second[0].value);
    }
}
