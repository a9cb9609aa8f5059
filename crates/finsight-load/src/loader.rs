//! C5 orchestration: one transaction per filing, company through
//! footnotes, committed or rolled back as a unit.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use uuid::Uuid;

use finsight_core::database::DatabasePool;
use finsight_core::error::{AppError, AppResult};
use finsight_core::models::{FilingType, NewCalcRel, NewCompany, NewFact, NewFiling, NewPresRel};
use finsight_normalize::Normalizer;
use finsight_taxonomy::{EquivalenceGroups, TaxonomyIndex};
use finsight_xbrl::{DimensionMember, ParsedFiling};

use crate::dimensions::{get_or_create_company, get_or_create_concept, get_or_create_dimension, get_or_create_time_period, upsert_filing, PeriodInput};
use crate::facts::upsert_facts;
use crate::hierarchy_population::populate_hierarchy;
use crate::relationships::{replace_calc_rels, replace_footnotes, replace_pres_rels};

#[derive(Debug, Clone)]
pub struct FilingHeaderInput {
    pub filing_type: FilingType,
    pub fiscal_year_end: NaiveDate,
    pub filing_date: NaiveDate,
    pub accession_number: String,
    pub source_url: String,
}

/// Resolves and caches `(taxonomy, concept_name) -> concept_id` for the
/// lifetime of one filing load, so the same concept seen across many
/// facts and relationship arcs only triggers one upsert round-trip.
struct ConceptResolver<'a> {
    taxonomy: &'a str,
    meta: &'a TaxonomyIndex,
    normalizer: &'a Normalizer<'a>,
    calc_children: HashSet<&'a str>,
    cache: HashMap<String, Uuid>,
}

impl<'a> ConceptResolver<'a> {
    fn new(taxonomy: &'a str, meta: &'a TaxonomyIndex, normalizer: &'a Normalizer<'a>, parsed: &'a ParsedFiling) -> Self {
        let calc_children = parsed.calculation_arcs.iter().map(|a| a.child_qname.as_str()).collect();
        Self {
            taxonomy,
            meta,
            normalizer,
            calc_children,
            cache: HashMap::new(),
        }
    }

    async fn resolve(&mut self, conn: &mut AsyncPgConnection, concept_name: &str) -> AppResult<Uuid> {
        if let Some(id) = self.cache.get(concept_name) {
            return Ok(*id);
        }

        let is_calc_child = self.calc_children.contains(concept_name);
        let is_top_level_total = !is_calc_child;
        let concept_meta = self.meta.concepts.get(concept_name);

        let concept = get_or_create_concept(conn, self.normalizer, concept_name, self.taxonomy, concept_meta, is_calc_child, is_top_level_total).await?;
        self.cache.insert(concept_name.to_string(), concept.id);
        Ok(concept.id)
    }
}

fn dimension_members(dims: &[DimensionMember]) -> Vec<(String, String)> {
    dims.iter().map(|d| (d.axis.clone(), d.member.clone())).collect()
}

/// Loads one fully parsed filing into the star schema: upserts
/// the company and filing header, resolves every concept/period/
/// dimension a fact or relationship touches, bulk-upserts the facts,
/// replaces the filing's calculation/presentation/footnote rows, and
/// backfills any still-unleveled concept hierarchy. All within a single
/// transaction; any failure rolls the whole filing back as `LOAD_TRANSACTION`.
pub async fn load_filing(
    pool: &DatabasePool,
    new_company: &NewCompany,
    header: &FilingHeaderInput,
    primary_taxonomy: &str,
    parsed: &ParsedFiling,
    taxonomy_index: &TaxonomyIndex,
    equivalence_groups: &EquivalenceGroups,
    batch_size: usize,
) -> AppResult<Uuid> {
    let mut conn = pool.get().await?;
    let normalizer = Normalizer::new(taxonomy_index, equivalence_groups);

    let filing_id = conn
        .transaction::<_, AppError, _>(|conn| {
            async move {
                let company = get_or_create_company(conn, new_company).await?;

                let new_filing = NewFiling {
                    company_id: company.id,
                    filing_type: header.filing_type.as_str().to_string(),
                    fiscal_year_end: header.fiscal_year_end,
                    filing_date: header.filing_date,
                    accession_number: header.accession_number.clone(),
                    source_url: header.source_url.clone(),
                    validation_score: None,
                    completeness_score: None,
                };
                let filing = upsert_filing(conn, &new_filing).await?;

                let mut resolver = ConceptResolver::new(primary_taxonomy, taxonomy_index, &normalizer, parsed);

                let mut new_facts = Vec::with_capacity(parsed.facts.len());
                for fact in &parsed.facts {
                    let concept_id = resolver.resolve(conn, &fact.concept_qname).await?;

                    let period_input = if fact.period.is_duration() {
                        PeriodInput::Duration(fact.period.start_date.expect("duration has a start"), fact.period.end_date.expect("duration has an end"))
                    } else if let Some(instant) = fact.period.instant {
                        PeriodInput::Instant(instant)
                    } else {
                        tracing::warn!(concept = %fact.concept_qname, "fact has neither instant nor duration period, skipping");
                        continue;
                    };
                    let period = get_or_create_time_period(conn, period_input).await?;

                    let members = dimension_members(&fact.dimensions);
                    let dimension = get_or_create_dimension(conn, &members).await?;

                    new_facts.push(NewFact {
                        filing_id: filing.id,
                        company_id: company.id,
                        concept_id,
                        period_id: period.id,
                        dimension_id: dimension.map(|d| d.id),
                        value_numeric: fact.value_numeric,
                        value_text: fact.value_text.clone(),
                        unit: fact.unit.clone(),
                        decimals: fact.decimals,
                        scale: fact.scale,
                        context_id: Some(fact.context_id.clone()),
                        xbrl_fact_id: fact.xbrl_fact_id.clone(),
                        source_line: fact.source_line,
                        order_index: fact.order_index,
                        is_primary: fact.is_primary,
                        is_calculated: false,
                        extraction_method: fact.extraction_method.as_str().to_string(),
                    });
                }
                upsert_facts(conn, &new_facts, batch_size).await?;

                let mut new_calc_rels = Vec::with_capacity(parsed.calculation_arcs.len());
                for arc in &parsed.calculation_arcs {
                    let parent_id = resolver.resolve(conn, &arc.parent_qname).await?;
                    let child_id = resolver.resolve(conn, &arc.child_qname).await?;
                    new_calc_rels.push(NewCalcRel {
                        filing_id: filing.id,
                        parent_concept_id: parent_id,
                        child_concept_id: child_id,
                        weight: arc.weight,
                        order_index: arc.order,
                        source: "xbrl".to_string(),
                        is_synthetic: false,
                        confidence: 1.0,
                    });
                }
                replace_calc_rels(conn, filing.id, &new_calc_rels).await?;

                let mut new_pres_rels = Vec::with_capacity(parsed.presentation_arcs.len());
                for arc in &parsed.presentation_arcs {
                    let parent_id = resolver.resolve(conn, &arc.parent_qname).await?;
                    let child_id = resolver.resolve(conn, &arc.child_qname).await?;
                    new_pres_rels.push(NewPresRel {
                        filing_id: filing.id,
                        parent_concept_id: parent_id,
                        child_concept_id: child_id,
                        order_index: arc.order,
                        role_uri: arc.role_uri.clone(),
                        statement_type: None,
                        source: "xbrl".to_string(),
                        is_synthetic: false,
                    });
                }
                replace_pres_rels(conn, filing.id, &new_pres_rels).await?;

                // The parser's `references` are reference-linkbase citations
                // (authoritative literature), not filer footnotes — no
                // `ix:footnote` extraction exists upstream yet, so this
                // clears any prior footnote rows rather than fabricating
                // one from the wrong source.
                replace_footnotes(conn, filing.id, &[]).await?;

                populate_hierarchy(conn, filing.id).await?;

                Ok(filing.id)
            }
            .scope_boxed()
        })
        .await?;

    Ok(filing_id)
}
