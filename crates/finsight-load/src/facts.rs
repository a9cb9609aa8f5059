//! Bulk fact upsert. Facts are batched to keep statement sizes
//! reasonable for large filings (routinely tens of thousands of facts),
//! and conflict on the same tuple the migration's unique index covers:
//! `(filing_id, concept_id, period_id, dimension_id)` with
//! `NULLS NOT DISTINCT` so two consolidated (undimensioned) facts for
//! the same concept/period collide rather than duplicate.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use finsight_core::error::AppResult;
use finsight_core::models::{Fact, NewFact};
use finsight_core::schema::fact_generic::dsl::*;

/// Inserts or updates `facts` in chunks of `batch_size`, returning every
/// row as stored (post-upsert values, not necessarily the caller's).
pub async fn upsert_facts(conn: &mut AsyncPgConnection, facts: &[NewFact], batch_size: usize) -> AppResult<Vec<Fact>> {
    let chunk_size = batch_size.max(1);
    let mut stored = Vec::with_capacity(facts.len());

    for chunk in facts.chunks(chunk_size) {
        let rows = diesel::insert_into(fact_generic)
            .values(chunk)
            .on_conflict((filing_id, concept_id, period_id, dimension_id))
            .do_update()
            .set((
                value_numeric.eq(diesel::upsert::excluded(value_numeric)),
                value_text.eq(diesel::upsert::excluded(value_text)),
                unit.eq(diesel::upsert::excluded(unit)),
                decimals.eq(diesel::upsert::excluded(decimals)),
                scale.eq(diesel::upsert::excluded(scale)),
                context_id.eq(diesel::upsert::excluded(context_id)),
                xbrl_fact_id.eq(diesel::upsert::excluded(xbrl_fact_id)),
                source_line.eq(diesel::upsert::excluded(source_line)),
                order_index.eq(diesel::upsert::excluded(order_index)),
                is_primary.eq(diesel::upsert::excluded(is_primary)),
                is_calculated.eq(diesel::upsert::excluded(is_calculated)),
                extraction_method.eq(diesel::upsert::excluded(extraction_method)),
            ))
            .get_results::<Fact>(conn)
            .await?;
        stored.extend(rows);
    }

    Ok(stored)
}

/// Deletes every fact_generic row attributed to `filing_id` whose
/// `is_calculated` flag is set, ahead of a fresh C7 derivation pass
/// ("deriving twice produces no new facts" — achieved here by
/// clearing the prior derivation rather than trying to diff it).
pub async fn delete_calculated_facts(conn: &mut AsyncPgConnection, for_filing_id: uuid::Uuid) -> AppResult<usize> {
    let deleted = diesel::delete(fact_generic.filter(filing_id.eq(for_filing_id)).filter(is_calculated.eq(true)))
        .execute(conn)
        .await?;
    Ok(deleted)
}
