//! Post-insert hierarchy backfill. Runs once per
//! load against the concepts a filing actually touched; only fills
//! `hierarchy_level` where it is still unset, which is what makes this
//! idempotent across reloads and safe to run concurrently with another
//! loader populating the same shared concept.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use finsight_core::error::AppResult;
use finsight_core::hierarchy::infer_hierarchy_level;
use finsight_core::schema::{calc_rel, dim_concepts, fact_generic};

/// For every concept referenced by a fact in `filing_id` that has no
/// `hierarchy_level` yet, infers one from the concept's name and its
/// position in this filing's calculation trees.
pub async fn populate_hierarchy(conn: &mut AsyncPgConnection, filing_id: Uuid) -> AppResult<usize> {
    let unleveled: Vec<(Uuid, String)> = dim_concepts::table
        .inner_join(fact_generic::table.on(fact_generic::concept_id.eq(dim_concepts::id)))
        .filter(fact_generic::filing_id.eq(filing_id))
        .filter(dim_concepts::hierarchy_level.is_null())
        .select((dim_concepts::id, dim_concepts::concept_name))
        .distinct()
        .load(conn)
        .await?;

    let mut updated = 0usize;
    for (id, concept_name) in unleveled {
        let is_calc_child: bool = diesel::select(diesel::dsl::exists(
            calc_rel::table.filter(calc_rel::filing_id.eq(filing_id)).filter(calc_rel::child_concept_id.eq(id)),
        ))
        .get_result(conn)
        .await?;

        let level = infer_hierarchy_level(&concept_name, !is_calc_child);

        let rows = diesel::update(dim_concepts::table.filter(dim_concepts::id.eq(id)).filter(dim_concepts::hierarchy_level.is_null()))
            .set(dim_concepts::hierarchy_level.eq(level))
            .execute(conn)
            .await?;
        updated += rows;
    }

    Ok(updated)
}
