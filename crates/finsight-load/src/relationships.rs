//! Calculation/presentation/footnote relationship persistence.
//!
//! Unlike facts, these rows carry no natural per-relationship business
//! key that survives re-parsing a filing (two calc arcs between the
//! same pair of concepts can legitimately differ in weight or role
//! between the original and a corrected primary document), so a reload
//! replaces a filing's relationship rows wholesale rather than upserting
//! them one at a time.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use finsight_core::error::AppResult;
use finsight_core::models::{CalcRel, FootnoteRef, NewCalcRel, NewFootnoteRef, NewPresRel, PresRel};
use finsight_core::schema::{calc_rel, footnote_ref, pres_rel};

pub async fn replace_calc_rels(conn: &mut AsyncPgConnection, for_filing_id: Uuid, rows: &[NewCalcRel]) -> AppResult<Vec<CalcRel>> {
    diesel::delete(calc_rel::table.filter(calc_rel::filing_id.eq(for_filing_id)))
        .execute(conn)
        .await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let inserted = diesel::insert_into(calc_rel::table).values(rows).get_results::<CalcRel>(conn).await?;
    Ok(inserted)
}

pub async fn replace_pres_rels(conn: &mut AsyncPgConnection, for_filing_id: Uuid, rows: &[NewPresRel]) -> AppResult<Vec<PresRel>> {
    diesel::delete(pres_rel::table.filter(pres_rel::filing_id.eq(for_filing_id)))
        .execute(conn)
        .await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let inserted = diesel::insert_into(pres_rel::table).values(rows).get_results::<PresRel>(conn).await?;
    Ok(inserted)
}

pub async fn replace_footnotes(conn: &mut AsyncPgConnection, for_filing_id: Uuid, rows: &[NewFootnoteRef]) -> AppResult<Vec<FootnoteRef>> {
    diesel::delete(footnote_ref::table.filter(footnote_ref::filing_id.eq(for_filing_id)))
        .execute(conn)
        .await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let inserted = diesel::insert_into(footnote_ref::table).values(rows).get_results::<FootnoteRef>(conn).await?;
    Ok(inserted)
}
