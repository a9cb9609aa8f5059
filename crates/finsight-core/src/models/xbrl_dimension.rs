use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::schema::dim_xbrl_dimensions;

/// An opaque axis/member tuple. `dimension_id = NULL` on a fact
/// denotes the consolidated value; any row here denotes a breakdown.
///
/// Business key is the MD5 hash of the canonical JSON representation, so
/// the same dimension tuple reported across filings reuses one row.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = dim_xbrl_dimensions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct XbrlDimension {
    pub id: Uuid,
    pub dimension_hash: String,
    pub dimension_json: JsonValue,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, Serialize, Deserialize)]
#[diesel(table_name = dim_xbrl_dimensions)]
pub struct NewXbrlDimension {
    pub dimension_hash: String,
    pub dimension_json: JsonValue,
}

impl NewXbrlDimension {
    /// Canonicalises `members` (axis qname -> member qname, sorted by
    /// axis) into a JSON object and hashes it with MD5 — one row per
    /// unique tuple, referenced from facts by id only.
    pub fn from_members(members: &[(String, String)]) -> Self {
        let mut sorted: Vec<&(String, String)> = members.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let mut map = serde_json::Map::new();
        for (axis, member) in &sorted {
            map.insert(axis.clone(), JsonValue::String(member.clone()));
        }
        let dimension_json = JsonValue::Object(map);

        let canonical = serde_json::to_string(&dimension_json)
            .expect("dimension JSON serialization cannot fail for a plain string map");
        let dimension_hash = format!("{:x}", md5::compute(canonical.as_bytes()));

        Self {
            dimension_hash,
            dimension_json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_order_independent() {
        let a = NewXbrlDimension::from_members(&[
            ("us-gaap:StatementBusinessSegmentsAxis".into(), "us-gaap:IPhoneMember".into()),
            ("srt:ProductOrServiceAxis".into(), "us-gaap:ProductMember".into()),
        ]);
        let b = NewXbrlDimension::from_members(&[
            ("srt:ProductOrServiceAxis".into(), "us-gaap:ProductMember".into()),
            ("us-gaap:StatementBusinessSegmentsAxis".into(), "us-gaap:IPhoneMember".into()),
        ]);
        assert_eq!(a.dimension_hash, b.dimension_hash);
    }

    #[test]
    fn different_tuples_hash_differently() {
        let a = NewXbrlDimension::from_members(&[("axis".into(), "member1".into())]);
        let b = NewXbrlDimension::from_members(&[("axis".into(), "member2".into())]);
        assert_ne!(a.dimension_hash, b.dimension_hash);
    }
}
