// ── Records query model ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which timestamp a query narrows on.
///
/// Exactly one kind is selected at a time — this mirrors the radio group
/// in the original front-end, made a type-level invariant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFilter {
    #[default]
    All,
    Created,
    Modified,
}

/// Parameters for a records query. Empty string fields match everything.
///
/// The front-end leaves `date_from`/`date_to` at their extremes, so the
/// `Created`/`Modified` filter kinds are selectable but never actually
/// narrow by date. Known incompleteness carried over from the original
/// front-end, preserved rather than silently fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParameters {
    pub name: String,
    pub object_type: String,
    pub owner: String,
    pub date_filter: DateFilter,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            name: String::new(),
            object_type: String::new(),
            owner: String::new(),
            date_filter: DateFilter::All,
            date_from: DateTime::<Utc>::MIN_UTC,
            date_to: DateTime::<Utc>::MAX_UTC,
        }
    }
}

/// One read-only result row. Rows keep the order the endpoint returned
/// them in; there is no reordering contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub name: String,
    pub path: String,
    pub object_type: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}
