use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the unioned search view.
///
/// Every source table projects into this shape; columns a table lacks are
/// `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SearchRow {
    /// `news`, `works`, `persons` or `soon`.
    pub source_table: String,
    pub id: i64,
    pub person_id: Option<i64>,
    pub person_name: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "createdBy")]
    #[sqlx(rename = "createdBy")]
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "externalSource")]
    #[sqlx(rename = "externalSource")]
    pub external_source: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "scheduledPublishTime")]
    #[sqlx(rename = "scheduledPublishTime")]
    pub scheduled_publish_time: Option<DateTime<Utc>>,
}

/// Response of `POST /api/v1/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub data: Vec<SearchRow>,
    pub total_results: u64,
    pub pages: u64,
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total_results: 0,
            pages: 0,
        }
    }
}
