use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::analysis::AnalysisResult;

#[derive(Debug, Clone, FromRow)]
pub struct SavedApplicationRow {
    pub id: Uuid,
    pub job_title: String,
    pub company: String,
    pub analysis: Json<AnalysisResult>,
    pub created_at: DateTime<Utc>,
}

/// A past analysis owned by one user. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedApplication {
    pub id: Uuid,
    pub job_title: String,
    pub company: String,
    pub created_at: DateTime<Utc>,
    pub analysis_result: AnalysisResult,
}

impl From<SavedApplicationRow> for SavedApplication {
    fn from(row: SavedApplicationRow) -> Self {
        Self {
            id: row.id,
            job_title: row.job_title,
            company: row.company,
            created_at: row.created_at,
            analysis_result: row.analysis.0,
        }
    }
}

/// Fields needed to record a new saved application.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub user_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub analysis: AnalysisResult,
}
