use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::SavedApplication;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// Colour band the dashboard uses for a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn for_score(score: f64) -> Self {
        if score > 80.0 {
            ScoreBand::High
        } else if score > 60.0 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }
}

/// One dashboard row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    pub id: Uuid,
    pub job_title: String,
    pub company: String,
    pub created_at: DateTime<Utc>,
    pub match_score: f64,
    pub score_band: ScoreBand,
}

impl From<SavedApplication> for ApplicationSummary {
    fn from(app: SavedApplication) -> Self {
        let match_score = app.analysis_result.match_score;
        Self {
            id: app.id,
            job_title: app.job_title,
            company: app.company,
            created_at: app.created_at,
            match_score,
            score_band: ScoreBand::for_score(match_score),
        }
    }
}

/// GET /api/v1/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ApplicationSummary>>, AppError> {
    let applications = state.store.list_for_user(params.user_id).await?;
    Ok(Json(
        applications.into_iter().map(ApplicationSummary::from).collect(),
    ))
}

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SavedApplication>, AppError> {
    let application = state
        .store
        .get_for_user(params.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;
    Ok(Json(application))
}
