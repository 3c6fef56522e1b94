use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{NewApplication, SavedApplication, SavedApplicationRow};

/// User-scoped record store for completed analyses.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn create(&self, application: NewApplication) -> Result<SavedApplication, AppError>;

    /// All applications owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SavedApplication>, AppError>;

    async fn get_for_user(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<SavedApplication>, AppError>;
}

pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn create(&self, application: NewApplication) -> Result<SavedApplication, AppError> {
        let NewApplication {
            user_id,
            job_title,
            company,
            analysis,
        } = application;

        let row: SavedApplicationRow = sqlx::query_as(
            r#"
            INSERT INTO saved_applications (id, user_id, job_title, company, analysis)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, job_title, company, analysis, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&job_title)
        .bind(&company)
        .bind(Json(&analysis))
        .fetch_one(&self.pool)
        .await?;

        info!(user_id = %user_id, application_id = %row.id, "Saved application");
        Ok(row.into())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<SavedApplication>, AppError> {
        let rows: Vec<SavedApplicationRow> = sqlx::query_as(
            r#"
            SELECT id, job_title, company, analysis, created_at
            FROM saved_applications
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SavedApplication::from).collect())
    }

    async fn get_for_user(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<SavedApplication>, AppError> {
        let row: Option<SavedApplicationRow> = sqlx::query_as(
            r#"
            SELECT id, job_title, company, analysis, created_at
            FROM saved_applications
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SavedApplication::from))
    }
}
