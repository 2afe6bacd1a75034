use crate::error::{Error, Result};
use crate::models::favorite::Favorite;
use crate::models::question::{Difficulty, QuestionType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FavoriteWithQuestion {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub title: Option<String>,
    pub difficulty: Option<Difficulty>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub question_type: Option<QuestionType>,
    pub category_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct FavoriteService {
    pool: PgPool,
}

impl FavoriteService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Re-favoriting an already-favorited question refreshes the notes
    /// instead of failing on the unique pair.
    pub async fn add(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        notes: Option<String>,
    ) -> Result<Favorite> {
        let favorite = sqlx::query_as::<_, Favorite>(
            r#"
            INSERT INTO favorites (user_id, question_id, notes)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, question_id)
            DO UPDATE SET notes = $3, created_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(favorite)
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<Vec<FavoriteWithQuestion>> {
        let offset = (page - 1) * limit;
        let favorites = sqlx::query_as::<_, FavoriteWithQuestion>(
            r#"
            SELECT f.id, f.user_id, f.question_id, f.notes, f.created_at,
                   q.title, q.difficulty, q.type, q.category_id
            FROM favorites f
            LEFT JOIN questions q ON f.question_id = q.id
            WHERE f.user_id = $1
            ORDER BY f.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(favorites)
    }

    pub async fn is_favorite(&self, user_id: Uuid, question_id: Uuid) -> Result<bool> {
        let found: Option<Uuid> = sqlx::query_scalar(
            r#"SELECT id FROM favorites WHERE user_id = $1 AND question_id = $2"#,
        )
        .bind(user_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    pub async fn remove(&self, user_id: Uuid, question_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"DELETE FROM favorites WHERE user_id = $1 AND question_id = $2"#,
        )
        .bind(user_id)
        .bind(question_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Favorite not found".to_string()));
        }
        Ok(())
    }
}
