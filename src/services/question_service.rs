use crate::error::{Error, Result};
use crate::models::question::{Difficulty, Question};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, serde::Serialize)]
pub struct PaginatedQuestions {
    pub questions: Vec<Question>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, Default)]
pub struct QuestionFilter {
    pub category_id: Option<Uuid>,
    pub difficulty: Option<Difficulty>,
    pub search: Option<String>,
    /// Listings show active questions unless the caller asks for everything.
    pub include_inactive: bool,
}

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, page: i64, limit: i64, filter: QuestionFilter) -> Result<PaginatedQuestions> {
        let offset = (page - 1) * limit;
        let active_param: Option<bool> = if filter.include_inactive { None } else { Some(true) };
        let search_param: Option<String> = filter.search.map(|s| format!("%{}%", s));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM questions
            WHERE ($1::bool IS NULL OR is_active = $1)
              AND ($2::uuid IS NULL OR category_id = $2)
              AND ($3::text IS NULL OR difficulty = $3)
              AND ($4::text IS NULL OR title ILIKE $4)
            "#,
        )
        .bind(active_param)
        .bind(filter.category_id)
        .bind(filter.difficulty)
        .bind(&search_param)
        .fetch_one(&self.pool)
        .await?;

        let total_pages = if limit > 0 {
            ((total as f64) / (limit as f64)).ceil() as i64
        } else {
            1
        };

        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT * FROM questions
            WHERE ($1::bool IS NULL OR is_active = $1)
              AND ($2::uuid IS NULL OR category_id = $2)
              AND ($3::text IS NULL OR difficulty = $3)
              AND ($4::text IS NULL OR title ILIKE $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(active_param)
        .bind(filter.category_id)
        .bind(filter.difficulty)
        .bind(&search_param)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(PaginatedQuestions {
            questions,
            total,
            page,
            limit,
            total_pages,
        })
    }

    /// Detail fetch; the view counter is bumped in the same statement so
    /// concurrent reads never lose an increment.
    pub async fn get_and_bump_view(&self, id: Uuid) -> Result<Question> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            UPDATE questions
            SET view_count = view_count + 1
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(question)
    }

    pub async fn get(&self, id: Uuid) -> Result<Question> {
        let question = sqlx::query_as::<_, Question>(r#"SELECT * FROM questions WHERE id = $1"#)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(question)
    }

    /// Premium questions are visible in listings but readable only by Pro
    /// users; anonymous callers count as non-Pro.
    pub fn ensure_readable(question: &Question, is_pro: bool) -> Result<()> {
        if question.is_premium && !is_pro {
            return Err(Error::Forbidden("pro_required".to_string()));
        }
        Ok(())
    }
}
