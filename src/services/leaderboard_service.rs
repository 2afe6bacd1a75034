use crate::error::Result;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub nickname: Option<String>,
    pub email: String,
    /// Distinct questions whose latest attempt is correct.
    pub correct_count: i64,
    /// Share of all attempts that were correct, in percent.
    pub accuracy: f64,
}

#[derive(Clone)]
pub struct LeaderboardService {
    pool: PgPool,
}

impl LeaderboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ranks by questions currently solved (latest attempt correct, so a
    /// regression drops the score), ties by attempt accuracy, then by who
    /// registered first. Users with no attempts are not listed.
    pub async fn top(&self, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        let entries = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            WITH latest AS (
                SELECT DISTINCT ON (user_id, question_id)
                       user_id, question_id, is_correct
                FROM question_attempts
                ORDER BY user_id, question_id, created_at DESC, id DESC
            ),
            solved AS (
                SELECT user_id, COUNT(*) AS correct_count
                FROM latest
                WHERE is_correct
                GROUP BY user_id
            ),
            totals AS (
                SELECT user_id,
                       COUNT(*) AS attempts,
                       COUNT(*) FILTER (WHERE is_correct) AS correct_attempts
                FROM question_attempts
                GROUP BY user_id
            )
            SELECT u.id, u.nickname, u.email,
                   COALESCE(s.correct_count, 0) AS correct_count,
                   CASE WHEN t.attempts > 0
                        THEN ROUND(t.correct_attempts::numeric / t.attempts * 100, 1)::float8
                        ELSE 0::float8
                   END AS accuracy
            FROM users u
            JOIN totals t ON t.user_id = u.id
            LEFT JOIN solved s ON s.user_id = u.id
            ORDER BY correct_count DESC, accuracy DESC, u.created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
