use crate::error::{Error, Result};
use crate::models::comment::{Comment, CommentWithAuthor};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_question(&self, question_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.question_id, c.user_id, c.content, c.parent_id,
                   c.created_at, c.updated_at, u.nickname, u.email
            FROM comments c
            LEFT JOIN users u ON c.user_id = u.id
            WHERE c.question_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        content: &str,
        parent_id: Option<Uuid>,
    ) -> Result<CommentWithAuthor> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (question_id, user_id, content, parent_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(question_id)
        .bind(user_id)
        .bind(content)
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await?;

        let author: (Option<String>, Option<String>) =
            sqlx::query_as(r#"SELECT nickname, email FROM users WHERE id = $1"#)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(CommentWithAuthor {
            id: comment.id,
            question_id: comment.question_id,
            user_id: comment.user_id,
            content: comment.content,
            parent_id: comment.parent_id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            nickname: author.0,
            email: author.1,
        })
    }

    /// Owner-only; a comment someone else wrote looks like a missing one.
    pub async fn update(&self, user_id: Uuid, comment_id: Uuid, content: &str) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET content = $1, updated_at = NOW()
            WHERE id = $2 AND user_id = $3
            RETURNING *
            "#,
        )
        .bind(content)
        .bind(comment_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Comment not found".to_string()))?;

        Ok(comment)
    }

    pub async fn delete(&self, user_id: Uuid, comment_id: Uuid) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM comments WHERE id = $1 AND user_id = $2"#)
            .bind(comment_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Comment not found".to_string()));
        }
        Ok(())
    }
}
