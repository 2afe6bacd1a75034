use crate::error::{Error, Result};
use crate::models::attempt::Attempt;
use crate::models::question::{Difficulty, Question, QuestionType};
use crate::services::grading_service::{GradingService, SubmittedAnswer};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct AttemptResult {
    pub is_correct: bool,
    pub normalized_answer: String,
    pub explanation: Option<String>,
    pub attempt: Attempt,
}

/// History row joined with question metadata for display. The join is LEFT,
/// a deleted question leaves the metadata empty.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AttemptWithQuestion {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub user_answer: String,
    pub is_correct: bool,
    pub time_spent: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub title: Option<String>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Clone)]
pub struct AttemptService {
    pool: PgPool,
}

impl AttemptService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grades and records a submission. The attempt insert and the owning
    /// question's counter bump share one transaction so concurrent
    /// submissions cannot lose an increment.
    pub async fn submit(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        selected: SubmittedAnswer,
        time_spent: Option<i32>,
        is_pro: bool,
    ) -> Result<AttemptResult> {
        let question = sqlx::query_as::<_, Question>(r#"SELECT * FROM questions WHERE id = $1"#)
            .bind(question_id)
            .fetch_one(&self.pool)
            .await?;

        Self::validate_submission(&question, &selected, is_pro)?;
        let outcome = GradingService::grade(&question, &selected);

        let mut tx = self.pool.begin().await?;

        let attempt = sqlx::query_as::<_, Attempt>(
            r#"
            INSERT INTO question_attempts (user_id, question_id, user_answer, is_correct, time_spent)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .bind(&outcome.normalized_answer)
        .bind(outcome.is_correct)
        .bind(time_spent.unwrap_or(0))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE questions
            SET attempt_count = attempt_count + 1,
                correct_count = correct_count + CASE WHEN $1 THEN 1 ELSE 0 END,
                correct_rate = (correct_count + CASE WHEN $1 THEN 1 ELSE 0 END)::FLOAT
                               / (attempt_count + 1)::FLOAT,
                updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(outcome.is_correct)
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AttemptResult {
            is_correct: outcome.is_correct,
            normalized_answer: outcome.normalized_answer,
            explanation: question.explanation,
            attempt,
        })
    }

    pub async fn my_attempts(
        &self,
        user_id: Uuid,
        question_id: Option<Uuid>,
        page: i64,
        limit: i64,
    ) -> Result<Vec<AttemptWithQuestion>> {
        let offset = (page - 1) * limit;
        let attempts = sqlx::query_as::<_, AttemptWithQuestion>(
            r#"
            SELECT qa.id, qa.user_id, qa.question_id, qa.user_answer, qa.is_correct,
                   qa.time_spent, qa.created_at, q.title, q.difficulty
            FROM question_attempts qa
            LEFT JOIN questions q ON qa.question_id = q.id
            WHERE qa.user_id = $1
              AND ($2::uuid IS NULL OR qa.question_id = $2)
            ORDER BY qa.created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }

    /// Boundary gating the grader relies on: non-empty, legal tokens, a
    /// gradable question type, and the Pro entitlement for premium content.
    fn validate_submission(
        question: &Question,
        selected: &SubmittedAnswer,
        is_pro: bool,
    ) -> Result<()> {
        if question.is_premium && !is_pro {
            return Err(Error::Forbidden("pro_required".to_string()));
        }
        if question.question_type == QuestionType::Fill {
            return Err(Error::BadRequest(
                "Fill-in questions are not auto-graded".to_string(),
            ));
        }
        if selected.is_empty() {
            return Err(Error::BadRequest("No answer selected".to_string()));
        }

        let legal = GradingService::option_tokens(question);
        let submitted_tokens: Vec<&String> = match selected {
            SubmittedAnswer::One(token) => vec![token],
            SubmittedAnswer::Many(tokens) => tokens.iter().collect(),
        };
        for token in submitted_tokens {
            if !legal.contains(token) {
                return Err(Error::BadRequest(format!("Unknown option: {}", token)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Difficulty;
    use serde_json::json;

    fn question(question_type: QuestionType, premium: bool) -> Question {
        Question {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            question_type,
            options: Some(json!(["one", "two", "three"])),
            correct_answer: "A".into(),
            explanation: None,
            difficulty: Difficulty::Easy,
            category_id: None,
            tags: None,
            view_count: 0,
            attempt_count: 0,
            correct_count: 0,
            correct_rate: 0.0,
            is_active: true,
            is_premium: premium,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn rejects_premium_for_free_users() {
        let q = question(QuestionType::Single, true);
        let err = AttemptService::validate_submission(&q, &SubmittedAnswer::One("A".into()), false)
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        assert!(
            AttemptService::validate_submission(&q, &SubmittedAnswer::One("A".into()), true)
                .is_ok()
        );
    }

    #[test]
    fn rejects_fill_and_empty_submissions() {
        let fill = question(QuestionType::Fill, false);
        assert!(matches!(
            AttemptService::validate_submission(&fill, &SubmittedAnswer::One("x".into()), false),
            Err(Error::BadRequest(_))
        ));

        let single = question(QuestionType::Single, false);
        assert!(matches!(
            AttemptService::validate_submission(&single, &SubmittedAnswer::Many(vec![]), false),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn rejects_tokens_outside_the_option_set() {
        let q = question(QuestionType::Multiple, false);
        let err = AttemptService::validate_submission(
            &q,
            &SubmittedAnswer::Many(vec!["A".into(), "Z".into()]),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        assert!(AttemptService::validate_submission(
            &q,
            &SubmittedAnswer::Many(vec!["A".into(), "C".into()]),
            false
        )
        .is_ok());
    }
}
