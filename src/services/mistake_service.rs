use crate::error::{Error, Result};
use crate::models::attempt::Attempt;
use crate::models::question::{Difficulty, QuestionType};
use crate::services::grading_service::MASTERED_MARKER;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Latest outcome for a question the user most recently got wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct MistakeOutcome {
    pub question_id: Uuid,
    pub user_answer: String,
    pub last_attempt_at: DateTime<Utc>,
}

/// Folds an attempt history down to the questions whose most recent attempt
/// is incorrect. Newest-first scan, first record seen per question wins; a
/// question answered wrong and then corrected therefore drops out. Input
/// order does not matter, ties on the timestamp break by id.
pub fn resolve_mistakes(attempts: &[Attempt]) -> Vec<MistakeOutcome> {
    let mut ordered: Vec<&Attempt> = attempts.iter().collect();
    ordered.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut mistakes = Vec::new();
    for attempt in ordered {
        if !seen.insert(attempt.question_id) {
            continue;
        }
        if !attempt.is_correct {
            mistakes.push(MistakeOutcome {
                question_id: attempt.question_id,
                user_answer: attempt.user_answer.clone(),
                last_attempt_at: attempt.created_at,
            });
        }
    }
    mistakes
}

/// Mistake-book row: question metadata joined onto the latest wrong attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistakeEntry {
    pub question_id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub category_id: Option<Uuid>,
    pub user_answer: String,
    pub last_attempt_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct MistakeService {
    pool: PgPool,
}

impl MistakeService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_mistakes(&self, user_id: Uuid) -> Result<Vec<MistakeEntry>> {
        let attempts = self.load_history(user_id).await?;
        let outcomes = resolve_mistakes(&attempts);
        if outcomes.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = outcomes.iter().map(|o| o.question_id).collect();
        let rows = sqlx::query_as::<_, QuestionSummary>(
            r#"
            SELECT id, title, type, difficulty, category_id
            FROM questions
            WHERE id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        let mut questions: HashMap<Uuid, QuestionSummary> =
            rows.into_iter().map(|q| (q.id, q)).collect();

        // An attempt pointing at a deleted question is simply skipped.
        let entries = outcomes
            .into_iter()
            .filter_map(|outcome| {
                questions.remove(&outcome.question_id).map(|q| MistakeEntry {
                    question_id: q.id,
                    title: q.title,
                    question_type: q.question_type,
                    difficulty: q.difficulty,
                    category_id: q.category_id,
                    user_answer: outcome.user_answer,
                    last_attempt_at: outcome.last_attempt_at,
                })
            })
            .collect();

        Ok(entries)
    }

    /// Flips a current mistake to mastered by appending a synthetic correct
    /// attempt. History stays append-only; question counters are not touched
    /// because nothing was actually answered.
    pub async fn mark_mastered(&self, user_id: Uuid, question_id: Uuid) -> Result<Attempt> {
        let attempts = self.load_history(user_id).await?;
        let currently_wrong = resolve_mistakes(&attempts)
            .iter()
            .any(|o| o.question_id == question_id);
        if !currently_wrong {
            return Err(Error::BadRequest(
                "Question is not currently in the mistake book".to_string(),
            ));
        }

        let attempt = sqlx::query_as::<_, Attempt>(
            r#"
            INSERT INTO question_attempts (user_id, question_id, user_answer, is_correct, time_spent)
            VALUES ($1, $2, $3, true, 0)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .bind(MASTERED_MARKER)
        .fetch_one(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn load_history(&self, user_id: Uuid) -> Result<Vec<Attempt>> {
        let attempts = sqlx::query_as::<_, Attempt>(
            r#"
            SELECT * FROM question_attempts
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct QuestionSummary {
    id: Uuid,
    title: String,
    #[sqlx(rename = "type")]
    question_type: QuestionType,
    difficulty: Difficulty,
    category_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn attempt(question_id: Uuid, is_correct: bool, minutes_ago: i64) -> Attempt {
        Attempt {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            question_id,
            user_answer: if is_correct { "A".into() } else { "B".into() },
            is_correct,
            time_spent: Some(30),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn wrong_then_correct_is_not_a_mistake() {
        let q = Uuid::new_v4();
        let history = vec![attempt(q, false, 60), attempt(q, true, 10)];
        assert!(resolve_mistakes(&history).is_empty());
    }

    #[test]
    fn correct_then_wrong_is_a_mistake() {
        let q = Uuid::new_v4();
        let history = vec![attempt(q, true, 60), attempt(q, false, 10)];
        let mistakes = resolve_mistakes(&history);
        assert_eq!(mistakes.len(), 1);
        assert_eq!(mistakes[0].question_id, q);
        assert_eq!(mistakes[0].user_answer, "B");
    }

    #[test]
    fn input_order_does_not_matter() {
        let q = Uuid::new_v4();
        let newest_first = vec![attempt(q, true, 10), attempt(q, false, 60)];
        let oldest_first = vec![attempt(q, false, 60), attempt(q, true, 10)];
        assert!(resolve_mistakes(&newest_first).is_empty());
        assert!(resolve_mistakes(&oldest_first).is_empty());
    }

    #[test]
    fn untouched_questions_never_appear() {
        let answered = Uuid::new_v4();
        let history = vec![attempt(answered, false, 5)];
        let mistakes = resolve_mistakes(&history);
        assert_eq!(mistakes.len(), 1);
        // Only the attempted question shows up, nothing synthesized.
        assert_eq!(mistakes[0].question_id, answered);
    }

    #[test]
    fn newest_mistakes_come_first() {
        let old = Uuid::new_v4();
        let recent = Uuid::new_v4();
        let history = vec![attempt(old, false, 120), attempt(recent, false, 5)];
        let mistakes = resolve_mistakes(&history);
        assert_eq!(mistakes.len(), 2);
        assert_eq!(mistakes[0].question_id, recent);
        assert_eq!(mistakes[1].question_id, old);
    }

    #[test]
    fn synthetic_mastery_flips_the_projection() {
        let q = Uuid::new_v4();
        let mut history = vec![attempt(q, false, 60)];
        assert_eq!(resolve_mistakes(&history).len(), 1);

        // Same record the mastered endpoint appends.
        let mut mastered = attempt(q, true, 0);
        mastered.user_answer = MASTERED_MARKER.to_string();
        mastered.time_spent = Some(0);
        history.push(mastered);

        assert!(resolve_mistakes(&history).is_empty());
        // Prior records are untouched.
        assert_eq!(history.len(), 2);
        assert!(!history[0].is_correct);
    }

    #[test]
    fn multiple_questions_resolve_independently() {
        let fixed = Uuid::new_v4();
        let open = Uuid::new_v4();
        let never_wrong = Uuid::new_v4();
        let history = vec![
            attempt(fixed, false, 90),
            attempt(fixed, true, 30),
            attempt(open, false, 20),
            attempt(never_wrong, true, 10),
        ];
        let mistakes = resolve_mistakes(&history);
        assert_eq!(mistakes.len(), 1);
        assert_eq!(mistakes[0].question_id, open);
    }
}
